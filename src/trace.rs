// Copyright 2026 Hypermesh Foundation. All rights reserved.
// GoTrim Gossip Simulation Suite - Time-Major Per-Node History

use serde::{Deserialize, Serialize};

/// How many rows of a [`Trace`] are retained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retention {
    /// Every step is kept: `horizon * n` floats per trace.
    Full,
    /// Only the current and previous step are kept: `2 * n` floats per trace.
    #[default]
    Streaming,
}

/// A per-node quantity recorded once per simulated step.
///
/// Row `t` holds the state of all `n` nodes after step `t`. Estimators read
/// row `t - 1` and write row `t`, so two rows are enough to run a trial; the
/// full mode exists for inspecting whole trajectories and costs
/// `O(horizon * n)` memory per trace.
///
/// Reading a row that streaming retention has already evicted panics.
#[derive(Debug, Clone)]
pub struct Trace {
    n: usize,
    horizon: usize,
    retention: Retention,
    rows: Vec<Vec<f64>>,
    /// Highest step written so far.
    head: usize,
}

impl Trace {
    /// Create a trace whose row 0 is `initial` and whose later rows are zero.
    pub fn new(horizon: usize, initial: Vec<f64>, retention: Retention) -> Self {
        let n = initial.len();
        let slots = match retention {
            Retention::Full => horizon.max(1),
            Retention::Streaming => 2,
        };
        let mut rows = Vec::with_capacity(slots);
        rows.push(initial);
        rows.resize(slots, vec![0.0; n]);
        Self { n, horizon, retention, rows, head: 0 }
    }

    pub fn zeros(horizon: usize, n: usize, retention: Retention) -> Self {
        Self::new(horizon, vec![0.0; n], retention)
    }

    pub fn node_count(&self) -> usize {
        self.n
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn retention(&self) -> Retention {
        self.retention
    }

    /// Index of the most recently written step.
    pub fn head(&self) -> usize {
        self.head
    }

    pub fn row(&self, t: usize) -> &[f64] {
        let slot = self.slot(t);
        &self.rows[slot]
    }

    pub fn row_mut(&mut self, t: usize) -> &mut [f64] {
        let slot = self.slot(t);
        &mut self.rows[slot]
    }

    /// The most recently written row.
    pub fn latest(&self) -> &[f64] {
        self.row(self.head)
    }

    /// Borrow rows `t - 1` and `t` together, marking `t` as written.
    ///
    /// Under streaming retention this recycles the slot that held `t - 2`,
    /// whose contents are left stale for the caller to overwrite.
    pub fn rows_mut(&mut self, t: usize) -> (&mut [f64], &mut [f64]) {
        assert!(t >= 1 && t < self.horizon, "step {t} outside 1..{}", self.horizon);
        assert!(
            t <= self.head + 1,
            "step {t} skips ahead of last written step {}",
            self.head
        );
        self.head = self.head.max(t);
        let (prev, cur) = (self.slot_unchecked(t - 1), self.slot_unchecked(t));
        if prev < cur {
            let (lo, hi) = self.rows.split_at_mut(cur);
            (&mut lo[prev], &mut hi[0])
        } else {
            let (lo, hi) = self.rows.split_at_mut(prev);
            (&mut hi[0], &mut lo[cur])
        }
    }

    /// Copy row `t - 1` into row `t`.
    pub fn advance(&mut self, t: usize) {
        let (prev, cur) = self.rows_mut(t);
        cur.copy_from_slice(prev);
    }

    fn slot(&self, t: usize) -> usize {
        assert!(t < self.horizon.max(1), "step {t} outside horizon {}", self.horizon);
        if self.retention == Retention::Streaming {
            assert!(
                t <= self.head && t + 1 >= self.head,
                "step {t} evicted by streaming retention (head {})",
                self.head
            );
        }
        self.slot_unchecked(t)
    }

    fn slot_unchecked(&self, t: usize) -> usize {
        match self.retention {
            Retention::Full => t,
            Retention::Streaming => t % 2,
        }
    }
}
