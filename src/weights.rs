// Copyright 2026 Hypermesh Foundation. All rights reserved.
// GoTrim Gossip Simulation Suite - Trimmed-Mean Weights and Ground Truth

use crate::error::{Result, SimError};

// ---------------------------------------------------------------------------
// Trim window
// ---------------------------------------------------------------------------

/// The symmetric order-statistic window kept by an `alpha`-trimmed mean.
///
/// With `m = floor(alpha * n)`, ranks (1-indexed) in `[m + 0.5, n - m + 0.5)`
/// receive weight `1 / (n - 2m)` and all others receive `0`, so the weights
/// of the `n` true ranks sum to exactly one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimWindow {
    n: usize,
    m: usize,
}

impl TrimWindow {
    /// Validate `alpha` against `n`. Fails when `alpha` is outside `[0, 0.5)`
    /// or when trimming would discard every order statistic.
    pub fn new(n: usize, alpha: f64) -> Result<Self> {
        if !(0.0..0.5).contains(&alpha) {
            return Err(SimError::DegenerateTrim { n, alpha });
        }
        let m = (alpha * n as f64).floor() as usize;
        if n <= 2 * m {
            return Err(SimError::DegenerateTrim { n, alpha });
        }
        Ok(Self { n, m })
    }

    /// Number of order statistics dropped from each tail.
    pub fn trimmed(&self) -> usize {
        self.m
    }

    /// Number of order statistics that carry weight.
    pub fn kept(&self) -> usize {
        self.n - 2 * self.m
    }

    /// Mean of `data` with `m` values dropped from each end. `data` must hold
    /// exactly `n` values.
    pub fn mean_of(&self, data: &[f64]) -> f64 {
        assert_eq!(data.len(), self.n, "trim window built for {} values", self.n);
        let mut sorted = data.to_vec();
        sorted.sort_by(f64::total_cmp);
        let kept = &sorted[self.m..self.n - self.m];
        kept.iter().sum::<f64>() / kept.len() as f64
    }

    pub fn weight(&self, r: f64) -> f64 {
        let lower = self.m as f64 + 0.5;
        let upper = (self.n - self.m) as f64 + 0.5;
        if lower <= r && r < upper {
            1.0 / self.kept() as f64
        } else {
            0.0
        }
    }
}

/// Trimmed-mean indicator weights for a vector of (1-indexed) rank values.
pub fn wn(n: usize, r: &[f64], alpha: f64) -> Result<Vec<f64>> {
    let window = TrimWindow::new(n, alpha)?;
    Ok(r.iter().map(|&rank| window.weight(rank)).collect())
}

// ---------------------------------------------------------------------------
// Ground truth
// ---------------------------------------------------------------------------

/// 0-indexed rank of every value (`argsort(argsort(data))`).
///
/// Ties keep index order, so the result is always a permutation of `0..n`.
pub fn true_ranks(data: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..data.len()).collect();
    order.sort_by(|&a, &b| data[a].total_cmp(&data[b]));
    let mut ranks = vec![0; data.len()];
    for (rank, &node) in order.iter().enumerate() {
        ranks[node] = rank;
    }
    ranks
}

/// Mean of the sorted values with `floor(alpha * n)` dropped from each end.
pub fn trim_mean(data: &[f64], alpha: f64) -> Result<f64> {
    if data.is_empty() {
        return Err(SimError::EmptyTrim);
    }
    Ok(TrimWindow::new(data.len(), alpha)?.mean_of(data))
}
