// Copyright 2026 Hypermesh Foundation. All rights reserved.
// GoTrim Gossip Simulation Suite - Gossip Rank Estimators
//
// Every estimator keeps a time-major trace of per-node rank estimates and
// mutates exactly the two endpoints of the sampled edge (GoRank additionally
// refreshes its running average at every node). Node ids passed to `update`
// index plain slices, so a malformed edge panics instead of wrapping.

use serde::{Deserialize, Serialize};

use crate::trace::{Retention, Trace};

// ---------------------------------------------------------------------------
// Variant tags
// ---------------------------------------------------------------------------

/// The three rank estimators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankKind {
    GoRank,
    /// Baseline++ in the experiment reports.
    ImprovedBaseline,
    Baseline,
}

impl RankKind {
    pub const ALL: [RankKind; 3] = [RankKind::GoRank, RankKind::ImprovedBaseline, RankKind::Baseline];

    pub fn name(&self) -> &'static str {
        match self {
            Self::GoRank => "GoRank (ours)",
            Self::ImprovedBaseline => "Baseline++ (ours)",
            Self::Baseline => "Baseline (Chiuso et al.)",
        }
    }
}

// ---------------------------------------------------------------------------
// RankEstimator
// ---------------------------------------------------------------------------

/// A rank estimator of any variant.
#[derive(Debug, Clone)]
pub enum RankEstimator {
    GoRank(GoRank),
    ImprovedBaseline(ImprovedBaseline),
    Baseline(Baseline),
}

impl RankEstimator {
    pub fn new(kind: RankKind, horizon: usize, data: &[f64], retention: Retention) -> Self {
        match kind {
            RankKind::GoRank => Self::GoRank(GoRank::new(horizon, data, retention)),
            RankKind::ImprovedBaseline => {
                Self::ImprovedBaseline(ImprovedBaseline::new(horizon, data, retention))
            }
            RankKind::Baseline => Self::Baseline(Baseline::new(horizon, data, retention)),
        }
    }

    pub fn kind(&self) -> RankKind {
        match self {
            Self::GoRank(_) => RankKind::GoRank,
            Self::ImprovedBaseline(_) => RankKind::ImprovedBaseline,
            Self::Baseline(_) => RankKind::Baseline,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Scale that maps a raw estimate in [`ranking`](Self::ranking) to `[0, 1]`.
    pub fn weight(&self) -> f64 {
        match self {
            Self::GoRank(_) => 1.0,
            Self::ImprovedBaseline(e) => 1.0 / e.data.len() as f64,
            Self::Baseline(e) => 1.0 / e.data.len() as f64,
        }
    }

    /// Advance every node's estimate to step `t` after `i` and `j` gossiped.
    pub fn update(&mut self, t: usize, i: usize, j: usize) {
        match self {
            Self::GoRank(e) => e.update(t, i, j),
            Self::ImprovedBaseline(e) => e.update(t, i, j),
            Self::Baseline(e) => e.update(t, i, j),
        }
    }

    pub fn ranking(&self) -> &Trace {
        match self {
            Self::GoRank(e) => &e.ranking,
            Self::ImprovedBaseline(e) => &e.ranking,
            Self::Baseline(e) => &e.ranking,
        }
    }

    pub fn node_count(&self) -> usize {
        self.ranking().node_count()
    }
}

// ---------------------------------------------------------------------------
// GoRank
// ---------------------------------------------------------------------------

/// Ranks by time-averaging comparisons against a randomly walking shadow copy
/// of the dataset.
///
/// Each node compares its own value with whatever shadow value currently sits
/// in its slot, then the two contacted slots swap. The shadow slot of every
/// node mixes towards a uniform sample of the data, so the running fraction
/// of "my value is larger" converges to the normalized rank.
#[derive(Debug, Clone)]
pub struct GoRank {
    data: Vec<f64>,
    shadow: Vec<f64>,
    ranking: Trace,
}

impl GoRank {
    pub fn new(horizon: usize, data: &[f64], retention: Retention) -> Self {
        Self {
            data: data.to_vec(),
            shadow: data.to_vec(),
            ranking: Trace::zeros(horizon, data.len(), retention),
        }
    }

    pub fn update(&mut self, t: usize, i: usize, j: usize) {
        let steps = t as f64;
        let (prev, cur) = self.ranking.rows_mut(t);
        for (k, estimate) in cur.iter_mut().enumerate() {
            let above = if self.data[k] > self.shadow[k] { 1.0 } else { 0.0 };
            *estimate = ((steps - 1.0) * prev[k] + above) / steps;
        }
        self.shadow.swap(i, j);
    }

    pub fn shadow(&self) -> &[f64] {
        &self.shadow
    }

    pub fn ranking(&self) -> &Trace {
        &self.ranking
    }
}

// ---------------------------------------------------------------------------
// Baseline++
// ---------------------------------------------------------------------------

/// Baseline++: a travelling (rank, value) token repairs local rank estimates.
///
/// Every node starts believing its rank is its own index. Auxiliary
/// rank/value pairs are swapped across each sampled edge; whenever a node's
/// own value and estimate sit on opposite sides of the visiting pair, it
/// adopts the visiting rank.
#[derive(Debug, Clone)]
pub struct ImprovedBaseline {
    data: Vec<f64>,
    aux_rank: Vec<f64>,
    aux_value: Vec<f64>,
    ranking: Trace,
}

impl ImprovedBaseline {
    pub fn new(horizon: usize, data: &[f64], retention: Retention) -> Self {
        let identity = identity_ranks(data.len());
        Self {
            data: data.to_vec(),
            aux_rank: identity.clone(),
            aux_value: data.to_vec(),
            ranking: Trace::new(horizon, identity, retention),
        }
    }

    pub fn update(&mut self, t: usize, i: usize, j: usize) {
        self.ranking.advance(t);
        let prev_rank = (self.aux_rank[i], self.aux_rank[j]);

        // Undo a pair whose ranks contradict their values. Only the ranks are
        // restored; the values keep their current slots.
        let predicted = self.aux_rank[i] - self.aux_rank[j];
        let truth = self.aux_value[i] - self.aux_value[j];
        if predicted * truth < 0.0 {
            self.aux_rank[i] = prev_rank.1;
            self.aux_rank[j] = prev_rank.0;
        }

        let ranking = self.ranking.row_mut(t);
        for node in [i, j] {
            let predicted = ranking[node] - self.aux_rank[node];
            let truth = self.data[node] - self.aux_value[node];
            if predicted * truth < 0.0 || truth == 0.0 {
                ranking[node] = self.aux_rank[node];
            }
        }

        self.aux_rank.swap(i, j);
        self.aux_value.swap(i, j);
    }

    pub fn aux_ranks(&self) -> &[f64] {
        &self.aux_rank
    }

    pub fn aux_values(&self) -> &[f64] {
        &self.aux_value
    }

    pub fn ranking(&self) -> &Trace {
        &self.ranking
    }
}

// ---------------------------------------------------------------------------
// Baseline (Chiuso et al.)
// ---------------------------------------------------------------------------

/// Rank estimation by sorting-network style swaps plus a token that carries
/// each node's auxiliary rank back to its home node.
#[derive(Debug, Clone)]
pub struct Baseline {
    data: Vec<f64>,
    aux_home: Vec<usize>,
    aux_rank: Vec<f64>,
    aux_value: Vec<f64>,
    ranking: Trace,
}

impl Baseline {
    pub fn new(horizon: usize, data: &[f64], retention: Retention) -> Self {
        let identity = identity_ranks(data.len());
        Self {
            data: data.to_vec(),
            aux_home: (0..data.len()).collect(),
            aux_rank: identity.clone(),
            aux_value: data.to_vec(),
            ranking: Trace::new(horizon, identity, retention),
        }
    }

    pub fn update(&mut self, t: usize, i: usize, j: usize) {
        self.ranking.advance(t);

        let ranking = self.ranking.row_mut(t);
        if (self.data[i] - self.data[j]) * (ranking[i] - ranking[j]) < 0.0 {
            ranking.swap(i, j);
        }

        if (self.aux_value[i] - self.aux_value[j]) * (self.aux_rank[i] - self.aux_rank[j]) < 0.0 {
            self.aux_rank.swap(i, j);
        }

        self.aux_home.swap(i, j);
        self.aux_rank.swap(i, j);
        self.aux_value.swap(i, j);

        for node in [i, j] {
            if self.aux_home[node] == node {
                ranking[node] = self.aux_rank[node];
            }
        }
    }

    pub fn aux_homes(&self) -> &[usize] {
        &self.aux_home
    }

    pub fn aux_ranks(&self) -> &[f64] {
        &self.aux_rank
    }

    pub fn aux_values(&self) -> &[f64] {
        &self.aux_value
    }

    pub fn ranking(&self) -> &Trace {
        &self.ranking
    }
}

fn identity_ranks(n: usize) -> Vec<f64> {
    (0..n).map(|k| k as f64).collect()
}
