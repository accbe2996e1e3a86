// Copyright 2026 Hypermesh Foundation. All rights reserved.
// GoTrim Gossip Simulation Suite - Robust Mean Estimators

use crate::error::{Result, SimError};
use crate::rank::{RankEstimator, RankKind};
use crate::trace::{Retention, Trace};
use crate::weights::TrimWindow;

pub const CLIPPED_GOSSIP_NAME: &str = "Clipped Gossip (He et al.)";

// ---------------------------------------------------------------------------
// MeanEstimator
// ---------------------------------------------------------------------------

/// A robust-mean estimator of any variant.
#[derive(Debug, Clone)]
pub enum MeanEstimator {
    GoTrim(GoTrim),
    ClippedGossip(ClippedGossip),
}

impl MeanEstimator {
    pub fn name(&self) -> &str {
        match self {
            Self::GoTrim(e) => &e.name,
            Self::ClippedGossip(_) => CLIPPED_GOSSIP_NAME,
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            Self::GoTrim(e) => e.weight,
            Self::ClippedGossip(_) => 1.0,
        }
    }

    /// Advance to step `t`. GoTrim moves its rank estimator first.
    pub fn update(&mut self, t: usize, i: usize, j: usize) {
        match self {
            Self::GoTrim(e) => e.update(t, i, j),
            Self::ClippedGossip(e) => e.update_mean(t, i, j),
        }
    }

    /// Per-node running estimates of the robust mean.
    pub fn estimates(&self) -> &Trace {
        match self {
            Self::GoTrim(e) => &e.z,
            Self::ClippedGossip(e) => &e.z,
        }
    }
}

// ---------------------------------------------------------------------------
// GoTrim
// ---------------------------------------------------------------------------

/// Trimmed-mean gossip driven by a wrapped rank estimator.
///
/// Every node derives its trimmed-mean weight from its current rank estimate.
/// Weight changes are injected into the accumulator `z` of every node, while
/// the contacted pair averages its accumulators. The network-wide mean of `z`
/// is always `sum_k w_k * x_k / n`, which is the trimmed mean once every rank
/// estimate has settled.
#[derive(Debug, Clone)]
pub struct GoTrim {
    name: String,
    data: Vec<f64>,
    window: TrimWindow,
    weight: f64,
    rank: RankEstimator,
    w: Trace,
    z: Trace,
}

impl GoTrim {
    pub fn new(
        rank: RankKind,
        horizon: usize,
        data: &[f64],
        alpha: f64,
        retention: Retention,
    ) -> Result<Self> {
        let n = data.len();
        let window = TrimWindow::new(n, alpha)?;
        let rank = RankEstimator::new(rank, horizon, data, retention);
        Ok(Self {
            name: format!("GoTrim + {}", rank.name()),
            data: data.to_vec(),
            window,
            weight: rank.weight() * n as f64,
            rank,
            w: Trace::zeros(horizon, n, retention),
            z: Trace::zeros(horizon, n, retention),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rank(&self) -> &RankEstimator {
        &self.rank
    }

    pub fn rank_mut(&mut self) -> &mut RankEstimator {
        &mut self.rank
    }

    /// Per-node trimmed-mean weights, scaled by `n` (so `1` means "kept").
    pub fn weights(&self) -> &Trace {
        &self.w
    }

    pub fn estimates(&self) -> &Trace {
        &self.z
    }

    pub fn update(&mut self, t: usize, i: usize, j: usize) {
        self.rank.update(t, i, j);
        self.update_mean(t, i, j);
    }

    /// Mean step for `t`; the wrapped rank estimator must already be at `t`.
    ///
    /// Row `t - 1` of `z` is rewritten with this step's weight correction
    /// before the pair average produces row `t`.
    pub fn update_mean(&mut self, t: usize, i: usize, j: usize) {
        let n = self.data.len() as f64;
        let ranking = self.rank.ranking().row(t);

        let (w_prev, w_cur) = self.w.rows_mut(t);
        let (z_prev, z_cur) = self.z.rows_mut(t);
        for k in 0..self.data.len() {
            w_cur[k] = n * self.window.weight(self.weight * ranking[k] + 1.0);
            z_prev[k] += (w_cur[k] - w_prev[k]) * self.data[k];
        }

        z_cur.copy_from_slice(z_prev);
        let average = (z_prev[i] + z_prev[j]) / 2.0;
        z_cur[i] = average;
        z_cur[j] = average;
    }
}

// ---------------------------------------------------------------------------
// ClippedGossip
// ---------------------------------------------------------------------------

/// Pairwise averaging with the exchanged difference clipped to radius `tau`.
#[derive(Debug, Clone)]
pub struct ClippedGossip {
    tau: f64,
    z: Trace,
}

impl ClippedGossip {
    pub fn new(horizon: usize, data: &[f64], tau: f64, retention: Retention) -> Result<Self> {
        if !(tau.is_finite() && tau > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "clipping radius tau must be positive and finite, got {tau}"
            )));
        }
        Ok(Self { tau, z: Trace::new(horizon, data.to_vec(), retention) })
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    pub fn estimates(&self) -> &Trace {
        &self.z
    }

    pub fn update_mean(&mut self, t: usize, i: usize, j: usize) {
        let tau = self.tau;
        let (prev, cur) = self.z.rows_mut(t);
        let (zi, zj) = (prev[i], prev[j]);
        let step = 0.5 * clip(zj - zi, tau);
        cur.copy_from_slice(prev);
        cur[i] = zi + step;
        cur[j] = zj - step;
    }
}

fn clip(delta: f64, tau: f64) -> f64 {
    let norm = delta.abs();
    let factor = if norm > 0.0 { (tau / norm).min(1.0) } else { 1.0 };
    factor * delta
}
