// Copyright 2026 Hypermesh Foundation. All rights reserved.
// GoTrim Gossip Simulation Suite - Estimator Family

use serde::{Deserialize, Serialize};

use crate::config::Task;
use crate::error::{Result, SimError};
use crate::mean::{ClippedGossip, GoTrim, MeanEstimator};
use crate::rank::{RankEstimator, RankKind};
use crate::trace::{Retention, Trace};

/// Every estimator the simulator can run, as named in experiment configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorKind {
    GoRank,
    ImprovedBaseline,
    Baseline,
    GoTrimGoRank,
    GoTrimImprovedBaseline,
    GoTrimBaseline,
    ClippedGossip,
}

impl EstimatorKind {
    /// The estimator set run when a config does not list one.
    pub fn defaults_for(task: Task) -> Vec<EstimatorKind> {
        match task {
            Task::Ranking => vec![Self::GoRank, Self::ImprovedBaseline, Self::Baseline],
            Task::Averaging => {
                vec![Self::GoTrimGoRank, Self::GoTrimImprovedBaseline, Self::ClippedGossip]
            }
        }
    }

    pub fn task(&self) -> Task {
        match self {
            Self::GoRank | Self::ImprovedBaseline | Self::Baseline => Task::Ranking,
            _ => Task::Averaging,
        }
    }

    /// Rank estimator used directly or wrapped by GoTrim.
    pub fn rank_kind(&self) -> Option<RankKind> {
        match self {
            Self::GoRank | Self::GoTrimGoRank => Some(RankKind::GoRank),
            Self::ImprovedBaseline | Self::GoTrimImprovedBaseline => Some(RankKind::ImprovedBaseline),
            Self::Baseline | Self::GoTrimBaseline => Some(RankKind::Baseline),
            Self::ClippedGossip => None,
        }
    }

    pub fn check_task(&self, task: Task) -> Result<()> {
        if self.task() == task {
            Ok(())
        } else {
            Err(SimError::EstimatorTaskMismatch { kind: *self, task })
        }
    }
}

/// Parameters shared by every estimator built for one trial.
#[derive(Debug, Clone, Copy)]
pub struct EstimatorParams {
    pub horizon: usize,
    pub alpha: f64,
    pub tau: f64,
    pub retention: Retention,
}

/// A freshly built estimator of any kind.
#[derive(Debug, Clone)]
pub enum Estimator {
    Rank(RankEstimator),
    Mean(MeanEstimator),
}

impl Estimator {
    pub fn build(kind: EstimatorKind, data: &[f64], params: &EstimatorParams) -> Result<Self> {
        let EstimatorParams { horizon, alpha, tau, retention } = *params;
        let estimator = match kind.rank_kind() {
            None => Self::Mean(MeanEstimator::ClippedGossip(ClippedGossip::new(
                horizon, data, tau, retention,
            )?)),
            Some(rank) if kind.task() == Task::Averaging => Self::Mean(MeanEstimator::GoTrim(
                GoTrim::new(rank, horizon, data, alpha, retention)?,
            )),
            Some(rank) => Self::Rank(RankEstimator::new(rank, horizon, data, retention)),
        };
        Ok(estimator)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Rank(e) => e.name(),
            Self::Mean(e) => e.name(),
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            Self::Rank(e) => e.weight(),
            Self::Mean(e) => e.weight(),
        }
    }

    pub fn update(&mut self, t: usize, i: usize, j: usize) {
        match self {
            Self::Rank(e) => e.update(t, i, j),
            Self::Mean(e) => e.update(t, i, j),
        }
    }

    /// The trace that is scored against ground truth: rank estimates for the
    /// ranking task, robust-mean estimates for averaging.
    pub fn output(&self) -> &Trace {
        match self {
            Self::Rank(e) => e.ranking(),
            Self::Mean(e) => e.estimates(),
        }
    }
}
