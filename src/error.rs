// Copyright 2026 Hypermesh Foundation. All rights reserved.
// GoTrim Gossip Simulation Suite - Error Types

use crate::config::Task;
use crate::estimator::EstimatorKind;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised while configuring or running an experiment.
///
/// Configuration problems surface when a
/// [`SimulationDriver`](crate::simulation::SimulationDriver) is built, before
/// the first trial starts.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("unknown graph type `{0}` (expected complete, watts_strogatz, watts_strogatz_d6, grid_2d or cycle)")]
    UnknownGraphKind(String),

    #[error("unknown task `{0}` (expected ranking or averaging)")]
    UnknownTask(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("degenerate trim: n={n}, alpha={alpha} leaves no untrimmed order statistic")]
    DegenerateTrim { n: usize, alpha: f64 },

    #[error("cannot take a trimmed mean of an empty dataset")]
    EmptyTrim,

    #[error("graph still disconnected after {attempts} generation attempts")]
    GraphDisconnected { attempts: u32 },

    #[error("edge ({u}, {v}) is invalid for a graph of {n} nodes")]
    EdgeOutOfRange { u: usize, v: usize, n: usize },

    #[error("graph has no edges to sample from")]
    NoEdges,

    #[error("dataset has {actual} values but the graph has {expected} nodes")]
    DataLength { expected: usize, actual: usize },

    #[error("estimator {kind:?} cannot run the {task:?} task")]
    EstimatorTaskMismatch { kind: EstimatorKind, task: Task },
}

pub type Result<T> = std::result::Result<T, SimError>;
