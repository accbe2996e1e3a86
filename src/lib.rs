// Copyright 2026 Hypermesh Foundation. All rights reserved.
// GoTrim Gossip Simulation Suite

//! Gossip estimation of ranks and trimmed means over random pairwise contacts.
//!
//! Nodes of a connected network hold one value each. At every step one edge
//! is drawn uniformly at random and its two endpoints exchange state. Rank
//! estimators ([`rank`]) let each node learn its normalized position in the
//! sorted data; GoTrim ([`mean`]) turns those ranks into trimmed-mean weights
//! and gossips the weighted values towards the robust mean. The
//! [`simulation::SimulationDriver`] runs seeded Monte Carlo trials and
//! aggregates error curves for comparison.

pub mod config;
pub mod connectivity;
pub mod dataset;
pub mod error;
pub mod estimator;
pub mod mean;
pub mod rank;
pub mod report;
pub mod simulation;
pub mod topology;
pub mod trace;
pub mod weights;

pub use config::{ExperimentConfig, Task};
pub use connectivity::compute_connectivity;
pub use dataset::{DataSource, Dataset};
pub use error::{Result, SimError};
pub use estimator::{Estimator, EstimatorKind, EstimatorParams};
pub use mean::{ClippedGossip, GoTrim, MeanEstimator};
pub use rank::{Baseline, GoRank, ImprovedBaseline, RankEstimator, RankKind};
pub use report::{ExperimentResult, SeriesMoments, Stats};
pub use simulation::{DriverSettings, SimulationDriver, TrialOutcome, TrialSchedule};
pub use topology::{generate_graph, Graph, GraphKind};
pub use trace::{Retention, Trace};
pub use weights::{trim_mean, true_ranks, wn, TrimWindow};
