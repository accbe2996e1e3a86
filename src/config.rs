// Copyright 2026 Hypermesh Foundation. All rights reserved.
// GoTrim Gossip Simulation Suite - Experiment Configuration

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dataset::DataSource;
use crate::error::{Result, SimError};
use crate::estimator::EstimatorKind;
use crate::topology::GraphKind;
use crate::trace::Retention;
use crate::weights::TrimWindow;

// ─── Task ───────────────────────────────────────────────────────────────────

/// What the nodes are estimating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Task {
    /// Each node estimates its own normalized rank.
    #[default]
    Ranking,
    /// Each node estimates the trimmed mean of the dataset.
    Averaging,
}

impl FromStr for Task {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ranking" => Ok(Self::Ranking),
            "averaging" => Ok(Self::Averaging),
            _ => Err(SimError::UnknownTask(s.to_string())),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ranking => write!(f, "ranking"),
            Self::Averaging => write!(f, "averaging"),
        }
    }
}

impl TryFrom<String> for Task {
    type Error = SimError;

    fn try_from(tag: String) -> Result<Self> {
        tag.parse()
    }
}

impl From<Task> for String {
    fn from(task: Task) -> String {
        task.to_string()
    }
}

// ─── ExperimentConfig ───────────────────────────────────────────────────────

fn default_n() -> usize {
    100
}

fn default_graph() -> GraphKind {
    GraphKind::WattsStrogatz
}

fn default_tau() -> f64 {
    100.0
}

fn default_shuffle() -> bool {
    true
}

/// One experiment: a topology, a dataset, a task and the estimators to compare.
///
/// ```yaml
/// name: trim_ws_eps10
/// n: 100
/// horizon: 20000
/// n_trials: 50
/// seed: 42
/// graph: watts_strogatz
/// task: averaging
/// alpha: 0.1
/// tau: 100
/// data: { kind: arange, eps: 0.1, outlier: 10 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperimentConfig {
    pub name: String,
    /// Node count; replaced by the file size for file datasets.
    #[serde(default = "default_n")]
    pub n: usize,
    /// Simulated steps per trial, counting the initial state as step 0.
    pub horizon: usize,
    pub n_trials: usize,
    #[serde(default)]
    pub seed: u64,
    /// Ignored when the dataset file carries its own edges.
    #[serde(default = "default_graph")]
    pub graph: GraphKind,
    #[serde(default)]
    pub task: Task,
    /// Fraction trimmed from each tail, in `[0, 0.5)`.
    #[serde(default)]
    pub alpha: f64,
    /// Clipping radius for clipped gossip.
    #[serde(default = "default_tau")]
    pub tau: f64,
    /// Reshuffle the dataset over the nodes before every trial.
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,
    #[serde(default)]
    pub history: Retention,
    #[serde(default)]
    pub data: DataSource,
    /// Defaults to the standard comparison for the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimators: Option<Vec<EstimatorKind>>,
}

impl ExperimentConfig {
    /// Parse a YAML experiment. An unknown `graph` or `task` tag is reported
    /// as [`SimError::UnknownGraphKind`] or [`SimError::UnknownTask`].
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        if let Some(tag) = value.get("graph").and_then(serde_yaml::Value::as_str) {
            tag.parse::<GraphKind>()?;
        }
        if let Some(tag) = value.get("task").and_then(serde_yaml::Value::as_str) {
            tag.parse::<Task>()?;
        }
        Ok(serde_yaml::from_value(value)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn estimator_set(&self) -> Vec<EstimatorKind> {
        self.estimators
            .clone()
            .unwrap_or_else(|| EstimatorKind::defaults_for(self.task))
    }

    /// Check everything that does not depend on the dataset contents.
    ///
    /// File datasets bring their own node count, so `n` and the trim window
    /// are only checked here for generated data. The driver checks both
    /// against the loaded dataset.
    pub fn validate(&self) -> Result<()> {
        let sized_by_config = !matches!(self.data, DataSource::File { .. });
        if sized_by_config && self.n < 2 {
            return Err(SimError::InvalidConfig(format!("n must be at least 2, got {}", self.n)));
        }
        if self.horizon == 0 {
            return Err(SimError::InvalidConfig("horizon must be at least 1".to_string()));
        }
        if self.n_trials == 0 {
            return Err(SimError::InvalidConfig("n_trials must be at least 1".to_string()));
        }
        if !(self.tau.is_finite() && self.tau > 0.0) {
            return Err(SimError::InvalidConfig(format!("tau must be positive, got {}", self.tau)));
        }
        if sized_by_config {
            TrimWindow::new(self.n, self.alpha)?;
        } else if !(0.0..0.5).contains(&self.alpha) {
            return Err(SimError::InvalidConfig(format!("alpha must be in [0, 0.5), got {}", self.alpha)));
        }
        self.data.validate()?;

        let estimators = self.estimator_set();
        if estimators.is_empty() {
            return Err(SimError::InvalidConfig("no estimators selected".to_string()));
        }
        for kind in &estimators {
            kind.check_task(self.task)?;
        }
        Ok(())
    }
}
