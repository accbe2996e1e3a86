// Copyright 2026 Hypermesh Foundation. All rights reserved.
// GoTrim Gossip Simulation Suite - Datasets and Outlier Injection

use std::path::PathBuf;

use rand::seq::index::sample;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::topology::Graph;

/// Half-width of the jitter added to file values so that no two are equal.
pub const FILE_JITTER: f64 = 1e-4;

fn default_scale_outlier() -> f64 {
    10.0
}

fn default_shift_outlier() -> f64 {
    100.0
}

/// Where the per-node values come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSource {
    /// Values `1..=n`; a fraction `eps` of them is multiplied by `outlier`.
    Arange {
        #[serde(default)]
        eps: f64,
        #[serde(default = "default_scale_outlier")]
        outlier: f64,
    },
    /// Measurements and their contact graph read from a JSON file
    /// (`{"values": [..], "edges": [[u, v], ..]}`); a fraction `eps` of the
    /// values is shifted by `outlier`.
    File {
        path: PathBuf,
        #[serde(default)]
        eps: f64,
        #[serde(default = "default_shift_outlier")]
        outlier: f64,
    },
}

impl Default for DataSource {
    fn default() -> Self {
        Self::Arange { eps: 0.0, outlier: default_scale_outlier() }
    }
}

impl DataSource {
    pub fn eps(&self) -> f64 {
        match self {
            Self::Arange { eps, .. } | Self::File { eps, .. } => *eps,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let eps = self.eps();
        if !(0.0..=1.0).contains(&eps) {
            return Err(SimError::InvalidConfig(format!("eps must be in [0, 1], got {eps}")));
        }
        Ok(())
    }

    /// Materialize the dataset. File sources also supply their graph.
    pub fn load<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Dataset> {
        match self {
            Self::Arange { eps, outlier } => {
                let mut values = arange(n);
                corrupt(&mut values, *eps, Corruption::Scale(*outlier), rng);
                Ok(Dataset { values, graph: None })
            }
            Self::File { path, eps, outlier } => {
                let file: SensorFile = serde_json::from_slice(&std::fs::read(path)?)?;
                let graph = Graph::new(file.values.len(), file.edges)?;
                if !graph.is_connected() {
                    return Err(SimError::GraphDisconnected { attempts: 1 });
                }
                let mut values = file.values;
                corrupt(&mut values, *eps, Corruption::Shift(*outlier), rng);
                for value in &mut values {
                    *value += rng.gen_range(-FILE_JITTER..FILE_JITTER);
                }
                Ok(Dataset { values, graph: Some(graph) })
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SensorFile {
    values: Vec<f64>,
    edges: Vec<(usize, usize)>,
}

/// Values plus, for file sources, the graph they were measured on.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub values: Vec<f64>,
    pub graph: Option<Graph>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Corruption {
    Scale(f64),
    Shift(f64),
}

pub fn arange(n: usize) -> Vec<f64> {
    (1..=n).map(|v| v as f64).collect()
}

/// Corrupt `floor(eps * n)` distinct, uniformly chosen entries in place.
/// Returns the corrupted indices.
pub fn corrupt<R: Rng + ?Sized>(
    values: &mut [f64],
    eps: f64,
    corruption: Corruption,
    rng: &mut R,
) -> Vec<usize> {
    let count = ((eps * values.len() as f64).floor() as usize).min(values.len());
    if count == 0 {
        return Vec::new();
    }
    let indices = sample(rng, values.len(), count).into_vec();
    for &k in &indices {
        values[k] = match corruption {
            Corruption::Scale(factor) => values[k] * factor,
            Corruption::Shift(offset) => values[k] + offset,
        };
    }
    indices
}
