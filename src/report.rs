// Copyright 2026 Hypermesh Foundation. All rights reserved.
// GoTrim Gossip Simulation Suite - Result Surface
//
// Structured output handed to plotting and bound-comparison tooling. Maps are
// keyed by estimator display name and ordered, so serialized reports diff
// cleanly between runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::Task;

// ─── Final-step summary ─────────────────────────────────────────────────────

/// Normal quantile of a two-sided 95% interval.
const CI_Z: f64 = 1.96;

/// One scalar across trials: sample deviation and a 95% confidence interval
/// on the mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mut moments = SeriesMoments::new(1);
        let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
        for &x in samples {
            moments.push(&[x]);
            min = min.min(x);
            max = max.max(x);
        }
        let n = moments.count();
        let mean = moments.mean()[0];
        let std_dev = moments.sample_std_dev()[0];
        let half_width = CI_Z * std_dev / (n as f64).sqrt();
        Self { mean, std_dev, ci_lower: mean - half_width, ci_upper: mean + half_width, min, max, n }
    }
}

// ─── Elementwise moments across trials ──────────────────────────────────────

/// Welford accumulation of equally long series, one element at a time.
///
/// `std_dev` is the population deviation (divides by the trial count), which
/// is what the error-band plots expect. `sample_std_dev` divides by
/// `count - 1` and is zero for a single series.
#[derive(Debug, Clone)]
pub struct SeriesMoments {
    count: usize,
    mean: Vec<f64>,
    m2: Vec<f64>,
}

impl SeriesMoments {
    pub fn new(len: usize) -> Self {
        Self { count: 0, mean: vec![0.0; len], m2: vec![0.0; len] }
    }

    pub fn push(&mut self, series: &[f64]) {
        assert_eq!(series.len(), self.mean.len(), "series length changed between trials");
        self.count += 1;
        let count = self.count as f64;
        for (k, &x) in series.iter().enumerate() {
            let delta = x - self.mean[k];
            self.mean[k] += delta / count;
            self.m2[k] += delta * (x - self.mean[k]);
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn std_dev(&self) -> Vec<f64> {
        if self.count == 0 {
            return vec![0.0; self.m2.len()];
        }
        let count = self.count as f64;
        self.m2.iter().map(|m2| (m2 / count).max(0.0).sqrt()).collect()
    }

    pub fn sample_std_dev(&self) -> Vec<f64> {
        if self.count < 2 {
            return vec![0.0; self.m2.len()];
        }
        let dof = (self.count - 1) as f64;
        self.m2.iter().map(|m2| (m2 / dof).max(0.0).sqrt()).collect()
    }
}

// ─── Experiment result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub task: Task,
    pub n_trials: usize,
    pub horizon: usize,
    /// Estimator display names in configuration order.
    pub names: Vec<String>,
    /// `lambda_2 / |E|` of the network.
    pub connectivity: f64,
    /// Dataset and true ranks of the last trial.
    pub data: Vec<f64>,
    pub true_ranks: Vec<usize>,
    pub robust_mean: f64,
    /// Per-node absolute error at the last step, averaged over trials. Clipped
    /// gossip has no rank or weight to score and is absent here.
    pub error_mean: BTreeMap<String, Vec<f64>>,
    /// Per-step network-average absolute error, mean over trials.
    pub mean_relative_error: BTreeMap<String, Vec<f64>>,
    /// Per-step network-average absolute error, std over trials.
    pub std_relative_error: BTreeMap<String, Vec<f64>>,
    /// Last-step network-average error across trials.
    pub final_step_error: BTreeMap<String, Stats>,
}

impl ExperimentResult {
    /// Final network-average error of one estimator, mean over trials.
    pub fn final_error(&self, name: &str) -> Option<f64> {
        self.final_step_error.get(name).map(|stats| stats.mean)
    }
}
