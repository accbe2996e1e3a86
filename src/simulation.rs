// Copyright 2026 Hypermesh Foundation. All rights reserved.
// GoTrim Gossip Simulation Suite - Simulation Driver
//
// One trial = one shuffled dataset, one edge sequence, fresh estimators.
// Trials are independent and run on the rayon pool; each owns a ChaCha
// stream derived from the experiment seed, so results are identical for any
// thread count.

use std::time::Instant;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{ExperimentConfig, Task};
use crate::connectivity::compute_connectivity;
use crate::error::{Result, SimError};
use crate::estimator::{Estimator, EstimatorKind, EstimatorParams};
use crate::mean::MeanEstimator;
use crate::report::{ExperimentResult, SeriesMoments, Stats};
use crate::topology::{generate_graph, Graph};
use crate::trace::Retention;
use crate::weights::{true_ranks, TrimWindow};

// ─── Settings ───────────────────────────────────────────────────────────────

/// Everything the driver needs besides the graph and the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverSettings {
    pub horizon: usize,
    pub n_trials: usize,
    pub seed: u64,
    pub task: Task,
    pub alpha: f64,
    pub tau: f64,
    pub shuffle: bool,
    pub retention: Retention,
    pub estimators: Vec<EstimatorKind>,
}

impl DriverSettings {
    pub fn from_config(config: &ExperimentConfig) -> Self {
        Self {
            horizon: config.horizon,
            n_trials: config.n_trials,
            seed: config.seed,
            task: config.task,
            alpha: config.alpha,
            tau: config.tau,
            shuffle: config.shuffle,
            retention: config.history,
            estimators: config.estimator_set(),
        }
    }

    fn params(&self) -> EstimatorParams {
        EstimatorParams {
            horizon: self.horizon,
            alpha: self.alpha,
            tau: self.tau,
            retention: self.retention,
        }
    }
}

// ─── Trial outcomes ─────────────────────────────────────────────────────────

/// The random draws of one trial: the dataset as placed on the nodes and the
/// edge contacted at each step `1..horizon`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialSchedule {
    pub data: Vec<f64>,
    pub edges: Vec<(usize, usize)>,
}

#[derive(Debug, Clone)]
pub struct EstimatorOutcome {
    pub name: String,
    /// Per-node absolute error after the last step. `None` for estimators
    /// with no rank or weight to score (clipped gossip).
    pub final_error: Option<Vec<f64>>,
    /// Network-average absolute error of every row `0..horizon`.
    pub step_error: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct TrialOutcome {
    pub trial: usize,
    pub data: Vec<f64>,
    pub true_ranks: Vec<usize>,
    pub robust_mean: f64,
    pub estimators: Vec<EstimatorOutcome>,
}

/// Ground truth of one trial's dataset.
struct Truth {
    ranks: Vec<usize>,
    robust_mean: f64,
}

// ─── SimulationDriver ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SimulationDriver {
    settings: DriverSettings,
    graph: Graph,
    data: Vec<f64>,
    window: TrimWindow,
}

impl SimulationDriver {
    pub fn new(settings: DriverSettings, graph: Graph, data: Vec<f64>) -> Result<Self> {
        if data.len() != graph.node_count() {
            return Err(SimError::DataLength { expected: graph.node_count(), actual: data.len() });
        }
        if settings.horizon == 0 {
            return Err(SimError::InvalidConfig("horizon must be at least 1".to_string()));
        }
        if settings.n_trials == 0 {
            return Err(SimError::InvalidConfig("n_trials must be at least 1".to_string()));
        }
        if !(settings.tau.is_finite() && settings.tau > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "tau must be positive, got {}",
                settings.tau
            )));
        }
        if settings.estimators.is_empty() {
            return Err(SimError::InvalidConfig("no estimators selected".to_string()));
        }
        for kind in &settings.estimators {
            kind.check_task(settings.task)?;
        }
        let window = TrimWindow::new(data.len(), settings.alpha)?;
        Ok(Self { settings, graph, data, window })
    }

    /// Materialize an experiment: load and corrupt the dataset, shuffle it
    /// once, and build (or take from the dataset file) the network.
    ///
    /// All setup randomness comes from stream 0 of the experiment seed. The
    /// base placement is always shuffled; `shuffle` only controls the
    /// per-trial reshuffle in [`schedule`](Self::schedule).
    pub fn from_config(config: &ExperimentConfig) -> Result<Self> {
        config.validate()?;
        let mut setup = ChaCha8Rng::seed_from_u64(config.seed);
        let dataset = config.data.load(config.n, &mut setup)?;
        let mut data = dataset.values;
        data.shuffle(&mut setup);
        let graph = match dataset.graph {
            Some(graph) => graph,
            None => generate_graph(data.len(), config.graph, config.seed)?,
        };
        info!(
            experiment = %config.name,
            n = data.len(),
            edges = graph.edge_count(),
            graph = %config.graph,
            task = %config.task,
            "experiment configured"
        );
        Self::new(DriverSettings::from_config(config), graph, data)
    }

    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The base dataset, before per-trial shuffling.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn connectivity(&self) -> Result<f64> {
        compute_connectivity(&self.graph)
    }

    /// Draw the dataset placement and edge sequence of `trial`.
    pub fn schedule(&self, trial: usize) -> TrialSchedule {
        let mut rng = ChaCha8Rng::seed_from_u64(self.settings.seed);
        rng.set_stream(trial as u64 + 1);
        let mut data = self.data.clone();
        if self.settings.shuffle {
            data.shuffle(&mut rng);
        }
        let edges = (1..self.settings.horizon)
            .map(|_| self.graph.sample_edge(&mut rng))
            .collect();
        TrialSchedule { data, edges }
    }

    /// Run one trial and score every estimator against ground truth.
    pub fn run_trial(&self, trial: usize) -> Result<TrialOutcome> {
        let TrialSchedule { data, edges } = self.schedule(trial);
        let truth = Truth {
            ranks: true_ranks(&data),
            robust_mean: self.window.mean_of(&data),
        };
        let mut estimators = self.build_estimators(&data)?;
        let horizon = self.settings.horizon;
        let mut step_error = vec![vec![0.0; horizon]; estimators.len()];

        // Row t - 1 is final only once step t has run.
        for (t, &(i, j)) in (1..horizon).zip(&edges) {
            for (estimator, errors) in estimators.iter_mut().zip(step_error.iter_mut()) {
                estimator.update(t, i, j);
                errors[t - 1] = self.step_error(estimator, t - 1, &truth);
            }
        }
        for (estimator, errors) in estimators.iter().zip(step_error.iter_mut()) {
            errors[horizon - 1] = self.step_error(estimator, horizon - 1, &truth);
        }

        let outcomes = estimators
            .iter()
            .zip(step_error)
            .map(|(estimator, step_error)| EstimatorOutcome {
                name: estimator.name().to_string(),
                final_error: self.final_error(estimator, &truth),
                step_error,
            })
            .collect();

        Ok(TrialOutcome {
            trial,
            data,
            true_ranks: truth.ranks,
            robust_mean: truth.robust_mean,
            estimators: outcomes,
        })
    }

    /// Drive fresh estimators over a recorded edge sequence (`edges[k]` is
    /// contacted at step `k + 1`) and hand them back for inspection.
    pub fn replay(&self, data: &[f64], edges: &[(usize, usize)]) -> Result<Vec<Estimator>> {
        let n = self.graph.node_count();
        if data.len() != n {
            return Err(SimError::DataLength { expected: n, actual: data.len() });
        }
        if edges.len() >= self.settings.horizon {
            return Err(SimError::InvalidConfig(format!(
                "{} edges do not fit a horizon of {}",
                edges.len(),
                self.settings.horizon
            )));
        }
        if let Some(&(u, v)) = edges.iter().find(|&&(u, v)| u >= n || v >= n || u == v) {
            return Err(SimError::EdgeOutOfRange { u, v, n });
        }

        let mut estimators = self.build_estimators(data)?;
        for (t, &(i, j)) in (1..).zip(edges) {
            for estimator in &mut estimators {
                estimator.update(t, i, j);
            }
        }
        Ok(estimators)
    }

    /// Run every trial and aggregate the error curves.
    pub fn run(&self) -> Result<ExperimentResult> {
        let start = Instant::now();
        let outcomes = (0..self.settings.n_trials)
            .into_par_iter()
            .map(|trial| {
                let outcome = self.run_trial(trial)?;
                let last_step: Vec<f64> = outcome
                    .estimators
                    .iter()
                    .map(|e| e.step_error.last().copied().unwrap_or_default())
                    .collect();
                debug!(
                    trial,
                    robust_mean = outcome.robust_mean,
                    final_step_error = ?last_step,
                    "trial finished"
                );
                Ok(outcome)
            })
            .collect::<Result<Vec<_>>>()?;

        let result = self.aggregate(outcomes)?;
        info!(
            trials = result.n_trials,
            horizon = result.horizon,
            connectivity = result.connectivity,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "experiment finished"
        );
        Ok(result)
    }

    fn build_estimators(&self, data: &[f64]) -> Result<Vec<Estimator>> {
        let params = self.settings.params();
        self.settings
            .estimators
            .iter()
            .map(|&kind| Estimator::build(kind, data, &params))
            .collect()
    }

    fn step_error(&self, estimator: &Estimator, t: usize, truth: &Truth) -> f64 {
        let row = estimator.output().row(t);
        let n = row.len() as f64;
        let total: f64 = match self.settings.task {
            Task::Ranking => {
                let weight = estimator.weight();
                row.iter()
                    .zip(&truth.ranks)
                    .map(|(estimate, &rank)| (estimate * weight - rank as f64 / n).abs())
                    .sum()
            }
            Task::Averaging => row.iter().map(|z| (z - truth.robust_mean).abs()).sum(),
        };
        total / n
    }

    fn final_error(&self, estimator: &Estimator, truth: &Truth) -> Option<Vec<f64>> {
        match estimator {
            Estimator::Rank(rank) => {
                let n = rank.node_count() as f64;
                let weight = rank.weight();
                let errors = rank
                    .ranking()
                    .latest()
                    .iter()
                    .zip(&truth.ranks)
                    .map(|(estimate, &r)| (estimate * weight - r as f64 / n).abs())
                    .collect();
                Some(errors)
            }
            Estimator::Mean(MeanEstimator::GoTrim(trim)) => {
                let n = truth.ranks.len() as f64;
                let errors = trim
                    .weights()
                    .latest()
                    .iter()
                    .zip(&truth.ranks)
                    .map(|(w, &r)| (w - n * self.window.weight(r as f64 + 1.0)).abs())
                    .collect();
                Some(errors)
            }
            Estimator::Mean(MeanEstimator::ClippedGossip(_)) => None,
        }
    }

    /// Fold trial outcomes in trial order.
    fn aggregate(&self, outcomes: Vec<TrialOutcome>) -> Result<ExperimentResult> {
        let horizon = self.settings.horizon;
        let n = self.data.len();
        let n_trials = outcomes.len();
        let last = outcomes
            .last()
            .ok_or_else(|| SimError::InvalidConfig("no trials were run".to_string()))?;
        let names: Vec<String> = last.estimators.iter().map(|e| e.name.clone()).collect();

        let mut moments = vec![SeriesMoments::new(horizon); names.len()];
        let mut final_sums: Vec<Option<Vec<f64>>> = vec![None; names.len()];
        let mut last_steps = vec![Vec::with_capacity(n_trials); names.len()];
        for outcome in &outcomes {
            for (k, estimator) in outcome.estimators.iter().enumerate() {
                moments[k].push(&estimator.step_error);
                last_steps[k].push(estimator.step_error[horizon - 1]);
                if let Some(errors) = &estimator.final_error {
                    let sum = final_sums[k].get_or_insert_with(|| vec![0.0; n]);
                    for (acc, e) in sum.iter_mut().zip(errors) {
                        *acc += e;
                    }
                }
            }
        }

        let mut result = ExperimentResult {
            task: self.settings.task,
            n_trials,
            horizon,
            names: names.clone(),
            connectivity: self.connectivity()?,
            data: last.data.clone(),
            true_ranks: last.true_ranks.clone(),
            robust_mean: last.robust_mean,
            error_mean: Default::default(),
            mean_relative_error: Default::default(),
            std_relative_error: Default::default(),
            final_step_error: Default::default(),
        };
        for (k, name) in names.into_iter().enumerate() {
            if let Some(sum) = final_sums[k].take() {
                let mean = sum.into_iter().map(|s| s / n_trials as f64).collect();
                result.error_mean.insert(name.clone(), mean);
            }
            result.mean_relative_error.insert(name.clone(), moments[k].mean().to_vec());
            result.std_relative_error.insert(name.clone(), moments[k].std_dev());
            result.final_step_error.insert(name, Stats::from_samples(&last_steps[k]));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::GraphKind;

    fn settings(task: Task, estimators: Vec<EstimatorKind>) -> DriverSettings {
        DriverSettings {
            horizon: 200,
            n_trials: 3,
            seed: 11,
            task,
            alpha: 0.2,
            tau: 5.0,
            shuffle: true,
            retention: Retention::Streaming,
            estimators,
        }
    }

    fn complete(n: usize) -> Graph {
        generate_graph(n, GraphKind::Complete, 0).unwrap()
    }

    fn ranking_driver() -> SimulationDriver {
        let data: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        let estimators = EstimatorKind::defaults_for(Task::Ranking);
        SimulationDriver::new(settings(Task::Ranking, estimators), complete(10), data).unwrap()
    }

    #[test]
    fn construction_is_validated() {
        let data = vec![1.0, 2.0, 3.0];
        let graph = complete(4);
        assert!(matches!(
            SimulationDriver::new(settings(Task::Ranking, vec![EstimatorKind::GoRank]), graph, data),
            Err(SimError::DataLength { expected: 4, actual: 3 })
        ));

        let data = vec![1.0, 2.0, 3.0, 4.0];
        let mismatch = settings(Task::Averaging, vec![EstimatorKind::Baseline]);
        assert!(matches!(
            SimulationDriver::new(mismatch, complete(4), data.clone()),
            Err(SimError::EstimatorTaskMismatch { .. })
        ));

        let mut degenerate = settings(Task::Averaging, vec![EstimatorKind::GoTrimGoRank]);
        degenerate.alpha = 0.5;
        assert!(matches!(
            SimulationDriver::new(degenerate, complete(4), data.clone()),
            Err(SimError::DegenerateTrim { .. })
        ));

        let mut no_steps = settings(Task::Ranking, vec![EstimatorKind::GoRank]);
        no_steps.horizon = 0;
        assert!(SimulationDriver::new(no_steps, complete(4), data).is_err());
    }

    #[test]
    fn schedules_are_reproducible_per_trial() {
        let driver = ranking_driver();
        let a = driver.schedule(1);
        assert_eq!(a, driver.schedule(1));
        assert_eq!(a.edges.len(), 199);
        assert_ne!(a, driver.schedule(2), "trials must draw independent streams");

        let mut sorted = a.data.clone();
        sorted.sort_by(f64::total_cmp);
        assert_eq!(sorted, driver.data());
    }

    #[test]
    fn trial_scores_every_row() {
        let driver = ranking_driver();
        let outcome = driver.run_trial(0).unwrap();
        assert_eq!(outcome.estimators.len(), 3);
        for estimator in &outcome.estimators {
            assert_eq!(estimator.step_error.len(), 200);
            assert_eq!(estimator.final_error.as_ref().map(Vec::len), Some(10));
            let last = estimator.step_error[199];
            let mean_final = estimator.final_error.as_ref().unwrap().iter().sum::<f64>() / 10.0;
            assert!((last - mean_final).abs() < 1e-12, "{}", estimator.name);
        }
    }

    #[test]
    fn go_rank_starts_from_half_error() {
        // Row 0 of GoRank is all zero, so its error is the mean of k / n.
        let driver = ranking_driver();
        let outcome = driver.run_trial(0).unwrap();
        let expected = (0..10).map(|k| k as f64 / 10.0).sum::<f64>() / 10.0;
        assert!((outcome.estimators[0].step_error[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn single_step_horizon() {
        let data = vec![4.0, 1.0, 3.0];
        let mut one = settings(Task::Averaging, EstimatorKind::defaults_for(Task::Averaging));
        one.horizon = 1;
        one.alpha = 0.0;
        let driver = SimulationDriver::new(one, complete(3), data).unwrap();
        let result = driver.run().unwrap();
        assert_eq!(result.horizon, 1);
        // Clipped gossip starts at the data: |4-8/3| + |1-8/3| + |3-8/3| = 10/3.
        let clipped = &result.mean_relative_error["Clipped Gossip (He et al.)"];
        assert!((clipped[0] - 10.0 / 9.0).abs() < 1e-12);
        assert!(!result.error_mean.contains_key("Clipped Gossip (He et al.)"));
    }

    #[test]
    fn base_placement_is_shuffled_without_trial_reshuffle() {
        let config = ExperimentConfig::from_yaml_str(
            "name: fixed\nn: 10\nhorizon: 50\nn_trials: 2\nseed: 5\ngraph: complete\nshuffle: false\n",
        )
        .unwrap();
        let driver = SimulationDriver::from_config(&config).unwrap();

        let sorted: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        assert_ne!(driver.data(), sorted.as_slice(), "base data left in sorted order");
        let mut placed = driver.data().to_vec();
        placed.sort_by(f64::total_cmp);
        assert_eq!(placed, sorted);

        // Without the trial reshuffle every trial sees the base placement.
        assert_eq!(driver.schedule(0).data, driver.data());
        assert_eq!(driver.schedule(1).data, driver.data());

        // The identity-initialised baselines therefore start away from the truth.
        let outcome = driver.run_trial(0).unwrap();
        for scored in &outcome.estimators {
            assert!(scored.step_error[0] > 1e-3, "{} starts at the true ranks", scored.name);
        }
    }

    #[test]
    fn replay_rejects_bad_edges() {
        let driver = ranking_driver();
        let data = driver.data().to_vec();
        assert!(matches!(
            driver.replay(&data, &[(0, 10)]),
            Err(SimError::EdgeOutOfRange { u: 0, v: 10, n: 10 })
        ));
        let too_many = vec![(0, 1); 200];
        assert!(driver.replay(&data, &too_many).is_err());
        assert!(matches!(driver.replay(&data[..3], &[]), Err(SimError::DataLength { .. })));
    }
}
