#[cfg(test)]
mod tests {
    use gotrim_engine::*;

    fn settings(task: Task, estimators: Vec<EstimatorKind>, horizon: usize) -> DriverSettings {
        DriverSettings {
            horizon,
            n_trials: 4,
            seed: 7,
            task,
            alpha: 0.0,
            tau: 100.0,
            shuffle: true,
            retention: Retention::Streaming,
            estimators,
        }
    }

    fn complete(n: usize) -> Graph {
        generate_graph(n, GraphKind::Complete, 0).unwrap()
    }

    fn data_mean(data: &[f64]) -> f64 {
        data.iter().sum::<f64>() / data.len() as f64
    }

    // ========== Convergence ==========

    #[test]
    fn test_go_trim_reaches_plain_mean_without_trimming() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let s = settings(Task::Averaging, vec![EstimatorKind::GoTrimGoRank], 2000);
        let driver = SimulationDriver::new(s, complete(5), data).unwrap();

        let schedule = driver.schedule(0);
        let estimators = driver.replay(&schedule.data, &schedule.edges).unwrap();
        let z = estimators[0].output().latest();
        for (k, value) in z.iter().enumerate() {
            assert!((value - 3.0).abs() < 0.05, "node {} estimate {} too far from 3.0", k, value);
        }
    }

    #[test]
    fn test_go_trim_ignores_outliers() {
        // 20 values with the two largest blown up; alpha 0.1 trims them away.
        let mut data: Vec<f64> = (1..=20).map(|v| v as f64).collect();
        data[18] = 1900.0;
        data[19] = 2000.0;
        let robust = trim_mean(&data, 0.1).unwrap();
        assert!((robust - 10.5).abs() < 1e-12);

        let mut s = settings(Task::Averaging, vec![EstimatorKind::GoTrimImprovedBaseline], 20_000);
        s.alpha = 0.1;
        let driver = SimulationDriver::new(s, complete(20), data).unwrap();
        let outcome = driver.run_trial(0).unwrap();
        let errors = &outcome.estimators[0].step_error;
        let plain_mean = data_mean(&outcome.data);
        assert!(plain_mean > 200.0);
        assert!((outcome.robust_mean - 10.5).abs() < 1e-12);
        assert!(errors[19_999] < 0.1, "final error {} did not converge", errors[19_999]);
        let weights = outcome.estimators[0].final_error.as_ref().unwrap();
        assert!(weights.iter().all(|&e| e == 0.0), "weights not settled: {:?}", weights);
    }

    // ========== Determinism ==========

    #[test]
    fn test_replay_reproduces_trial() {
        let data: Vec<f64> = (1..=12).map(|v| (v * v) as f64).collect();
        let s = settings(Task::Ranking, EstimatorKind::defaults_for(Task::Ranking), 500);
        let driver = SimulationDriver::new(s, complete(12), data).unwrap();

        let outcome = driver.run_trial(3).unwrap();
        let schedule = driver.schedule(3);
        assert_eq!(outcome.data, schedule.data);
        assert_eq!(outcome.true_ranks, true_ranks(&schedule.data));

        let estimators = driver.replay(&schedule.data, &schedule.edges).unwrap();
        for (estimator, scored) in estimators.iter().zip(&outcome.estimators) {
            assert_eq!(estimator.name(), scored.name);
            let expected: Vec<f64> = estimator
                .output()
                .latest()
                .iter()
                .zip(&outcome.true_ranks)
                .map(|(r, &truth)| (r * estimator.weight() - truth as f64 / 12.0).abs())
                .collect();
            assert_eq!(scored.final_error.as_ref(), Some(&expected), "{} diverged", scored.name);
        }
    }

    #[test]
    fn test_streaming_matches_full_history() {
        let data: Vec<f64> = (1..=15).map(|v| v as f64).collect();
        let mut s = settings(Task::Averaging, EstimatorKind::defaults_for(Task::Averaging), 800);
        s.alpha = 0.2;
        s.tau = 2.0;
        let graph = generate_graph(15, GraphKind::WattsStrogatz, 4).unwrap();

        let streaming = SimulationDriver::new(s.clone(), graph.clone(), data.clone()).unwrap();
        s.retention = Retention::Full;
        let full = SimulationDriver::new(s, graph, data).unwrap();

        let a = streaming.run().unwrap();
        let b = full.run().unwrap();
        assert_eq!(a.mean_relative_error, b.mean_relative_error);
        assert_eq!(a.std_relative_error, b.std_relative_error);
        assert_eq!(a.error_mean, b.error_mean);
    }

    #[test]
    fn test_run_independent_of_thread_count() {
        let data: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        let mut s = settings(Task::Ranking, EstimatorKind::defaults_for(Task::Ranking), 300);
        s.n_trials = 8;
        let driver = SimulationDriver::new(s, complete(10), data).unwrap();

        let parallel = driver.run().unwrap();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let serial = pool.install(|| driver.run()).unwrap();

        assert_eq!(parallel.mean_relative_error, serial.mean_relative_error);
        assert_eq!(parallel.std_relative_error, serial.std_relative_error);
        assert_eq!(parallel.error_mean, serial.error_mean);
        assert_eq!(parallel.data, serial.data);
    }

    // ========== Connectivity ==========

    #[test]
    fn test_path_connectivity() {
        let path = Graph::new(3, vec![(0, 1), (1, 2)]).unwrap();
        let connectivity = compute_connectivity(&path).unwrap();
        assert!((connectivity - 0.5).abs() < 1e-9, "got {}", connectivity);
    }

    // ========== End to End ==========

    #[test]
    fn test_yaml_experiment_end_to_end() {
        let yaml = r#"
name: e2e_ranking
n: 20
horizon: 3000
n_trials: 5
seed: 3
graph: complete
task: ranking
"#;
        let config = ExperimentConfig::from_yaml_str(yaml).unwrap();
        let driver = SimulationDriver::from_config(&config).unwrap();
        let result = driver.run().unwrap();

        assert_eq!(result.n_trials, 5);
        assert_eq!(
            result.names,
            vec!["GoRank (ours)", "Baseline++ (ours)", "Baseline (Chiuso et al.)"]
        );
        assert!((result.connectivity - 20.0 / 190.0).abs() < 1e-9);
        for name in &result.names {
            let curve = &result.mean_relative_error[name];
            assert_eq!(curve.len(), 3000);
            assert!(curve[2999] < curve[0], "{} did not improve", name);
            assert_eq!(result.error_mean[name].len(), 20);
            assert_eq!(result.final_step_error[name].n, 5);
        }
        let go_rank = &result.mean_relative_error["GoRank (ours)"];
        assert!(go_rank[2999] < go_rank[0] / 5.0);
    }

    #[test]
    fn test_file_dataset_brings_its_graph() {
        let dir = std::env::temp_dir().join(format!("gotrim-e2e-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sensors.json");
        std::fs::write(
            &path,
            r#"{"values": [21.5, 19.0, 22.0, 20.5], "edges": [[0, 1], [1, 2], [2, 3]]}"#,
        )
        .unwrap();

        let yaml = format!(
            "name: sensors\nhorizon: 100\nn_trials: 2\ntask: averaging\nalpha: 0.25\ndata: {{ kind: file, path: {:?} }}\n",
            path
        );
        let config = ExperimentConfig::from_yaml_str(&yaml).unwrap();
        let driver = SimulationDriver::from_config(&config).unwrap();
        assert_eq!(driver.graph().edge_count(), 3);

        let result = driver.run().unwrap();
        assert_eq!(result.data.len(), 4);
        // Path P4: lambda_2 = 2 - sqrt(2), three edges.
        let expected = (2.0 - 2.0_f64.sqrt()) / 3.0;
        assert!((result.connectivity - expected).abs() < 1e-9);
        // alpha 0.25 keeps the middle two of four: 20.5 and 21.5 (+- jitter).
        assert!((result.robust_mean - 21.0).abs() < 1e-3);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
