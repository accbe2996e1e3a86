// Built-in Experiment Presets
// Ranking and trimming comparisons over the three synthetic topologies

use gotrim_engine::{DataSource, EstimatorKind, ExperimentConfig, GraphKind, Retention, Task};

// ─── Preset Configuration ───────────────────────────────────────────────────

pub struct Preset {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub config: ExperimentConfig,
}

fn ranking(name: &str, graph: GraphKind, horizon: usize) -> ExperimentConfig {
    ExperimentConfig {
        name: name.to_string(),
        n: 100,
        horizon,
        n_trials: 30,
        seed: 0,
        graph,
        task: Task::Ranking,
        alpha: 0.0,
        tau: 100.0,
        shuffle: true,
        history: Retention::Streaming,
        data: DataSource::default(),
        estimators: None,
    }
}

fn trimming(name: &str, graph: GraphKind, alpha: f64, eps: f64) -> ExperimentConfig {
    ExperimentConfig {
        name: name.to_string(),
        n: 100,
        horizon: 20_000,
        n_trials: 30,
        seed: 0,
        graph,
        task: Task::Averaging,
        alpha,
        tau: 100.0,
        shuffle: true,
        history: Retention::Streaming,
        data: DataSource::Arange { eps, outlier: 10.0 },
        estimators: None,
    }
}

// ─── Preset Table ───────────────────────────────────────────────────────────

pub fn presets() -> Vec<Preset> {
    let go_rank_only = |mut config: ExperimentConfig| {
        config.estimators = Some(vec![EstimatorKind::GoRank]);
        config
    };

    vec![
        // Rank estimation, all three estimators
        Preset {
            name: "RANK_COMPLETE",
            label: "Ranking / complete graph",
            category: "ranking",
            config: ranking("rank_complete", GraphKind::Complete, 10_000),
        },
        Preset {
            name: "RANK_WS",
            label: "Ranking / Watts-Strogatz",
            category: "ranking",
            config: ranking("rank_ws", GraphKind::WattsStrogatz, 10_000),
        },
        Preset {
            name: "RANK_GRID",
            label: "Ranking / 2D grid",
            category: "ranking",
            config: ranking("rank_grid", GraphKind::Grid2d, 10_000),
        },
        // Long-horizon GoRank on sparse topologies
        Preset {
            name: "GORANK_LONG_WS",
            label: "GoRank long run / Watts-Strogatz",
            category: "ranking",
            config: go_rank_only(ranking("gorank_long_ws", GraphKind::WattsStrogatz, 50_000)),
        },
        Preset {
            name: "GORANK_LONG_GRID",
            label: "GoRank long run / 2D grid",
            category: "ranking",
            config: go_rank_only(ranking("gorank_long_grid", GraphKind::Grid2d, 50_000)),
        },
        // Robust mean under contamination
        Preset {
            name: "TRIM_WS",
            label: "Trimmed mean / Watts-Strogatz, eps 0.1",
            category: "averaging",
            config: trimming("trim_ws", GraphKind::WattsStrogatz, 0.1, 0.1),
        },
        Preset {
            name: "TRIM_GRID",
            label: "Trimmed mean / 2D grid, eps 0.1",
            category: "averaging",
            config: trimming("trim_grid", GraphKind::Grid2d, 0.1, 0.1),
        },
        Preset {
            name: "TRIM_COMPLETE",
            label: "Trimmed mean / complete graph, eps 0.1",
            category: "averaging",
            config: trimming("trim_complete", GraphKind::Complete, 0.1, 0.1),
        },
        Preset {
            name: "TRIM_HEAVY_WS",
            label: "Trimmed mean / Watts-Strogatz d6, eps 0.2",
            category: "averaging",
            config: trimming("trim_heavy_ws", GraphKind::WattsStrogatzD6, 0.2, 0.2),
        },
    ]
}
