// GoTrim Experiment Runner - Monte Carlo comparison of gossip estimators
// Seeded ChaCha8 trials, rayon-parallel, JSON report plus optional JSONL curves
//
// Usage:
//   cargo run --release --bin gotrim                          # Run all presets
//   cargo run --release --bin gotrim -- --runs 5              # Quick mode (5 trials each)
//   cargo run --release --bin gotrim -- TRIM                  # Filter by name/category
//   cargo run --release --bin gotrim -- --config exp.yaml     # Run one YAML experiment
//   cargo run --release --bin gotrim -- --time-series         # Enable JSONL output
//   RUST_LOG=debug cargo run --release --bin gotrim           # Per-trial logging

mod presets;
mod time_series;

use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use clap::{Parser, ValueEnum};
use gotrim_engine::{ExperimentConfig, ExperimentResult, Retention, SimulationDriver};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use presets::{presets, Preset};
use time_series::{file_stem, TimeSeriesRecorder};

// ─── CLI Parsing ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
enum History {
    Full,
    Streaming,
}

impl From<History> for Retention {
    fn from(history: History) -> Self {
        match history {
            History::Full => Retention::Full,
            History::Streaming => Retention::Streaming,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "gotrim", version, about = "Gossip rank and trimmed-mean estimation experiments")]
struct Cli {
    /// Run a single experiment from a YAML file instead of the presets
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the number of trials per experiment
    #[arg(long)]
    runs: Option<usize>,

    /// Override the experiment seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override how much per-step history each estimator keeps
    #[arg(long, value_enum)]
    history: Option<History>,

    /// Write per-estimator error curves as JSONL
    #[arg(long)]
    time_series: bool,

    /// Output directory
    #[arg(long, default_value = "results")]
    out: PathBuf,

    /// Only run presets whose name, label or category contains this text
    filter: Option<String>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut ExperimentConfig) {
        if let Some(runs) = self.runs {
            config.n_trials = runs;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(history) = self.history {
            config.history = history.into();
        }
    }
}

// ─── Report File ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct RunReport<'a> {
    timestamp: &'a str,
    version: &'static str,
    prng: &'static str,
    config: &'a ExperimentConfig,
    elapsed_ms: u64,
    result: &'a ExperimentResult,
}

fn save(
    out: &Path,
    config: &ExperimentConfig,
    result: &ExperimentResult,
    elapsed_ms: u64,
    time_series: bool,
) -> Result<PathBuf, Box<dyn Error>> {
    let dir = out.join(&config.name);
    std::fs::create_dir_all(&dir)?;

    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis().to_string();
    let report = RunReport {
        timestamp: &timestamp,
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        config,
        elapsed_ms,
        result,
    };
    let path = dir.join(format!("result-{}.json", timestamp));
    std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    std::fs::write(dir.join("config.yaml"), config.to_yaml()?)?;

    if time_series {
        for name in &result.names {
            let Some(recorder) = TimeSeriesRecorder::from_result(result, name) else {
                continue;
            };
            let ts_path = dir.join("time-series").join(format!("{}.jsonl", file_stem(name)));
            recorder.write_jsonl(&ts_path)?;
            info!(estimator = %name, steps = recorder.len(), path = %ts_path.display(), "time series written");
        }
    }
    Ok(path)
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    let to_run: Vec<Preset> = match &cli.config {
        Some(path) => {
            let config = ExperimentConfig::load(path)?;
            vec![Preset {
                name: "CONFIG",
                label: "YAML experiment",
                category: "custom",
                config,
            }]
        }
        None => {
            let all = presets();
            match &cli.filter {
                Some(f) => {
                    let f_lower = f.to_lowercase();
                    all.into_iter()
                        .filter(|p| p.name.to_lowercase().contains(&f_lower)
                                  || p.label.to_lowercase().contains(&f_lower)
                                  || p.category.to_lowercase().contains(&f_lower))
                        .collect()
                }
                None => all,
            }
        }
    };

    if to_run.is_empty() {
        return Err(format!("no presets match filter: {:?}", cli.filter).into());
    }

    println!("\n  GoTrim Experiment Runner v{}", env!("CARGO_PKG_VERSION"));
    println!("  PRNG: ChaCha8Rng | Threads: {} | Experiments: {}\n",
        rayon::current_num_threads(), to_run.len());
    println!("  {:<28} {:<36} {:>12} {:>12} {:>8}",
        "Experiment", "Estimator", "Final err", "±95% CI", "Time");
    println!("  {}", "-".repeat(100));

    let suite_start = Instant::now();
    let mut failed = 0;

    for preset in to_run {
        let mut config = preset.config;
        cli.apply_overrides(&mut config);

        let start = Instant::now();
        let outcome = SimulationDriver::from_config(&config).and_then(|driver| driver.run());
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                warn!(experiment = %config.name, error = %e, "experiment failed");
                println!("  {:<28} {}", config.name, e);
                failed += 1;
                continue;
            }
        };

        for name in &result.names {
            let Some(stats) = result.final_step_error.get(name) else {
                continue;
            };
            let ci = (stats.ci_upper - stats.ci_lower) / 2.0;
            println!("  {:<28} {:<36} {:>12.4e} {:>12.2e} {:>6}ms",
                config.name, name, stats.mean, ci, elapsed_ms);
        }
        println!("  {:<28} connectivity {:.2e}", "", result.connectivity);

        let path = save(&cli.out, &config, &result, elapsed_ms, cli.time_series)?;
        println!("  {:<28} saved to {}", "", path.display());
    }

    println!("  {}", "-".repeat(100));
    println!("  Suite time: {:.1}s  Failed: {}\n", suite_start.elapsed().as_secs_f64(), failed);

    if failed > 0 {
        return Err(format!("{} experiment(s) failed", failed).into());
    }
    Ok(())
}
