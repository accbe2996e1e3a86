// Per-Step JSONL Error Curves
// One JSON line per step and estimator file, for plotting outside the runner

use gotrim_engine::ExperimentResult;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct StepSnapshot {
    pub step: usize,
    pub mean_error: f64,
    pub std_error: f64,
}

/// Error curve of one estimator, mean and std over trials.
pub struct TimeSeriesRecorder {
    snapshots: Vec<StepSnapshot>,
}

impl TimeSeriesRecorder {
    pub fn from_result(result: &ExperimentResult, estimator: &str) -> Option<Self> {
        let mean = result.mean_relative_error.get(estimator)?;
        let std = result.std_relative_error.get(estimator)?;
        let snapshots = mean
            .iter()
            .zip(std)
            .enumerate()
            .map(|(step, (&mean_error, &std_error))| StepSnapshot { step, mean_error, std_error })
            .collect();
        Some(Self { snapshots })
    }

    /// Write all snapshots to a JSONL file
    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        file.flush()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }
}

/// File name for an estimator display name: "GoTrim + GoRank (ours)" becomes
/// "gotrim-gorank-ours".
pub fn file_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.is_empty() && !stem.ends_with('-') {
            stem.push('-');
        }
    }
    while stem.ends_with('-') {
        stem.pop();
    }
    stem
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems_are_filesystem_safe() {
        assert_eq!(file_stem("GoTrim + GoRank (ours)"), "gotrim-gorank-ours");
        assert_eq!(file_stem("Baseline++ (ours)"), "baseline-ours");
        assert_eq!(file_stem("Clipped Gossip (He et al.)"), "clipped-gossip-he-et-al");
    }
}
