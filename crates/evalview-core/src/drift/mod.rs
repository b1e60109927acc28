//! Append-only check history and gradual-drift detection.
//!
//! One JSONL file per installation records a compact row per check. The
//! tracker is best-effort by contract: a history write that fails must
//! never abort a test run, so every I/O error here is logged and swallowed.
//!
//! Single-writer assumption: one test-runner process owns the `.evalview/`
//! directory for the duration of a run. Concurrent in-process appends are
//! tolerated (append + occasionally-redundant prune), but no cross-process
//! locking is attempted.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::diff::model::{DiffStatus, TraceDiff};

/// Ceiling on stored entries across all tests; oldest dropped first.
pub const MAX_HISTORY_ENTRIES: usize = 10_000;

/// Lower bound on the byte length of a serialized entry line. Used to skip
/// reading the whole log on every append: a file smaller than
/// `max_entries * MIN_BYTES_PER_LINE` cannot be over the cap.
const MIN_BYTES_PER_LINE: u64 = 64;

pub const DEFAULT_DRIFT_WINDOW: usize = 10;
pub const DEFAULT_SLOPE_THRESHOLD: f64 = -0.02;

/// One check outcome, as stored in the history log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftEntry {
    pub timestamp: DateTime<Utc>,
    pub test_name: String,
    pub status: DiffStatus,
    pub score_diff: f64,
    pub output_similarity: f64,
    pub tool_changes: usize,
    pub model_changed: bool,
}

pub struct DriftTracker {
    history_path: PathBuf,
    max_entries: usize,
}

impl DriftTracker {
    pub fn new(history_path: impl Into<PathBuf>) -> Self {
        Self {
            history_path: history_path.into(),
            max_entries: MAX_HISTORY_ENTRIES,
        }
    }

    /// Override the entry cap (tests, constrained environments).
    pub fn with_max_entries(history_path: impl Into<PathBuf>, max_entries: usize) -> Self {
        Self {
            history_path: history_path.into(),
            max_entries,
        }
    }

    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    /// Append one check outcome. Best-effort: failures are logged, never
    /// raised.
    pub fn record_check(&self, test_name: &str, diff: &TraceDiff) {
        let entry = DriftEntry {
            timestamp: Utc::now(),
            test_name: test_name.to_string(),
            status: diff.status,
            score_diff: diff.score_diff,
            output_similarity: diff.output_similarity(),
            tool_changes: diff.tool_diffs.len(),
            model_changed: diff.model_changed,
        };
        if let Err(e) = self.append(&entry) {
            tracing::warn!(test = %test_name, error = %e, "failed to record check history; continuing");
        }
    }

    fn append(&self, entry: &DriftEntry) -> anyhow::Result<()> {
        if let Some(parent) = self.history_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(entry)?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.history_path)?;
        writeln!(file, "{line}")?;
        drop(file);

        self.prune_if_oversized()?;
        Ok(())
    }

    /// Keep the log bounded. A cheap size stat gates the full read: only a
    /// file that could plausibly hold more than `max_entries` lines gets
    /// read, truncated to the newest entries, and rewritten.
    fn prune_if_oversized(&self) -> anyhow::Result<()> {
        let size = fs::metadata(&self.history_path)?.len();
        if size <= self.max_entries as u64 * MIN_BYTES_PER_LINE {
            return Ok(());
        }

        let content = fs::read_to_string(&self.history_path)?;
        let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.len() <= self.max_entries {
            return Ok(());
        }

        let dropped = lines.len() - self.max_entries;
        let kept = &lines[dropped..];
        let mut rewritten = kept.join("\n");
        rewritten.push('\n');
        fs::write(&self.history_path, rewritten)?;
        tracing::debug!(dropped, kept = kept.len(), "pruned check history");
        Ok(())
    }

    /// Up to `limit` most recent entries for a test, newest first.
    pub fn get_test_history(&self, test_name: &str, limit: usize) -> Vec<DriftEntry> {
        let mut entries = self.read_entries(test_name);
        entries.reverse();
        entries.truncate(limit);
        entries
    }

    /// Flag a slow decline in output similarity that per-check thresholds
    /// miss.
    ///
    /// Fits an ordinary-least-squares slope over the last `window` entries
    /// (chronological). Fewer than 3 points cannot be distinguished from
    /// noise, so the answer is `None`. A naive first-vs-last comparison is
    /// deliberately not used: one outlier endpoint would dominate it, while
    /// the fit weighs every point in the window.
    pub fn detect_gradual_drift(
        &self,
        test_name: &str,
        window: usize,
        slope_threshold: f64,
    ) -> Option<String> {
        let entries = self.read_entries(test_name);
        let start = entries.len().saturating_sub(window);
        let recent = &entries[start..];
        if recent.len() < 3 {
            return None;
        }

        let values: Vec<f64> = recent.iter().map(|e| e.output_similarity).collect();
        let slope = compute_slope(&values);
        if slope < slope_threshold {
            Some(format!(
                "gradual output drift on '{}': similarity {:.3} -> {:.3} over {} checks (slope {:+.2}% per check)",
                test_name,
                values[0],
                values[values.len() - 1],
                values.len(),
                slope * 100.0,
            ))
        } else {
            None
        }
    }

    /// All entries for a test, chronological. Missing log means no history;
    /// malformed lines are skipped.
    fn read_entries(&self, test_name: &str) -> Vec<DriftEntry> {
        let content = match fs::read_to_string(&self.history_path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.history_path.display(), error = %e, "failed to read check history");
                return Vec::new();
            }
        };

        let mut entries = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<DriftEntry>(line) {
                Ok(entry) => {
                    if entry.test_name == test_name {
                        entries.push(entry);
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "skipping malformed history line");
                }
            }
        }
        entries
    }
}

/// OLS regression slope of `values` against their index `0..n`.
///
/// slope = Σ(xᵢ−x̄)(yᵢ−ȳ) / Σ(xᵢ−x̄)², defined as 0.0 for fewer than two
/// points (the denominator would be 0).
pub fn compute_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let x_mean = (n as f64 - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n as f64;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        numerator += dx * (y - y_mean);
        denominator += dx * dx;
    }
    if denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slope_of_constant_sequence_is_zero() {
        assert_eq!(compute_slope(&[0.9, 0.9, 0.9, 0.9]), 0.0);
        assert_eq!(compute_slope(&[0.5]), 0.0);
        assert_eq!(compute_slope(&[]), 0.0);
    }

    #[test]
    fn slope_of_linear_decline_matches_step() {
        let slope = compute_slope(&[1.0, 0.96, 0.92, 0.88, 0.84]);
        assert!((slope - (-0.04)).abs() < 1e-9);
    }

    #[test]
    fn slope_resists_outliers_unlike_endpoint_delta() {
        let values = [0.95, 0.70, 0.95, 0.89];
        let slope = compute_slope(&values);
        let naive = (values[values.len() - 1] - values[0]) / values.len() as f64;
        assert!((slope - naive).abs() > 1e-6, "slope {slope} vs naive {naive}");
        // The fit sees a flat-to-slightly-rising window; the endpoints alone
        // would report a decline.
        assert!(slope > 0.0);
        assert!(naive < 0.0);
    }
}
