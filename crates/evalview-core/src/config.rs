//! Configuration for diffing and on-disk layout.
//!
//! Loaded from `evalview.yaml` when present; every field has a default so a
//! bare repository works without any config file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Thresholds and normalization flags for trace comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Reserved for fuzzy tool-name matching; not consulted by the current
    /// alignment, which matches tool names exactly.
    pub tool_similarity_threshold: f64,

    /// Output similarity below this classifies the check as `output_changed`.
    pub output_similarity_threshold: f64,

    /// Score drop (in points) beyond which a check is a `regression`.
    pub score_regression_threshold: f64,

    /// Collapse whitespace runs before computing output similarity.
    pub ignore_whitespace: bool,

    /// Lowercase outputs before computing output similarity.
    pub ignore_case_in_output: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            tool_similarity_threshold: 0.8,
            output_similarity_threshold: 0.95,
            score_regression_threshold: 5.0,
            ignore_whitespace: true,
            ignore_case_in_output: false,
        }
    }
}

/// Top-level harness configuration: diff thresholds plus where the golden
/// store and drift history live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalViewConfig {
    pub diff: DiffConfig,
    pub golden_dir: PathBuf,
    pub history_file: PathBuf,
}

impl Default for EvalViewConfig {
    fn default() -> Self {
        Self {
            diff: DiffConfig::default(),
            golden_dir: PathBuf::from(".evalview/golden"),
            history_file: PathBuf::from(".evalview/history.jsonl"),
        }
    }
}

impl EvalViewConfig {
    /// Load config from a YAML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config {}: {}", path.display(), e))?;
        let cfg: Self = serde_yaml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("failed to parse config {}: {}", path.display(), e))?;
        Ok(cfg)
    }

    /// Load config, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
