use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Five-way classification of how an actual trace compares to a golden.
///
/// `ContractDrift` is reserved for externally-detected interface drift; the
/// diff engine never assigns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Passed,
    ToolsChanged,
    OutputChanged,
    Regression,
    ContractDrift,
}

impl DiffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffStatus::Passed => "passed",
            DiffStatus::ToolsChanged => "tools_changed",
            DiffStatus::OutputChanged => "output_changed",
            DiffStatus::Regression => "regression",
            DiffStatus::ContractDrift => "contract_drift",
        }
    }

    /// Severity rank for best-match selection, best (0) to worst (4).
    pub fn rank(&self) -> u8 {
        match self {
            DiffStatus::Passed => 0,
            DiffStatus::OutputChanged => 1,
            DiffStatus::ToolsChanged => 2,
            DiffStatus::Regression => 3,
            DiffStatus::ContractDrift => 4,
        }
    }
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolDiffKind {
    /// Tool appears only in the actual run.
    Added,
    /// Tool appears only in the golden run.
    Removed,
    /// Tool at an aligned position differs (different name, or same name
    /// with changed parameters).
    Changed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamDiffKind {
    /// Present only in the golden step.
    Missing,
    /// Present only in the actual step.
    Added,
    /// Present in both with different JSON type classes.
    TypeChanged,
    /// Present in both, same type, unequal value.
    ValueChanged,
}

/// One divergent parameter on an aligned step pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDiff {
    pub key: String,
    pub kind: ParamDiffKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub golden_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_value: Option<Value>,
    /// String similarity when both values are text; absent otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

/// One alignment operation outcome.
///
/// `position` is the index in the golden sequence for removed/changed
/// entries and the index in the actual sequence for added ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDiff {
    pub position: usize,
    pub kind: ToolDiffKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub golden_tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_tool: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter_diffs: Vec<ParameterDiff>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDiff {
    pub golden_output: String,
    pub actual_output: String,
    pub similarity: f64,
}

/// Result of comparing one actual trace against one golden trace.
///
/// `status` is a deterministic function of the tool diffs, the output
/// similarity, and the score delta; it is never set independently by the
/// engine (external collaborators may overwrite it with `ContractDrift`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceDiff {
    pub test_name: String,
    pub has_differences: bool,
    pub tool_diffs: Vec<ToolDiff>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_diff: Option<OutputDiff>,
    /// actual − golden, in score points.
    pub score_diff: f64,
    /// actual − golden, in milliseconds.
    pub latency_diff: f64,
    pub status: DiffStatus,
    /// Which golden variant matched, for multi-reference comparisons:
    /// `"default"` or `"variant_N"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_variant: Option<String>,
    /// Whether the model identity changed between golden and actual.
    pub model_changed: bool,
}

impl TraceDiff {
    /// Output similarity of this comparison; 1.0 when outputs were equal
    /// after normalization (no [`OutputDiff`] recorded).
    pub fn output_similarity(&self) -> f64 {
        self.output_diff.as_ref().map_or(1.0, |d| d.similarity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&DiffStatus::ToolsChanged).unwrap(),
            "\"tools_changed\""
        );
        assert_eq!(DiffStatus::ContractDrift.as_str(), "contract_drift");
    }

    #[test]
    fn rank_orders_best_to_worst() {
        assert!(DiffStatus::Passed.rank() < DiffStatus::OutputChanged.rank());
        assert!(DiffStatus::OutputChanged.rank() < DiffStatus::ToolsChanged.rank());
        assert!(DiffStatus::ToolsChanged.rank() < DiffStatus::Regression.rank());
        assert!(DiffStatus::Regression.rank() < DiffStatus::ContractDrift.rank());
    }
}
