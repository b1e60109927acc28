//! The diff engine: deterministic, explainable comparison of an actual
//! execution trace against one or more golden baselines.
//!
//! Pure functions over their inputs; no I/O, no shared state. Safe to call
//! concurrently for different tests.

pub mod align;
pub mod model;
pub mod params;
pub mod similarity;

use align::{align, AlignOp};
use model::{DiffStatus, OutputDiff, ToolDiff, ToolDiffKind, TraceDiff};

use crate::config::DiffConfig;
use crate::errors::DiffError;
use crate::fingerprint::{model_changed, sha256_hex};
use crate::golden::GoldenTrace;
use crate::trace::ExecutionTrace;

pub struct DiffEngine {
    config: DiffConfig,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new(DiffConfig::default())
    }
}

impl DiffEngine {
    pub fn new(config: DiffConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Compare one actual trace against one golden.
    pub fn compare(
        &self,
        golden: &GoldenTrace,
        actual: &ExecutionTrace,
        actual_score: f64,
    ) -> TraceDiff {
        let actual_tools = actual.tool_sequence();
        let tool_diffs = self.diff_tools(golden, actual, &actual_tools);

        // Cached hash short-circuits the ratio for byte-identical outputs.
        let similarity = if sha256_hex(&actual.final_output) == golden.output_hash {
            1.0
        } else {
            similarity::output_similarity(
                &golden.trace.final_output,
                &actual.final_output,
                &self.config,
            )
        };
        let output_diff = (similarity < 1.0).then(|| OutputDiff {
            golden_output: golden.trace.final_output.clone(),
            actual_output: actual.final_output.clone(),
            similarity,
        });

        let score_diff = actual_score - golden.metadata.score;
        let latency_diff = actual.total_latency_ms - golden.trace.total_latency_ms;
        let status = self.classify(&tool_diffs, similarity, score_diff);

        TraceDiff {
            test_name: golden.metadata.test_name.clone(),
            has_differences: !tool_diffs.is_empty()
                || output_diff.is_some()
                || status != DiffStatus::Passed,
            tool_diffs,
            output_diff,
            score_diff,
            latency_diff,
            status,
            matched_variant: None,
            model_changed: model_changed(golden.metadata.model.as_ref(), actual.model.as_ref()),
        }
    }

    /// Compare against every golden variant and keep the best match.
    ///
    /// Best is lowest severity rank; rank ties go to the smaller absolute
    /// score delta (first variant wins an exact tie). The winner is
    /// annotated with `"default"` for the first variant or `"variant_N"`
    /// for the Nth, 0-indexed by position in the input.
    pub fn compare_multi_reference(
        &self,
        variants: &[GoldenTrace],
        actual: &ExecutionTrace,
        actual_score: f64,
    ) -> Result<TraceDiff, DiffError> {
        let (first, rest) = variants.split_first().ok_or(DiffError::EmptyBaselines)?;

        let mut best = self.compare(first, actual, actual_score);
        best.matched_variant = Some("default".to_string());

        for (idx, variant) in rest.iter().enumerate() {
            let mut candidate = self.compare(variant, actual, actual_score);
            candidate.matched_variant = Some(format!("variant_{}", idx + 1));

            let candidate_key = (candidate.status.rank(), candidate.score_diff.abs());
            let best_key = (best.status.rank(), best.score_diff.abs());
            if candidate_key < best_key {
                best = candidate;
            }
        }
        Ok(best)
    }

    fn diff_tools(
        &self,
        golden: &GoldenTrace,
        actual: &ExecutionTrace,
        actual_tools: &[String],
    ) -> Vec<ToolDiff> {
        let mut tool_diffs = Vec::new();
        for op in align(&golden.tool_sequence, actual_tools) {
            match op {
                AlignOp::Equal { golden: gi, actual: ai } => {
                    // Names matched; parameters may still diverge.
                    let param_diffs = match (golden.trace.steps.get(gi), actual.steps.get(ai)) {
                        (Some(g), Some(a)) => params::compare_parameters(g, a),
                        _ => Vec::new(),
                    };
                    if !param_diffs.is_empty() {
                        tool_diffs.push(ToolDiff {
                            position: gi,
                            kind: ToolDiffKind::Changed,
                            golden_tool: Some(golden.tool_sequence[gi].clone()),
                            actual_tool: Some(actual_tools[ai].clone()),
                            parameter_diffs: param_diffs,
                        });
                    }
                }
                AlignOp::Replace { golden: gi, actual: ai } => {
                    let param_diffs = match (golden.trace.steps.get(gi), actual.steps.get(ai)) {
                        (Some(g), Some(a)) if g.tool_name == a.tool_name => {
                            params::compare_parameters(g, a)
                        }
                        _ => Vec::new(),
                    };
                    tool_diffs.push(ToolDiff {
                        position: gi,
                        kind: ToolDiffKind::Changed,
                        golden_tool: Some(golden.tool_sequence[gi].clone()),
                        actual_tool: Some(actual_tools[ai].clone()),
                        parameter_diffs: param_diffs,
                    });
                }
                AlignOp::Delete { golden: gi } => tool_diffs.push(ToolDiff {
                    position: gi,
                    kind: ToolDiffKind::Removed,
                    golden_tool: Some(golden.tool_sequence[gi].clone()),
                    actual_tool: None,
                    parameter_diffs: Vec::new(),
                }),
                AlignOp::Insert { actual: ai } => tool_diffs.push(ToolDiff {
                    position: ai,
                    kind: ToolDiffKind::Added,
                    golden_tool: None,
                    actual_tool: Some(actual_tools[ai].clone()),
                    parameter_diffs: Vec::new(),
                }),
            }
        }
        tool_diffs
    }

    /// Severity precedence, first match wins: regression, tools changed,
    /// output changed, passed. `ContractDrift` is never assigned here.
    fn classify(&self, tool_diffs: &[ToolDiff], similarity: f64, score_diff: f64) -> DiffStatus {
        if score_diff < -self.config.score_regression_threshold {
            DiffStatus::Regression
        } else if !tool_diffs.is_empty() {
            DiffStatus::ToolsChanged
        } else if similarity < self.config.output_similarity_threshold {
            DiffStatus::OutputChanged
        } else {
            DiffStatus::Passed
        }
    }
}
