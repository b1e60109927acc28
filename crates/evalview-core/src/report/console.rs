//! Console rendering of trace diffs. Deterministic line formatting so the
//! output is unit-testable and stable across runs.

use crate::diff::model::{DiffStatus, ToolDiffKind, TraceDiff};

fn status_glyph(status: DiffStatus) -> &'static str {
    match status {
        DiffStatus::Passed => "✓",
        DiffStatus::OutputChanged | DiffStatus::ToolsChanged => "~",
        DiffStatus::Regression | DiffStatus::ContractDrift => "✗",
    }
}

/// Render a diff as display lines.
pub fn render_diff(diff: &TraceDiff) -> String {
    let mut lines = Vec::new();

    let variant = diff
        .matched_variant
        .as_deref()
        .map(|v| format!(" [{}]", v))
        .unwrap_or_default();
    lines.push(format!(
        "{} {}: {}{}",
        status_glyph(diff.status),
        diff.test_name,
        diff.status,
        variant
    ));
    lines.push(format!(
        "  score {:+.1}  latency {:+.0}ms  output similarity {:.3}",
        diff.score_diff,
        diff.latency_diff,
        diff.output_similarity()
    ));
    if diff.model_changed {
        lines.push("  model identity changed since bless".to_string());
    }

    for td in &diff.tool_diffs {
        let line = match td.kind {
            ToolDiffKind::Added => format!(
                "  + added '{}' at {}",
                td.actual_tool.as_deref().unwrap_or("?"),
                td.position
            ),
            ToolDiffKind::Removed => format!(
                "  - removed '{}' at {}",
                td.golden_tool.as_deref().unwrap_or("?"),
                td.position
            ),
            ToolDiffKind::Changed => {
                let golden = td.golden_tool.as_deref().unwrap_or("?");
                let actual = td.actual_tool.as_deref().unwrap_or("?");
                if golden == actual {
                    format!("  ~ '{}' parameters changed at {}", golden, td.position)
                } else {
                    format!("  ~ '{}' -> '{}' at {}", golden, actual, td.position)
                }
            }
        };
        lines.push(line);

        for pd in &td.parameter_diffs {
            lines.push(format!("      {}: {}", pd.key, param_summary(pd)));
        }
    }

    lines.join("\n")
}

fn param_summary(pd: &crate::diff::model::ParameterDiff) -> String {
    use crate::diff::model::ParamDiffKind;
    match pd.kind {
        ParamDiffKind::Missing => "missing in actual".to_string(),
        ParamDiffKind::Added => "added in actual".to_string(),
        ParamDiffKind::TypeChanged => "type changed".to_string(),
        ParamDiffKind::ValueChanged => match pd.similarity {
            Some(sim) => format!("value changed (similarity {:.2})", sim),
            None => "value changed".to_string(),
        },
    }
}

pub fn print_diff(diff: &TraceDiff) {
    println!("{}", render_diff(diff));
}
