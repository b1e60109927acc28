//! Parameter-level diff of two aligned steps.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::diff::model::{ParamDiffKind, ParameterDiff};
use crate::trace::StepTrace;

/// JSON type class of a value, for type-change detection.
fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Diff the parameter maps of a golden and an actual step.
///
/// Covers the union of keys from both sides; every key lands in exactly one
/// of {equal (no entry), missing, added, type_changed, value_changed}. Keys
/// are visited in sorted order so the output is deterministic.
pub fn compare_parameters(golden: &StepTrace, actual: &StepTrace) -> Vec<ParameterDiff> {
    let keys: BTreeSet<&String> = golden.parameters.keys().chain(actual.parameters.keys()).collect();

    let mut diffs = Vec::new();
    for key in keys {
        match (golden.parameters.get(key), actual.parameters.get(key)) {
            (Some(g), None) => diffs.push(ParameterDiff {
                key: key.clone(),
                kind: ParamDiffKind::Missing,
                golden_value: Some(g.clone()),
                actual_value: None,
                similarity: None,
            }),
            (None, Some(a)) => diffs.push(ParameterDiff {
                key: key.clone(),
                kind: ParamDiffKind::Added,
                golden_value: None,
                actual_value: Some(a.clone()),
                similarity: None,
            }),
            (Some(g), Some(a)) if json_type(g) != json_type(a) => diffs.push(ParameterDiff {
                key: key.clone(),
                kind: ParamDiffKind::TypeChanged,
                golden_value: Some(g.clone()),
                actual_value: Some(a.clone()),
                similarity: None,
            }),
            (Some(g), Some(a)) if g != a => {
                let similarity = match (g, a) {
                    (Value::String(gs), Value::String(as_)) => {
                        Some(strsim::normalized_levenshtein(gs, as_))
                    }
                    _ => None,
                };
                diffs.push(ParameterDiff {
                    key: key.clone(),
                    kind: ParamDiffKind::ValueChanged,
                    golden_value: Some(g.clone()),
                    actual_value: Some(a.clone()),
                    similarity,
                });
            }
            _ => {}
        }
    }
    diffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn step_with(params: &[(&str, Value)]) -> StepTrace {
        StepTrace {
            step_id: "s".into(),
            tool_name: "tool".into(),
            parameters: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
            output: Value::Null,
            success: true,
            error: None,
            latency_ms: 0.0,
            cost: None,
            tokens: None,
        }
    }

    #[test]
    fn equal_parameters_produce_no_entries() {
        let g = step_with(&[("q", json!("berlin")), ("n", json!(3))]);
        assert!(compare_parameters(&g, &g.clone()).is_empty());
    }

    #[test]
    fn union_of_keys_is_fully_accounted_for() {
        let g = step_with(&[
            ("only_golden", json!(1)),
            ("both_equal", json!("x")),
            ("type_flip", json!("5")),
            ("value_flip", json!("berlin")),
        ]);
        let a = step_with(&[
            ("only_actual", json!(true)),
            ("both_equal", json!("x")),
            ("type_flip", json!(5)),
            ("value_flip", json!("munich")),
        ]);

        let diffs = compare_parameters(&g, &a);
        let kinds: Vec<(&str, ParamDiffKind)> =
            diffs.iter().map(|d| (d.key.as_str(), d.kind)).collect();
        // Sorted key order, one entry per divergent key, none for the equal one.
        assert_eq!(
            kinds,
            vec![
                ("only_actual", ParamDiffKind::Added),
                ("only_golden", ParamDiffKind::Missing),
                ("type_flip", ParamDiffKind::TypeChanged),
                ("value_flip", ParamDiffKind::ValueChanged),
            ]
        );
    }

    #[test]
    fn string_pairs_carry_similarity() {
        let g = step_with(&[("city", json!("berlin"))]);
        let a = step_with(&[("city", json!("berlim"))]);
        let diffs = compare_parameters(&g, &a);
        let sim = diffs[0].similarity.unwrap();
        assert!(sim > 0.8 && sim < 1.0);
    }

    #[test]
    fn non_string_value_change_has_no_similarity() {
        let g = step_with(&[("n", json!(3))]);
        let a = step_with(&[("n", json!(4))]);
        let diffs = compare_parameters(&g, &a);
        assert_eq!(diffs[0].kind, ParamDiffKind::ValueChanged);
        assert!(diffs[0].similarity.is_none());
    }

    #[test]
    fn null_vs_value_is_a_type_change() {
        let g = step_with(&[("opt", json!(null))]);
        let a = step_with(&[("opt", json!("set"))]);
        assert_eq!(compare_parameters(&g, &a)[0].kind, ParamDiffKind::TypeChanged);
    }
}
