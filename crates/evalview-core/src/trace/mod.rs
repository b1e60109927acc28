//! Canonical representation of one finished agent run.
//!
//! Adapters produce these after calling the agent under test; everything in
//! this crate consumes them read-only. Step order is execution order and is
//! semantically significant: the diff engine aligns on it.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token usage split, when the adapter reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_tokens: Option<u64>,
}

/// Identity of the model that produced a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFingerprint {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// One tool call within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTrace {
    pub step_id: String,
    pub tool_name: String,
    /// Tool call arguments: string keys, arbitrary JSON values. A `BTreeMap`
    /// keeps key iteration sorted, which the parameter diff relies on for
    /// deterministic output.
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
    /// Adapter-defined output shape; opaque to the diff engine.
    #[serde(default)]
    pub output: Value,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub latency_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenUsage>,
}

/// One finished agent execution. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionTrace {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    #[serde(default)]
    pub steps: Vec<StepTrace>,
    #[serde(default)]
    pub final_output: String,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub total_latency_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelFingerprint>,
}

impl ExecutionTrace {
    /// Tool names in execution order.
    pub fn tool_sequence(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.tool_name.clone()).collect()
    }
}

/// The unit handed to this core by the adapter + evaluator pair: a captured
/// trace for a named test plus its evaluated score. Also the JSON document
/// the CLI reads from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub test_name: String,
    pub trace: ExecutionTrace,
    pub score: f64,
}

impl RunRecord {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read run record {}: {}", path.display(), e))?;
        let record: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid run record {}: {}", path.display(), e))?;
        Ok(record)
    }
}
