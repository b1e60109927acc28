use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fingerprint::sha256_hex;
use crate::trace::{ExecutionTrace, ModelFingerprint, RunRecord};

pub const GOLDEN_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenMetadata {
    pub test_name: String,
    pub blessed_at: DateTime<Utc>,
    pub blessed_by: String,
    /// Score the evaluator assigned to the run at bless time.
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelFingerprint>,
    pub format_version: u32,
}

/// A blessed baseline: the full trace it snapshots plus two derived fields,
/// cached at bless time so comparisons can skip recomputation — the
/// tool-name sequence (alignment input) and a hash of the final output
/// (equality pre-check).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenTrace {
    pub metadata: GoldenMetadata,
    pub trace: ExecutionTrace,
    pub tool_sequence: Vec<String>,
    pub output_hash: String,
}

impl GoldenTrace {
    /// Build a golden from an evaluated run judged correct.
    pub fn from_run(record: &RunRecord, blessed_by: &str, notes: Option<String>) -> Self {
        Self {
            metadata: GoldenMetadata {
                test_name: record.test_name.clone(),
                blessed_at: Utc::now(),
                blessed_by: blessed_by.to_string(),
                score: record.score,
                notes,
                model: record.trace.model.clone(),
                format_version: GOLDEN_FORMAT_VERSION,
            },
            trace: record.trace.clone(),
            tool_sequence: record.trace.tool_sequence(),
            output_hash: sha256_hex(&record.trace.final_output),
        }
    }
}
