use sha2::{Digest, Sha256};

use crate::trace::ModelFingerprint;

pub fn sha256_hex(s: &str) -> String {
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    hex::encode(h.finalize())
}

/// Whether the model identity changed between a golden and an actual run.
///
/// Only a recorded-on-both-sides mismatch counts; a side with no fingerprint
/// is treated as unknown, not as a change.
pub fn model_changed(golden: Option<&ModelFingerprint>, actual: Option<&ModelFingerprint>) -> bool {
    match (golden, actual) {
        (Some(g), Some(a)) => g != a,
        _ => false,
    }
}
