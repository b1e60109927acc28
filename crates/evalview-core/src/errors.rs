use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the golden store.
///
/// Missing goldens are not errors; lookups return `None` and callers are
/// expected to branch on absence (e.g. "bless a golden first").
#[derive(Debug, Error)]
pub enum StoreError {
    /// Saving a new variant would exceed the per-test variant cap.
    /// Overwriting an existing variant never triggers this.
    #[error("'{test_name}' already has {count} golden variants (max {max}); delete one before blessing another")]
    VariantLimitExceeded {
        test_name: String,
        count: usize,
        max: usize,
    },

    #[error("failed to read golden file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write golden file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid golden document {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize golden for '{test_name}': {source}")]
    Serialize {
        test_name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Caller contract violations in the diff engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiffError {
    #[error("cannot compare against an empty baseline list; bless a golden first")]
    EmptyBaselines,
}
