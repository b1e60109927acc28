//! Core library for EvalView: regression testing for multi-step AI agents.
//!
//! The pipeline is: an adapter captures an [`trace::ExecutionTrace`] for a
//! named test, the evaluator attaches a score, and the pair arrives here as a
//! [`trace::RunRecord`]. The [`golden::GoldenStore`] holds blessed baseline
//! traces (up to five variants per test), the [`diff::DiffEngine`] aligns an
//! actual run against those baselines and classifies the divergence, and the
//! [`drift::DriftTracker`] appends each outcome to a history log and watches
//! for gradual output decay that no single check would flag.
//!
//! All comparison code is pure and synchronous; only the store and tracker
//! touch the filesystem. The `.evalview/` directory is assumed to be owned by
//! a single test-runner process for the duration of a run.

pub mod config;
pub mod diff;
pub mod drift;
pub mod errors;
pub mod fingerprint;
pub mod golden;
pub mod report;
pub mod trace;

pub use config::{DiffConfig, EvalViewConfig};
pub use diff::model::{
    DiffStatus, OutputDiff, ParamDiffKind, ParameterDiff, ToolDiff, ToolDiffKind, TraceDiff,
};
pub use diff::DiffEngine;
pub use drift::{DriftEntry, DriftTracker};
pub use errors::{DiffError, StoreError};
pub use golden::{GoldenMetadata, GoldenStore, GoldenTrace};
pub use trace::{ExecutionTrace, ModelFingerprint, RunRecord, StepTrace, TokenUsage};
