//! Unified exit codes. Part of the public contract: CI pipelines key off
//! these to gate merges.

pub const SUCCESS: i32 = 0;
/// The check completed but its severity hit the configured gate.
pub const GATE_FAILED: i32 = 1;
/// Setup, config, or I/O failure; no comparison result was produced.
pub const INTERNAL_ERROR: i32 = 2;
