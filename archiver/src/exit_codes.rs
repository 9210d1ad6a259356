//! Stable exit codes for the archiver CLI.

/// Run completed (individual repository failures do not change this).
pub const OK: i32 = 0;
/// Configuration was invalid, the logs could not be written, or the run failed.
pub const FAILURE: i32 = 1;
