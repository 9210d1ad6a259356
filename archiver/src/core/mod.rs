//! Deterministic, pure logic for the archiver.
//!
//! Core modules must be free of I/O side effects. The clock is always passed
//! in, so every decision is reproducible in tests.

pub mod staleness;
pub mod summary;
pub mod transition;
pub mod types;
