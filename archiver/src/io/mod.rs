//! I/O adapters for archiver runs.

pub mod config;
pub mod github;
pub mod log_sink;
pub mod notifier;
