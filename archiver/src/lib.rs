//! Archive stale GitHub repositories and unarchive the ones that came back.
//!
//! The crate keeps decision logic separate from side effects:
//!
//! - **[`core`]**: Pure, deterministic logic (staleness, transition decision,
//!   summary text). The clock is passed in; no I/O.
//! - **[`io`]**: Side-effecting adapters (GitHub API, log files, webhooks,
//!   configuration). Traits at the GitHub and notifier seams allow fakes in tests.
//!
//! [`engine`] applies the policy to a repository list and [`run`] wires a full
//! invocation together for the CLI.

pub mod core;
pub mod engine;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
