//! Diagnostic tracing for archiver runs.
//!
//! # Separation of Concerns
//!
//! - **Tracing (this module)**: diagnostics and per-repository progress on
//!   stderr, filtered by `RUST_LOG`.
//! - **Transition logs (`io/log_sink`)**: product artifacts
//!   (`ARCHIVED_REPOS.md`, `archive_log.json`). Always written, unaffected by
//!   `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used with `--verbose` when `RUST_LOG` is unset.
pub const VERBOSE_FILTER: &str = "archiver=info";
/// Filter used without `--verbose` when `RUST_LOG` is unset.
pub const QUIET_FILTER: &str = "warn";

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `--verbose` enables per-repository
/// progress lines and the default only shows warnings and errors.
///
/// # Example
/// ```bash
/// RUST_LOG=archiver=debug archiver --dry-run
/// ```
pub fn init(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { QUIET_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
