//! Deterministic per-repository transition decision.

use chrono::{DateTime, Utc};

use crate::core::staleness::is_stale_at;
use crate::core::types::{RepositoryRecord, TransitionAction};

/// Decide which transition (if any) a repository needs.
///
/// - Active, stale repositories are archived.
/// - Archived repositories with a push inside the window are unarchived.
/// - Everything else is left alone.
///
/// The archived flag is read once, so a repository can never be both archived
/// and unarchived in the same run.
pub fn decide_action(
    repo: &RepositoryRecord,
    stale_months: u32,
    now: DateTime<Utc>,
) -> Option<TransitionAction> {
    let stale = is_stale_at(repo.last_pushed_at, stale_months, now);
    match (repo.is_archived, stale) {
        (false, true) => Some(TransitionAction::Archived),
        (true, false) => Some(TransitionAction::Unarchived),
        _ => None,
    }
}
