//! Transition engine: applies the staleness policy to a repository list.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::core::transition::decide_action;
use crate::core::types::{RepositoryRecord, RunResult, TransitionLogEntry};
use crate::io::github::RepositoryMutator;

/// Threshold and mode for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub stale_months: u32,
    /// Record intended transitions without calling the mutation endpoint.
    pub dry_run: bool,
}

/// Decide and apply transitions for every repository, in input order.
///
/// A failed mutation skips that repository only: no entry is recorded, no
/// counter moves and the remaining repositories are still processed.
/// Mutations are awaited one at a time, so entries keep discovery order.
#[instrument(skip_all, fields(repos = repositories.len(), stale_months = policy.stale_months, dry_run = policy.dry_run))]
pub async fn process<M>(
    repositories: &[RepositoryRecord],
    policy: &Policy,
    mutator: &M,
    now: DateTime<Utc>,
) -> RunResult
where
    M: RepositoryMutator + ?Sized,
{
    let event_date = now.date_naive();
    let mut result = RunResult {
        total_processed: repositories.len(),
        ..RunResult::default()
    };

    for repo in repositories {
        info!(repo = %repo.name, "processing repository");
        let Some(action) = decide_action(repo, policy.stale_months, now) else {
            debug!(repo = %repo.name, archived = repo.is_archived, "no transition needed");
            continue;
        };

        if policy.dry_run {
            info!(repo = %repo.name, action = action.as_str(), "dry run: transition not applied");
        } else {
            match mutator.set_archived(&repo.name, action.archived_flag()).await {
                Ok(()) => info!(repo = %repo.name, action = action.as_str(), "transition applied"),
                Err(err) => {
                    warn!(repo = %repo.name, action = action.as_str(), error = %err, "transition failed, skipping");
                    continue;
                }
            }
        }
        result.record(TransitionLogEntry::new(repo, action, event_date));
    }

    result
}
