//! Shared deterministic types for the archiver core.
//!
//! These types are the contract between the repository source, the transition
//! engine and the log sink. They carry no I/O and serialize to a stable format.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of one repository, fetched once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRecord {
    pub name: String,
    pub last_pushed_at: DateTime<Utc>,
    pub is_archived: bool,
    /// Web URL of the repository (not the API URL).
    pub url: String,
}

/// Archival state change applied to a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionAction {
    Archived,
    Unarchived,
}

impl TransitionAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TransitionAction::Archived => "archived",
            TransitionAction::Unarchived => "unarchived",
        }
    }

    /// Value of the remote `archived` flag after this transition.
    pub fn archived_flag(self) -> bool {
        matches!(self, TransitionAction::Archived)
    }
}

/// One recorded transition. Appended to the logs, never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionLogEntry {
    pub repo_name: String,
    pub repo_url: String,
    pub last_pushed: DateTime<Utc>,
    pub event_date: NaiveDate,
    pub action: TransitionAction,
}

impl TransitionLogEntry {
    pub fn new(repo: &RepositoryRecord, action: TransitionAction, event_date: NaiveDate) -> Self {
        Self {
            repo_name: repo.name.clone(),
            repo_url: repo.url.clone(),
            last_pushed: repo.last_pushed_at,
            event_date,
            action,
        }
    }
}

/// Outcome of a single run over the full repository list.
///
/// `entries` are in repository discovery order and
/// `entries.len() == archived_count + unarchived_count`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    pub total_processed: usize,
    pub archived_count: usize,
    pub unarchived_count: usize,
    pub entries: Vec<TransitionLogEntry>,
}

impl RunResult {
    /// Record a transition and bump the matching counter.
    pub fn record(&mut self, entry: TransitionLogEntry) {
        match entry.action {
            TransitionAction::Archived => self.archived_count += 1,
            TransitionAction::Unarchived => self.unarchived_count += 1,
        }
        self.entries.push(entry);
    }

    pub fn has_transitions(&self) -> bool {
        !self.entries.is_empty()
    }
}
