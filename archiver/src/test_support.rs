//! Test-only builders and scripted fakes for the GitHub seams.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Months, NaiveDate, TimeZone, Utc};

use crate::core::types::{RepositoryRecord, TransitionAction, TransitionLogEntry};
use crate::io::github::{GitHubError, RepositoryMutator, RepositorySource};
use crate::io::notifier::Notifier;

/// Build a repository snapshot with a deterministic web URL.
pub fn repo(name: &str, last_pushed_at: DateTime<Utc>, is_archived: bool) -> RepositoryRecord {
    RepositoryRecord {
        name: name.to_string(),
        last_pushed_at,
        is_archived,
        url: format!("https://github.com/octo/{name}"),
    }
}

/// Build a repository whose last push was `months` calendar months before `now`.
pub fn repo_pushed_months_ago(
    name: &str,
    months: u32,
    is_archived: bool,
    now: DateTime<Utc>,
) -> RepositoryRecord {
    let pushed = now
        .checked_sub_months(Months::new(months))
        .expect("months in range");
    repo(name, pushed, is_archived)
}

/// Log entry with fixed dates (pushed 2024-01-10, recorded 2024-06-15).
pub fn log_entry(name: &str, action: TransitionAction) -> TransitionLogEntry {
    TransitionLogEntry {
        repo_name: name.to_string(),
        repo_url: format!("https://github.com/octo/{name}"),
        last_pushed: Utc
            .with_ymd_and_hms(2024, 1, 10, 8, 0, 0)
            .single()
            .expect("valid timestamp"),
        event_date: NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date"),
        action,
    }
}

/// In-memory GitHub account.
///
/// Successful `set_archived` calls flip the stored flag, so a second listing
/// reflects the first run's transitions.
#[derive(Debug, Default)]
pub struct FakeGitHub {
    repos: Mutex<Vec<RepositoryRecord>>,
    failing: HashSet<String>,
    list_fails: bool,
    calls: Mutex<Vec<(String, bool)>>,
}

impl FakeGitHub {
    pub fn new(repos: Vec<RepositoryRecord>) -> Self {
        Self {
            repos: Mutex::new(repos),
            ..Self::default()
        }
    }

    /// Make every mutation of `name` fail.
    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Make the listing call fail.
    pub fn failing_list(mut self) -> Self {
        self.list_fails = true;
        self
    }

    /// Every mutation attempted so far, as `(name, archived)`.
    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn snapshot(&self) -> Vec<RepositoryRecord> {
        self.repos.lock().expect("repos lock").clone()
    }
}

#[async_trait]
impl RepositorySource for FakeGitHub {
    async fn list_repositories(&self) -> Result<Vec<RepositoryRecord>, GitHubError> {
        if self.list_fails {
            return Err(GitHubError::Api {
                status: 500,
                message: "scripted listing failure".to_string(),
            });
        }
        Ok(self.snapshot())
    }
}

#[async_trait]
impl RepositoryMutator for FakeGitHub {
    async fn set_archived(&self, name: &str, archived: bool) -> Result<(), GitHubError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((name.to_string(), archived));
        if self.failing.contains(name) {
            return Err(GitHubError::Api {
                status: 403,
                message: format!("scripted failure for {name}"),
            });
        }
        let mut repos = self.repos.lock().expect("repos lock");
        if let Some(repo) = repos.iter_mut().find(|repo| repo.name == name) {
            repo.is_archived = archived;
        }
        Ok(())
    }
}

/// Notifier that remembers every summary it was handed.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().expect("sent lock").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, summary: &str) {
        self.sent
            .lock()
            .expect("sent lock")
            .push(summary.to_string());
    }
}
