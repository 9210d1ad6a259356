//! Orchestration for one complete archiver run.
//!
//! Fetch → transition engine → log sink → notifier. Only log write failures
//! surface as an error; fetch, mutation and notification failures degrade.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{error, info, instrument};

use crate::core::summary::render_summary;
use crate::core::types::RunResult;
use crate::engine::{Policy, process};
use crate::io::config::AppConfig;
use crate::io::github::{GitHubClient, RepositoryMutator, RepositorySource};
use crate::io::log_sink::{LogPaths, append_entries};
use crate::io::notifier::{Notifier, WebhookNotifier};

/// Collaborators for a run.
pub struct RunContext<'a, S: ?Sized, M: ?Sized, N: ?Sized> {
    pub source: &'a S,
    pub mutator: &'a M,
    pub notifier: &'a N,
    pub log_paths: &'a LogPaths,
}

/// Execute a run against the given collaborators.
///
/// The notification is sent even when writing the logs fails; the write
/// error is returned afterwards.
#[instrument(skip_all, fields(dry_run = policy.dry_run))]
pub async fn execute<S, M, N>(
    ctx: &RunContext<'_, S, M, N>,
    policy: &Policy,
    now: DateTime<Utc>,
) -> Result<RunResult>
where
    S: RepositorySource + ?Sized,
    M: RepositoryMutator + ?Sized,
    N: Notifier + ?Sized,
{
    let repositories = match ctx.source.list_repositories().await {
        Ok(repos) => repos,
        Err(err) => {
            error!(error = %err, "failed to fetch repositories, continuing with none");
            Vec::new()
        }
    };
    info!(count = repositories.len(), "repositories fetched");

    let result = process(&repositories, policy, ctx.mutator, now).await;

    let logged = append_entries(ctx.log_paths, &result.entries);
    if let Err(err) = &logged {
        error!("failed to write transition logs: {err:#}");
    }

    ctx.notifier
        .notify(&render_summary(&result, policy.dry_run))
        .await;

    logged.context("write transition logs")?;
    Ok(result)
}

/// Run against GitHub and the configured webhooks.
pub async fn run_with_config(cfg: &AppConfig, dry_run: bool) -> Result<RunResult> {
    let github = GitHubClient::new(cfg.api_url.clone(), &cfg.username, &cfg.token)
        .context("build GitHub client")?;
    let notifier = WebhookNotifier::new(cfg.webhooks.clone());
    let log_paths = LogPaths {
        table_path: cfg.table_path.clone(),
        records_path: cfg.records_path.clone(),
    };
    let policy = Policy {
        stale_months: cfg.stale_months,
        dry_run,
    };
    info!(username = github.username(), stale_months = cfg.stale_months, dry_run, "starting run");

    let ctx = RunContext {
        source: &github,
        mutator: &github,
        notifier: &notifier,
        log_paths: &log_paths,
    };
    execute(&ctx, &policy, Utc::now()).await
}
