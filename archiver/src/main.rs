//! Archive inactive GitHub repositories and unarchive revived ones.
//!
//! Reads credentials from `MY_GITHUB_USERNAME` / `MY_GITHUB_TOKEN`, lists the
//! account's repositories, applies the staleness policy and appends every
//! transition to `ARCHIVED_REPOS.md` and `archive_log.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use archiver::core::summary::{render_planned, render_summary};
use archiver::core::types::RunResult;
use archiver::exit_codes;
use archiver::io::config::{AppConfig, CliOverrides};
use archiver::logging;
use archiver::run::run_with_config;
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "archiver",
    version,
    about = "Archive stale GitHub repositories and unarchive revived ones"
)]
struct Cli {
    /// Log intended transitions without changing any repository.
    #[arg(long)]
    dry_run: bool,

    /// Print per-repository progress.
    #[arg(short, long)]
    verbose: bool,

    /// Months without a push before a repository counts as stale.
    #[arg(long, value_name = "MONTHS")]
    stale_months: Option<u32>,

    /// Optional TOML settings file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(cli).await {
        eprintln!("error: {:#}", err);
        std::process::exit(exit_codes::FAILURE);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let overrides = CliOverrides {
        stale_months: cli.stale_months,
    };
    let cfg = AppConfig::from_env(cli.config.as_deref(), &overrides)
        .context("load configuration")?;
    let result = run_with_config(&cfg, cli.dry_run).await?;
    print_report(&result, cli.dry_run);
    Ok(())
}

fn print_report(result: &RunResult, dry_run: bool) {
    if dry_run {
        for line in render_planned(result) {
            println!("{line}");
        }
    }
    if !result.has_transitions() {
        println!("No archive/unarchive actions were performed.");
    }
    println!("----------------------------------------");
    println!("{}", render_summary(result, dry_run));
    println!("Repository monitoring process completed.");
}
