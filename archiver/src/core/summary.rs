//! Human-readable run summary shared by the console output and notifiers.

use crate::core::types::{RunResult, TransitionAction};

/// Render the run summary text.
pub fn render_summary(result: &RunResult, dry_run: bool) -> String {
    let mut lines = vec![
        format!("Total repositories processed: {}", result.total_processed),
        format!("Repositories archived: {}", result.archived_count),
        format!("Repositories unarchived: {}", result.unarchived_count),
    ];
    if dry_run {
        lines.push("Dry run: no repositories were modified".to_string());
    } else {
        lines.push("Dry run: off".to_string());
    }
    lines.join("\n")
}

/// One line per intended transition, for dry-run console output.
pub fn render_planned(result: &RunResult) -> Vec<String> {
    result
        .entries
        .iter()
        .map(|entry| {
            let verb = match entry.action {
                TransitionAction::Archived => "archive",
                TransitionAction::Unarchived => "unarchive",
            };
            format!("[Dry Run] Would {verb} repository: {}", entry.repo_name)
        })
        .collect()
}
