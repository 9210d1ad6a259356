//! Transition logs: a Markdown table and a JSON record file.
//!
//! The table file is append-only across runs. The record file holds the full
//! history and is rewritten each run (read, concatenate, replace).

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::core::types::TransitionLogEntry;

/// Written once, when the table file does not exist yet.
pub const TABLE_HEADER: &str = "# Repository Archive/Unarchive Log\n\
\n\
This log records repositories that were archived due to inactivity or unarchived because they received recent updates.\n\
\n\
| Repository | Last Pushed | Event Date | Action |\n\
|------------|-------------|------------|--------|\n";

/// Locations of the two log files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPaths {
    pub table_path: PathBuf,
    pub records_path: PathBuf,
}

/// Append `entries` to both log files. Empty input touches nothing.
pub fn append_entries(paths: &LogPaths, entries: &[TransitionLogEntry]) -> Result<()> {
    if entries.is_empty() {
        debug!("no transitions to log");
        return Ok(());
    }
    append_table_rows(&paths.table_path, entries)?;
    append_records(&paths.records_path, entries)?;
    Ok(())
}

/// Render one table row: `| [name](url) | last pushed | event date | action |`.
pub fn render_row(entry: &TransitionLogEntry) -> String {
    format!(
        "| [{}]({}) | {} | {} | {} |",
        entry.repo_name,
        entry.repo_url,
        entry.last_pushed.format("%Y-%m-%d"),
        entry.event_date.format("%Y-%m-%d"),
        entry.action.as_str()
    )
}

/// Append rows to the Markdown table, writing the header for a new file.
///
/// Existing bytes are never read or rewritten, so foreign content is kept.
pub fn append_table_rows(path: &Path, entries: &[TransitionLogEntry]) -> Result<()> {
    ensure_parent(path)?;
    let is_new = !path.exists();

    let mut buf = String::new();
    if is_new {
        buf.push_str(TABLE_HEADER);
    }
    for entry in entries {
        buf.push_str(&render_row(entry));
        buf.push('\n');
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    file.write_all(buf.as_bytes())
        .with_context(|| format!("append {}", path.display()))?;
    info!(path = %path.display(), rows = entries.len(), created = is_new, "table log updated");
    Ok(())
}

/// Load previously recorded entries that have this crate's shape.
///
/// Records in any other shape stay in the file but are not returned here.
pub fn load_records(path: &Path) -> Vec<TransitionLogEntry> {
    load_history(path)
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect()
}

/// Load the stored history as raw JSON values.
///
/// A missing file yields an empty list. An unreadable file, or one that is
/// not a JSON array, is reported with a warning and also yields an empty list.
fn load_history(path: &Path) -> Vec<Value> {
    if !path.exists() {
        return Vec::new();
    }
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cannot read record file, starting fresh");
            return Vec::new();
        }
    };
    match serde_json::from_str(&contents) {
        Ok(history) => history,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cannot parse record file, starting fresh");
            Vec::new()
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum StoredRecord<'a> {
    Existing(Value),
    New(&'a TransitionLogEntry),
}

/// Concatenate `entries` onto the stored history and rewrite the file.
///
/// Existing items are kept as-is, whatever their shape.
pub fn append_records(path: &Path, entries: &[TransitionLogEntry]) -> Result<()> {
    let mut history: Vec<StoredRecord<'_>> = load_history(path)
        .into_iter()
        .map(StoredRecord::Existing)
        .collect();
    let previous = history.len();
    history.extend(entries.iter().map(StoredRecord::New));

    let mut buf = serde_json::to_string_pretty(&history).context("serialize records")?;
    buf.push('\n');
    write_atomic(path, &buf)?;
    info!(path = %path.display(), previous, added = entries.len(), "record log updated");
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    Ok(())
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    ensure_parent(path)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp record file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}
