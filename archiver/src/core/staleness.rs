//! Staleness classification for repository activity.

use chrono::{DateTime, Months, Utc};

/// Start of the activity window: `now` minus `stale_months` calendar months.
///
/// The day of month is clamped to the end of shorter months
/// (May 31 minus 3 months is Feb 29 in a leap year). Returns `None` when the
/// result falls outside chrono's representable range.
pub fn stale_cutoff(now: DateTime<Utc>, stale_months: u32) -> Option<DateTime<Utc>> {
    now.checked_sub_months(Months::new(stale_months))
}

/// Returns true if `last_pushed_at` strictly precedes the cutoff for `now`.
pub fn is_stale_at(last_pushed_at: DateTime<Utc>, stale_months: u32, now: DateTime<Utc>) -> bool {
    stale_cutoff(now, stale_months).is_some_and(|cutoff| last_pushed_at < cutoff)
}

/// Returns true if `last_pushed_at` is older than `stale_months` months ago.
pub fn is_stale(last_pushed_at: DateTime<Utc>, stale_months: u32) -> bool {
    is_stale_at(last_pushed_at, stale_months, Utc::now())
}
