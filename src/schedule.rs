//! Due-date arithmetic for scheduled transfers.
//!
//! Intervals are fixed durations in seconds; there is no calendar-aware
//! month handling. Unknown interval values still compute, they only lose
//! their friendly label.

use chrono::{ DateTime, Duration, Utc };

use crate::enums::TransferInterval;
use crate::models::{ LastExecution, ScheduledTransfer };

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Earliest time the transfer may execute again.
pub fn next_execution_time(transfer: &ScheduledTransfer) -> DateTime<Utc> {
    let base = match transfer.last_execution {
        LastExecution::At(ts) => ts,
        LastExecution::Never => transfer.created_at,
    };

    Duration::try_seconds(transfer.interval_seconds)
        .and_then(|interval| base.checked_add_signed(interval))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Inactive transfers are never due.
pub fn is_due(transfer: &ScheduledTransfer, now: DateTime<Utc>) -> bool {
    transfer.is_active && now >= next_execution_time(transfer)
}

/// Coarse countdown label: "Due now", "In N days", "In N hours" or "Soon".
pub fn humanize_remaining(transfer: &ScheduledTransfer, now: DateTime<Utc>) -> String {
    if !transfer.is_active {
        return "Cancelled".to_string();
    }

    if is_due(transfer, now) {
        return "Due now".to_string();
    }

    let remaining_ms = (next_execution_time(transfer) - now).num_milliseconds();
    let hours = remaining_ms / MILLIS_PER_HOUR;
    let days = hours / 24;

    if days > 0 {
        return format!("In {} day{}", days, if days > 1 { "s" } else { "" });
    }
    if hours > 0 {
        return format!("In {} hour{}", hours, if hours > 1 { "s" } else { "" });
    }
    "Soon".to_string()
}

pub fn interval_label(seconds: i64) -> String {
    match TransferInterval::from_seconds(seconds) {
        Some(interval) => interval.label().to_string(),
        None => format!("{}s", seconds),
    }
}
