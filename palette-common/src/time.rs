//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert seconds to duration
pub fn secs_to_duration(secs: u64) -> std::time::Duration {
    std::time::Duration::from_secs(secs)
}

/// Convert a unix timestamp (seconds, as text) to a day-resolution
/// SQL date string `YYYY-MM-DD 00:00:00` (UTC)
///
/// Returns `None` if the text is not a number or is out of range.
pub fn unix_to_sql_date(unix_secs: &str) -> Option<String> {
    let secs: i64 = unix_secs.trim().parse().ok()?;
    let dt = DateTime::<Utc>::from_timestamp(secs, 0)?;
    Some(dt.format("%Y-%m-%d 00:00:00").to_string())
}
