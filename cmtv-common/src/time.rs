//! Timestamp utilities
//!
//! Playlist files carry timestamps as ISO-8601 strings in the
//! `2025-10-16T03:00:00.000Z` shape. Parsing is lenient so that files
//! written by older tooling (date-only values, offsets) still age correctly.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp the way playlist files store it (millisecond precision, `Z` suffix)
pub fn to_iso_string(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp
///
/// Accepts RFC 3339 (any offset, any fractional precision) and bare
/// `YYYY-MM-DD` dates, which are read as midnight UTC. Returns `None` for
/// anything else.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
