//! Timestamp helpers.
//!
//! SQLite stores timestamps as `YYYY-MM-DD HH:MM:SS` text in UTC.

use chrono::{DateTime, Utc};

/// Storage format used by `datetime('now')`.
pub const SQLITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Convert a stored timestamp to RFC3339 for API responses.
pub fn to_rfc3339(datetime_str: &str) -> String {
    format!("{}Z", datetime_str.replace(' ', "T"))
}

/// Format a UTC instant the way SQLite stores it.
pub fn to_sqlite(dt: &DateTime<Utc>) -> String {
    dt.format(SQLITE_FORMAT).to_string()
}
