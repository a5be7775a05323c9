//! Timestamp utilities

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp as ISO-8601 with millisecond precision (`2024-05-01T12:00:00.000Z`)
pub fn to_iso8601(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Milliseconds since the Unix epoch, used for pin names
pub fn unix_millis(timestamp: DateTime<Utc>) -> i64 {
    timestamp.timestamp_millis()
}
