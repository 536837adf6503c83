use anyhow::{Context, Result};
use chrono::NaiveDateTime;

/// Timestamp format used by the service, both in requests and in `Samples`.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Renders `t` in [`DATE_FORMAT`], as sent in `StartTime`/`EndTime`.
pub fn format_time(t: &NaiveDateTime) -> String {
    t.format(DATE_FORMAT).to_string()
}

/// Parses a sample timestamp written in [`DATE_FORMAT`].
pub fn parse_time(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), DATE_FORMAT)
        .with_context(|| format!("timestamp '{}' does not match {}", s, DATE_FORMAT))
}
