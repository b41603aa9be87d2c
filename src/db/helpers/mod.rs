use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};

/// Parse a stored RFC 3339 timestamp, keeping the offset it was recorded in.
pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).with_context(|| format!("failed to parse {field} '{value}'"))
}

pub fn to_usize(value: i64, field: &str) -> Result<usize> {
    usize::try_from(value).with_context(|| format!("{field} contains invalid count {value}"))
}
