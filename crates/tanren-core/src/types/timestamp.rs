//! ISO-8601 timestamps as found in artifact files.
//!
//! Timestamps are always written as RFC 3339 in UTC. Reading also accepts the
//! offset-less form (`2024-05-01T12:00:00.123456`), which is taken as UTC.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Parses an RFC 3339 timestamp, or a naive ISO-8601 one read as UTC.
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// `deserialize_with` helper for `DateTime<Utc>` fields.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid ISO-8601 timestamp {raw:?}")))
}
