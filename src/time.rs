//! Timestamp parsing for record recency.
//!
//! Snapshots carry their creation time as free-form strings. Everything is
//! parsed into `DateTime<Utc>` so records can be ordered by recency.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::NormalizationError;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a record timestamp.
///
/// Accepted shapes, tried in order:
/// - RFC 3339 (`2024-01-01T10:00:00Z`, `2024-01-01T10:00:00+02:00`)
/// - naive date-time with `T` or space separator, read as UTC
/// - bare date (`2024-01-01`), read as midnight UTC
///
/// # Errors
///
/// Returns `NormalizationError::MalformedInput` naming `field` if no shape matches.
///
/// # Examples
///
/// ```
/// use contactql::time::parse_timestamp;
///
/// let ts = parse_timestamp("created_at", "2024-01-01").unwrap();
/// assert_eq!(ts.to_rfc3339(), "2024-01-01T00:00:00+00:00");
/// ```
pub fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, NormalizationError> {
    let value = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }

    Err(NormalizationError::MalformedInput {
        field: field.to_string(),
        value: raw.to_string(),
        reason: "unrecognized timestamp format".to_string(),
    })
}
