use chrono::{DateTime, Datelike, NaiveDateTime, Utc};

use crate::error::{GpxError, Result};

/// Accepted timestamp layouts, tried in order. The first one is used for output.
pub const TIME_LAYOUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%SZ",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a GPX timestamp. Fractional seconds are dropped.
///
/// On failure the error carries a fallback of "now"; callers must treat the
/// error as authoritative.
pub fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    let without_fraction = match value.split_once('.') {
        Some((head, _)) => head,
        None => value,
    };
    let trimmed = without_fraction.trim();

    TIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(trimmed, layout).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| GpxError::InvalidTime {
            value: trimmed.to_string(),
            fallback: Utc::now(),
        })
}

/// Format a timestamp with the canonical layout. Times in year 1 or
/// earlier are treated as unset and produce `None`.
pub fn format_time(time: &DateTime<Utc>) -> Option<String> {
    if time.year() <= 1 {
        return None;
    }
    Some(time.format(TIME_LAYOUTS[0]).to_string())
}
