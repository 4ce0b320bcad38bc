//! Helpers for model conversion and input parsing.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Trim an optional string and drop it when blank.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` day (midnight UTC).
pub fn parse_datetime(value: &str) -> ResultEngine<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| EngineError::InvalidInput(format!("invalid date: {value}")))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn datetime_accepts_days_and_timestamps() {
        assert_eq!(
            parse_datetime("2025-03-15").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_datetime("2025-01-31T18:30:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 31, 16, 30, 0).unwrap()
        );
        assert!(parse_datetime("15/03/2025").is_err());
        assert!(parse_datetime("yesterday").is_err());
    }
}
