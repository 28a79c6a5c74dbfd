use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{Error, Result};

/// Instant in time as exchanged with the host applications.
pub type Timestamp = DateTime<Utc>;

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parses an ISO-8601 date string from a caller.
///
/// Accepts RFC 3339 (`2024-01-01T10:00:00Z`, `2024-01-01T10:00:00+02:00`),
/// a date-time without offset (read as local time) and a bare date (read as
/// UTC midnight).
pub fn parse_timestamp(input: &str) -> Result<Timestamp> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| Error::validation(format!("Nonexistent local time '{}'", input)));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }

    Err(Error::validation(format!(
        "Invalid date '{}'. Expected an ISO-8601 string",
        input
    )))
}

/// Parses an optional date argument, naming the field in the error.
pub fn parse_optional_timestamp(field: &str, input: Option<&str>) -> Result<Option<Timestamp>> {
    match input {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_timestamp(s)
            .map(Some)
            .map_err(|e| match e {
                Error::Validation(msg) => Error::validation(format!("{}: {}", field, msg)),
                other => other,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_rfc3339_with_zulu() {
        let ts = parse_timestamp("2024-01-01T10:00:00Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-01T10:00:00+00:00");
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse_timestamp("2024-01-01T12:30:00+02:00").unwrap();
        assert_eq!(ts.hour(), 10);
        assert_eq!(ts.minute(), 30);
    }

    #[test]
    fn parses_fractional_seconds() {
        let ts = parse_timestamp("2024-01-01T10:00:00.000Z").unwrap();
        assert_eq!(ts.hour(), 10);
    }

    #[test]
    fn bare_date_is_utc_midnight() {
        let ts = parse_timestamp("2024-03-15").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-15T00:00:00+00:00");
    }

    #[test]
    fn naive_datetime_is_accepted() {
        assert!(parse_timestamp("2024-03-15T09:00:00").is_ok());
    }

    #[test]
    fn garbage_is_a_validation_error() {
        let err = parse_timestamp("next tuesday").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn optional_empty_is_none() {
        assert!(parse_optional_timestamp("dueAfter", Some("  ")).unwrap().is_none());
        assert!(parse_optional_timestamp("dueAfter", None).unwrap().is_none());
    }

    #[test]
    fn optional_error_names_the_field() {
        let err = parse_optional_timestamp("dueAfter", Some("soon")).unwrap_err();
        assert!(err.to_string().contains("dueAfter"));
    }
}
