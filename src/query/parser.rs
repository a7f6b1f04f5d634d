//! Range bound parser
//!
//! Accepts ISO-8601-like text and returns a naive date-time:
//!
//! ```text
//! 2024-05-01
//! 2024-05-01T10:30            (also with a space instead of T)
//! 2024-05-01T10:30:15[.123456]
//! any of the above + "Z" or "+02:00" / "-0500"
//! ```
//!
//! A UTC designator or offset is dropped and the wall-clock value kept. Stored
//! timestamps are naive local time, so a bound with a non-zero offset from the
//! local clock lines up with the wrong readings. That is the established
//! behaviour and is kept as is.

use crate::query::error::{QueryError, QueryResult};
use crate::storage::TimeRange;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
];

/// Parse one range bound into the naive time domain
pub fn parse_bound(input: &str) -> QueryResult<NaiveDateTime> {
    let text = input.trim();

    // "Z" carries no offset to discard
    let text = text
        .strip_suffix('Z')
        .or_else(|| text.strip_suffix('z'))
        .unwrap_or(text);

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(dt);
        }
    }

    for fmt in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Ok(dt.naive_local());
        }
    }

    match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(date) => date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| QueryError::InvalidArgument(format!("Invalid date: '{}'", input))),
        Err(e) => Err(QueryError::InvalidArgument(format!(
            "Invalid isoformat string '{}': {}",
            input, e
        ))),
    }
}

/// Validate both bounds of a range request
pub fn parse_range(start: Option<&str>, end: Option<&str>) -> QueryResult<TimeRange> {
    let (start, end) = match (non_blank(start), non_blank(end)) {
        (Some(s), Some(e)) => (s, e),
        _ => {
            return Err(QueryError::InvalidArgument(
                "Both 'start' and 'end' parameters are required".to_string(),
            ))
        }
    };

    Ok(TimeRange::new(parse_bound(start)?, parse_bound(end)?))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_naive_forms() {
        assert_eq!(parse_bound("2024-05-01T10:30:15").unwrap(), dt(10, 30, 15));
        assert_eq!(parse_bound("2024-05-01 10:30:15").unwrap(), dt(10, 30, 15));
        assert_eq!(parse_bound("2024-05-01T10:30").unwrap(), dt(10, 30, 0));
        assert_eq!(parse_bound("2024-05-01").unwrap(), dt(0, 0, 0));
        assert_eq!(
            parse_bound("2024-05-01T10:30:15.250000").unwrap(),
            dt(10, 30, 15) + chrono::Duration::milliseconds(250)
        );
    }

    #[test]
    fn test_offsets_are_discarded() {
        assert_eq!(parse_bound("2024-05-01T10:30:15Z").unwrap(), dt(10, 30, 15));
        assert_eq!(parse_bound("2024-05-01T10:30Z").unwrap(), dt(10, 30, 0));
        assert_eq!(parse_bound("2024-05-01T10:30:15+02:00").unwrap(), dt(10, 30, 15));
        assert_eq!(parse_bound("2024-05-01T10:30:15.5-0500").unwrap(),
            dt(10, 30, 15) + chrono::Duration::milliseconds(500));
    }

    #[test]
    fn test_unparseable_bound() {
        let err = parse_bound("last tuesday").unwrap_err();
        match err {
            QueryError::InvalidArgument(msg) => assert!(msg.contains("last tuesday")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(parse_bound("2024-13-01").is_err());
    }

    #[test]
    fn test_missing_bounds() {
        assert!(matches!(
            parse_range(None, Some("2024-05-01")),
            Err(QueryError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse_range(Some("2024-05-01"), Some("  ")),
            Err(QueryError::InvalidArgument(_))
        ));

        let range = parse_range(Some("2024-05-01T00:00"), Some("2024-05-01T23:59")).unwrap();
        assert_eq!(range.start, dt(0, 0, 0));
        assert_eq!(range.end, dt(23, 59, 0));
    }
}
