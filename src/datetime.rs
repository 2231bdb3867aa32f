// src/datetime.rs
//
// Flexible parsing for client-supplied date fields. Three literal shapes are
// accepted, tried most-specific first; a bare date means midnight of that day.
// All timestamps are naive local time, no timezone handling.
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::AppError;

const DATE_TIME_WITH_MILLIS: &str = "%Y-%m-%dT%H:%M:%S%.3f";
const DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_ONLY: &str = "%Y-%m-%d";

/// Parses a date string in one of the accepted shapes. Empty or
/// whitespace-only input is treated as "no date".
pub fn parse_flexible(input: &str) -> Result<Option<NaiveDateTime>, AppError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let parsed = if trimmed.contains('T') && trimmed.contains('.') {
        NaiveDateTime::parse_from_str(trimmed, DATE_TIME_WITH_MILLIS)
    } else if trimmed.contains('T') {
        NaiveDateTime::parse_from_str(trimmed, DATE_TIME)
    } else {
        NaiveDate::parse_from_str(trimmed, DATE_ONLY).map(|d| d.and_time(NaiveTime::MIN))
    };

    match parsed {
        Ok(dt) => Ok(Some(dt)),
        Err(_) => Err(AppError::date_format(format!(
            "Unable to parse date: {trimmed}. Expected formats: yyyy-MM-dd, \
             yyyy-MM-dd'T'HH:mm:ss or yyyy-MM-dd'T'HH:mm:ss.SSS"
        ))),
    }
}

/// Convenience for optional DTO fields.
pub fn parse_optional(input: Option<&str>) -> Result<Option<NaiveDateTime>, AppError> {
    match input {
        Some(s) => parse_flexible(s),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn parses_date_time_with_millis() {
        let parsed = parse_flexible("2026-03-15T14:30:00.250").unwrap().unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
        assert_eq!(parsed.time().nanosecond(), 250_000_000);
    }

    #[test]
    fn parses_date_time_without_millis() {
        assert_eq!(
            parse_flexible("2026-03-15T14:30:05").unwrap(),
            Some(dt(2026, 3, 15, 14, 30, 5))
        );
    }

    #[test]
    fn date_only_means_midnight() {
        assert_eq!(
            parse_flexible("2026-03-15").unwrap(),
            Some(dt(2026, 3, 15, 0, 0, 0))
        );
    }

    #[test]
    fn input_is_trimmed() {
        assert_eq!(
            parse_flexible("  2026-03-15  ").unwrap(),
            Some(dt(2026, 3, 15, 0, 0, 0))
        );
    }

    #[test]
    fn empty_and_blank_mean_no_date() {
        assert_eq!(parse_flexible("").unwrap(), None);
        assert_eq!(parse_flexible("   ").unwrap(), None);
        assert_eq!(parse_optional(None).unwrap(), None);
    }

    #[test]
    fn round_trips_through_the_accepted_shapes() {
        for input in [
            "2026-01-02T03:04:05.678",
            "2026-01-02T03:04:05",
            "2026-01-02",
        ] {
            let parsed = parse_flexible(input).unwrap().unwrap();
            let reparsed = parse_flexible(&parsed.format("%Y-%m-%dT%H:%M:%S%.3f").to_string())
                .unwrap()
                .unwrap();
            assert_eq!(parsed, reparsed, "round-trip failed for {input}");
        }
    }

    #[test]
    fn rejects_everything_else() {
        for input in [
            "15/03/2026",
            "March 15, 2026",
            "2026-03-15 14:30:00",
            "2026-03-15T14:30",
            "not-a-date",
        ] {
            let err = parse_flexible(input).unwrap_err();
            match err {
                AppError::DateFormat(msg) => {
                    assert!(msg.contains(input.trim()), "message should name the input");
                    assert!(msg.contains("yyyy-MM-dd"), "message should list patterns");
                }
                other => panic!("expected DateFormat error, got {other:?}"),
            }
        }
    }
}
