use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_english::{parse_date_string, Dialect};
use chrono_tz::Tz;
use lifeboard_core::timezone::{local_date, start_of_day};

/// Parses a due date. Accepts RFC 3339 timestamps, plain ISO dates (local
/// midnight in `tz`) and natural language such as "tomorrow" or "next friday".
pub fn parse_due_date(input: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(instant.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(start_of_day(date, tz));
    }

    let now = Utc::now().with_timezone(&tz);
    parse_date_string(input, now, Dialect::Us)
        .map(|local| local.with_timezone(&Utc))
        .map_err(|e| anyhow!("Failed to parse date '{}': {}", input, e))
}

/// Parses a calendar day, as seen in `tz`.
pub fn parse_day(input: &str, tz: Tz) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d") {
        return Ok(date);
    }
    parse_due_date(input, tz).map(|instant| local_date(instant, tz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    #[test]
    fn test_iso_date_is_local_midnight() {
        let due = parse_due_date("2024-01-10", chrono_tz::America::New_York).unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 1, 10, 5, 0, 0).unwrap());
    }

    #[test]
    fn test_rfc3339_is_kept() {
        let due = parse_due_date("2024-01-10T09:30:00+01:00", Tz::UTC).unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 1, 10, 8, 30, 0).unwrap());
    }

    #[rstest]
    #[case("tomorrow", 1)]
    #[case("yesterday", -1)]
    fn test_relative_days(#[case] input: &str, #[case] offset: i64) {
        let today = local_date(Utc::now(), Tz::UTC);
        assert_eq!(parse_day(input, Tz::UTC).unwrap(), today + Duration::days(offset));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_due_date("not a date at all", Tz::UTC).is_err());
        assert!(parse_day("banana", Tz::UTC).is_err());
    }
}
