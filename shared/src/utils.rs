// Date helpers shared by the engine, the proxy and the chart.
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::ParseError;

/// 2000-01-01T00:00:00Z: nothing older is ever requested upstream.
pub const HISTORY_FLOOR_MS: i64 = 946_684_800_000;

/// 2000-02-01T00:00:00Z: a cached range starting before this has no more history to load.
pub const BOUNDARY_FLOOR_MS: i64 = 949_363_200_000;

pub fn history_floor() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(HISTORY_FLOOR_MS).unwrap_or_default()
}

pub fn boundary_floor() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(BOUNDARY_FLOOR_MS).unwrap_or_default()
}

/// Accepts `yyyy-mm-dd`, RFC 3339 and chrono's own `Display` form
/// (`2024-01-02 00:00:00 UTC`).
pub fn parse_date(s: &str) -> Result<DateTime<Utc>, ParseError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(dt) = DateTime::parse_from_str(&s.replace(" UTC", " +0000"), "%Y-%m-%d %H:%M:%S %z") {
        return Ok(dt.with_timezone(&Utc));
    }
    Err(ParseError::InvalidDate(s.to_string()))
}

/// Converts a boundary timestamp string into the chart's time unit (UNIX seconds).
/// Unparseable input is logged and mapped to 0 rather than failing the whole series.
pub fn chart_time(s: &str) -> i64 {
    match parse_date(s) {
        Ok(dt) => dt.timestamp(),
        Err(e) => {
            tracing::error!(time = %s, error = %e, "Invalid indicator time, substituting 0");
            0
        }
    }
}

pub fn format_day(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn floors_are_the_expected_dates() {
        assert_eq!(history_floor(), Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(boundary_floor(), Utc.with_ymd_and_hms(2000, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn chart_time_accepts_plain_dates() {
        assert_eq!(chart_time("2024-01-02"), 1_704_153_600);
    }

    #[test]
    fn chart_time_accepts_rfc3339() {
        assert_eq!(chart_time("2024-01-02T00:00:00Z"), 1_704_153_600);
        assert_eq!(chart_time("2024-01-02T01:00:00+01:00"), 1_704_153_600);
    }

    #[test]
    fn chart_time_accepts_chrono_display_form() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(chart_time(&dt.to_string()), 1_704_153_600);
    }

    #[test]
    fn chart_time_substitutes_zero_for_garbage() {
        assert_eq!(chart_time("not a date"), 0);
        assert_eq!(chart_time(""), 0);
        assert_eq!(chart_time("2024-13-45"), 0);
    }

    #[test]
    fn parse_date_reports_invalid_input() {
        assert_eq!(parse_date("01/02/2024"), Err(ParseError::InvalidDate("01/02/2024".to_string())));
        assert_eq!(parse_date(" 2023-03-01 ").unwrap().month(), 3);
    }
}
