use chrono::{NaiveDate, NaiveDateTime};

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses an ISO `YYYY-MM-DD` date, ignoring surrounding whitespace.
pub fn parse_date(src: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(src.trim(), "%Y-%m-%d").ok()
}

/// Parses an ISO date-time with either a space or `T` separator. A bare date
/// parses as midnight.
pub fn parse_date_time(src: &str) -> Option<NaiveDateTime> {
    let src = src.trim();

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(src, fmt).ok())
        .or_else(|| parse_date(src).and_then(|date| date.and_hms_opt(0, 0, 0)))
}
