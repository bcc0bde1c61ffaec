use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Display value when a record carries no usable date.
pub const UNKNOWN_DATE: &str = "unknown date";
/// Display value when a record date cannot be parsed.
pub const INVALID_DATE: &str = "invalid date";

static DATE_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid pattern"));
static DATE_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T").expect("valid pattern"));
static YEAR_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("valid pattern"));

/// Parses an occurrence event date into a calendar date.
///
/// Handles plain dates, timestamps (date part only) and bare years, which
/// expand to January 1st. Anything else is unparseable.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if DATE_ONLY.is_match(raw) {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    } else if DATE_TIME.is_match(raw) {
        NaiveDate::parse_from_str(&raw[..10], "%Y-%m-%d").ok()
    } else if YEAR_ONLY.is_match(raw) {
        let year = raw.parse::<i32>().ok()?;
        NaiveDate::from_ymd_opt(year, 1, 1)
    } else {
        None
    }
}

/// Normalizes a raw record date into its display form.
pub fn normalize_record_date(raw: Option<&str>) -> String {
    match raw {
        None => UNKNOWN_DATE.to_string(),
        Some(value) if value.trim().is_empty() => UNKNOWN_DATE.to_string(),
        Some(value) => match parse_event_date(value) {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => INVALID_DATE.to_string(),
        },
    }
}
