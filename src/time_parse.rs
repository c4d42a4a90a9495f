//! Time-of-day parsing and date/time combination.
//!
//! Calendar providers are inconsistent about how they write times: some use
//! `05:42`, some `5:42 AM`, some append a zone comment like `05:42 (EST)`.
//! Parsing happens in two stages:
//!
//! 1. A structured matcher for the 12-hour (`H:MM AM`) and 24-hour (`H:MM`)
//!    forms, producing a [`NaiveTime`] with zero seconds.
//! 2. A permissive free-text fallback that tries a fixed list of date-time
//!    formats on `"<date> <text>"`. When that also fails the result is
//!    [`EventTime::Invalid`], which compares as "never after now".
//!
//! All instants are local wall-clock values. Nothing here converts between
//! timezones.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use thiserror::Error;

use crate::constants::{DATE_KEY_FORMAT, FALLBACK_DATETIME_FORMATS};

static TWELVE_HOUR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2}):([0-9]{2})\s*([AaPp][Mm])$").expect("static regex"));

static TWENTY_FOUR_HOUR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2}):([0-9]{2})$").expect("static regex"));

// "5 PM": chrono can't parse an hour without minutes, so this is rewritten
// to "5:00 PM" before the structured parser is retried.
static HOUR_ONLY_MERIDIEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2})\s*([AP]M)$").expect("static regex"));

// "(EST)", "(+03)" and similar annotations some providers append.
static PAREN_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)").expect("static regex"));

/// Why the structured parser rejected a time string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("unrecognized time format: {0:?}")]
    Unrecognized(String),
    #[error("time out of range: {0:?}")]
    OutOfRange(String),
}

/// A boundary instant, or the marker for a time string nothing could parse.
///
/// `Invalid` is an ordinary value: it never counts as being after `now`, so
/// resolution skips past it instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTime {
    At(NaiveDateTime),
    Invalid,
}

impl EventTime {
    /// Strict `now < self`. Always false for `Invalid`.
    pub fn is_after(&self, now: NaiveDateTime) -> bool {
        match self {
            EventTime::At(at) => now < *at,
            EventTime::Invalid => false,
        }
    }

    pub fn instant(&self) -> Option<NaiveDateTime> {
        match self {
            EventTime::At(at) => Some(*at),
            EventTime::Invalid => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, EventTime::At(_))
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::At(at) => write!(f, "{}", at.format("%Y-%m-%d %H:%M")),
            EventTime::Invalid => write!(f, "invalid time"),
        }
    }
}

/// Parse a time-of-day string in 12-hour or 24-hour form.
///
/// Surrounding whitespace is ignored. The meridiem is case-insensitive and may
/// follow the minutes with or without a space. `12 AM` is midnight and
/// `12 PM` is noon.
///
/// # Examples
/// ```
/// use chrono::NaiveTime;
/// use iftarr::time_parse::parse_time_of_day;
/// assert_eq!(parse_time_of_day("5:48 PM"), Ok(NaiveTime::from_hms_opt(17, 48, 0).unwrap()));
/// assert_eq!(parse_time_of_day("05:42"), Ok(NaiveTime::from_hms_opt(5, 42, 0).unwrap()));
/// ```
pub fn parse_time_of_day(text: &str) -> Result<NaiveTime, TimeParseError> {
    let trimmed = text.trim();

    if let Some(caps) = TWELVE_HOUR.captures(trimmed) {
        let hour = parse_field(&caps[1], text)?;
        let minute = parse_field(&caps[2], text)?;
        if hour > 12 {
            return Err(TimeParseError::OutOfRange(text.to_string()));
        }
        let is_pm = caps[3].eq_ignore_ascii_case("pm");
        let hour = match (hour, is_pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
        return NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| TimeParseError::OutOfRange(text.to_string()));
    }

    if let Some(caps) = TWENTY_FOUR_HOUR.captures(trimmed) {
        let hour = parse_field(&caps[1], text)?;
        let minute = parse_field(&caps[2], text)?;
        return NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| TimeParseError::OutOfRange(text.to_string()));
    }

    Err(TimeParseError::Unrecognized(text.to_string()))
}

fn parse_field(digits: &str, original: &str) -> Result<u32, TimeParseError> {
    digits
        .parse()
        .map_err(|_| TimeParseError::OutOfRange(original.to_string()))
}

/// Parse a canonical `YYYY-MM-DD` calendar date.
pub fn parse_calendar_date(text: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(text, DATE_KEY_FORMAT)
}

/// Build a local instant from a date and a time of day, dropping seconds.
pub fn combine_date_and_time(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    truncate_to_minute(date.and_time(time))
}

fn truncate_to_minute(at: NaiveDateTime) -> NaiveDateTime {
    at.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(at)
}

/// Resolve a calendar record's date and time strings into an instant.
///
/// Uses the structured parser first and the free-text fallback second. An
/// unparseable date always yields [`EventTime::Invalid`].
pub fn boundary_instant(date_text: &str, time_text: &str) -> EventTime {
    let Ok(date) = parse_calendar_date(date_text) else {
        return EventTime::Invalid;
    };

    match parse_time_of_day(time_text) {
        Ok(time) => EventTime::At(combine_date_and_time(date, time)),
        Err(_) => parse_free_text(date, date_text, time_text),
    }
}

/// Best-effort interpretation of a time string the structured parser rejected.
///
/// Parenthesized comments are dropped and whitespace collapsed before the
/// cleaned text is retried against the structured parser and then against
/// [`FALLBACK_DATETIME_FORMATS`] as `"<date> <text>"`. An hour-only time
/// with a meridiem (`5 PM`) is read as the top of that hour.
fn parse_free_text(date: NaiveDate, date_text: &str, time_text: &str) -> EventTime {
    let without_comments = PAREN_COMMENT.replace_all(time_text, " ");
    let cleaned = without_comments
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase();

    if cleaned.is_empty() {
        return EventTime::Invalid;
    }

    let cleaned = HOUR_ONLY_MERIDIEM.replace(&cleaned, "${1}:00 ${2}");

    if let Ok(time) = parse_time_of_day(&cleaned) {
        return EventTime::At(combine_date_and_time(date, time));
    }

    let candidate = format!("{} {}", date_text, cleaned);
    FALLBACK_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&candidate, format).ok())
        .map(|at| EventTime::At(truncate_to_minute(at)))
        .unwrap_or(EventTime::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn at(date: &str, hour: u32, minute: u32) -> EventTime {
        EventTime::At(
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .unwrap()
                .and_hms_opt(hour, minute, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_parse_twelve_hour_basic() {
        assert_eq!(parse_time_of_day("5:42 AM"), Ok(hm(5, 42)));
        assert_eq!(parse_time_of_day("5:48 PM"), Ok(hm(17, 48)));
        assert_eq!(parse_time_of_day("11:05 pm"), Ok(hm(23, 5)));
        assert_eq!(parse_time_of_day("  07:00am"), Ok(hm(7, 0)));
    }

    #[test]
    fn test_parse_twelve_hour_noon_and_midnight() {
        assert_eq!(parse_time_of_day("12:00 AM"), Ok(hm(0, 0)));
        assert_eq!(parse_time_of_day("12:30 am"), Ok(hm(0, 30)));
        assert_eq!(parse_time_of_day("12:00 PM"), Ok(hm(12, 0)));
        assert_eq!(parse_time_of_day("12:59 Pm"), Ok(hm(12, 59)));
    }

    #[test]
    fn test_parse_twenty_four_hour() {
        assert_eq!(parse_time_of_day("05:42"), Ok(hm(5, 42)));
        assert_eq!(parse_time_of_day("5:42"), Ok(hm(5, 42)));
        assert_eq!(parse_time_of_day("17:48"), Ok(hm(17, 48)));
        assert_eq!(parse_time_of_day("0:00"), Ok(hm(0, 0)));
        assert_eq!(parse_time_of_day("23:59"), Ok(hm(23, 59)));
    }

    #[test]
    fn test_parse_rejects_unrecognized() {
        for input in ["", "5", "5:4", "05:420", "05:42:00", "05:42 (EST)", "noon", "5.42"] {
            assert!(
                matches!(parse_time_of_day(input), Err(TimeParseError::Unrecognized(_))),
                "expected {:?} to be unrecognized",
                input
            );
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        for input in ["24:00", "25:10", "12:60", "13:00 PM", "99:99"] {
            assert!(
                matches!(parse_time_of_day(input), Err(TimeParseError::OutOfRange(_))),
                "expected {:?} to be out of range",
                input
            );
        }
    }

    #[test]
    fn test_parse_ignores_non_ascii_digits() {
        // Arabic-Indic digits are not accepted by the structured parser
        assert!(parse_time_of_day("٥:٤٢").is_err());
    }

    #[test]
    fn test_twelve_and_twenty_four_hour_agree() {
        assert_eq!(
            boundary_instant("2025-03-10", "5:42 AM"),
            boundary_instant("2025-03-10", "05:42")
        );
        assert_eq!(
            boundary_instant("2025-03-10", "5:48 PM"),
            boundary_instant("2025-03-10", "17:48")
        );
    }

    #[test]
    fn test_combine_date_and_time_zeroes_seconds() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let time = NaiveTime::from_hms_opt(5, 42, 31).unwrap();
        let combined = combine_date_and_time(date, time);
        assert_eq!(combined.second(), 0);
        assert_eq!(combined.nanosecond(), 0);
        assert_eq!(combined.hour(), 5);
        assert_eq!(combined.minute(), 42);
    }

    #[test]
    fn test_fallback_strips_zone_comment() {
        assert_eq!(boundary_instant("2025-03-10", "05:12 (EST)"), at("2025-03-10", 5, 12));
        assert_eq!(boundary_instant("2025-03-10", "6:01 pm (+03)"), at("2025-03-10", 18, 1));
    }

    #[test]
    fn test_fallback_accepts_seconds() {
        assert_eq!(boundary_instant("2025-03-10", "05:42:30"), at("2025-03-10", 5, 42));
        assert_eq!(boundary_instant("2025-03-10", "5:48:59 PM"), at("2025-03-10", 17, 48));
    }

    #[test]
    fn test_fallback_compact_and_dotted_forms() {
        assert_eq!(boundary_instant("2025-03-10", "0542"), at("2025-03-10", 5, 42));
        assert_eq!(boundary_instant("2025-03-10", "17.48"), at("2025-03-10", 17, 48));
    }

    #[test]
    fn test_fallback_hour_only_meridiem() {
        assert_eq!(boundary_instant("2025-03-10", "5 PM"), at("2025-03-10", 17, 0));
        assert_eq!(boundary_instant("2025-03-10", "5pm"), at("2025-03-10", 17, 0));
        assert_eq!(boundary_instant("2025-03-10", "12 am (EST)"), at("2025-03-10", 0, 0));
        assert_eq!(boundary_instant("2025-03-10", "13 PM"), EventTime::Invalid);
        // The structured parser itself still requires minutes
        assert!(parse_time_of_day("5 PM").is_err());
    }

    #[test]
    fn test_unparseable_time_is_invalid() {
        assert_eq!(boundary_instant("2025-03-10", "after maghrib"), EventTime::Invalid);
        assert_eq!(boundary_instant("2025-03-10", ""), EventTime::Invalid);
        assert_eq!(boundary_instant("2025-03-10", "(EST)"), EventTime::Invalid);
        assert_eq!(boundary_instant("2025-03-10", "13:00 PM"), EventTime::Invalid);
    }

    #[test]
    fn test_invalid_date_is_invalid() {
        assert_eq!(boundary_instant("2025-02-30", "05:42"), EventTime::Invalid);
        assert_eq!(boundary_instant("10/03/2025", "05:42"), EventTime::Invalid);
        assert_eq!(boundary_instant("", "05:42"), EventTime::Invalid);
    }

    #[test]
    fn test_invalid_event_time_is_never_after_now() {
        let now = NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(!EventTime::Invalid.is_after(now));
        assert!(EventTime::Invalid.instant().is_none());
        assert!(!EventTime::Invalid.is_valid());
    }

    #[test]
    fn test_is_after_is_strict() {
        let event = at("2025-03-10", 5, 42);
        let instant = event.instant().unwrap();
        assert!(!event.is_after(instant));
        assert!(event.is_after(instant - chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_event_time_display() {
        assert_eq!(at("2025-03-10", 5, 42).to_string(), "2025-03-10 05:42");
        assert_eq!(EventTime::Invalid.to_string(), "invalid time");
    }
}
