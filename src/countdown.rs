//! Countdown formatting.
//!
//! Durations are shown as `HH:MM:SS`. The hour field is not wrapped at 24, so
//! a countdown to an event three days away reads `72:00:00`.

use chrono::NaiveDateTime;

use crate::constants::COUNTDOWN_PLACEHOLDER;
use crate::time_state::NextEvent;

/// Format a millisecond duration as zero-padded `HH:MM:SS`.
///
/// Negative durations are clamped to zero and partial seconds are truncated.
///
/// # Examples
/// ```
/// use iftarr::countdown::format_countdown;
/// assert_eq!(format_countdown(3_723_000), "01:02:03");
/// assert_eq!(format_countdown(-5_000), "00:00:00");
/// ```
pub fn format_countdown(duration_ms: i64) -> String {
    let total_secs = duration_ms.max(0) / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Countdown text for an optional resolved event.
///
/// Shows [`COUNTDOWN_PLACEHOLDER`] when there is no event or its instant
/// could not be parsed.
pub fn countdown_for(event: Option<&NextEvent<'_>>, now: NaiveDateTime) -> String {
    event
        .and_then(|event| event.remaining(now))
        .map(|remaining| format_countdown(remaining.num_milliseconds()))
        .unwrap_or_else(|| COUNTDOWN_PLACEHOLDER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::DayBoundaries;
    use crate::time_parse::EventTime;
    use crate::time_state::Boundary;
    use chrono::NaiveDate;

    fn dt(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    #[test]
    fn test_format_zero_and_negative() {
        assert_eq!(format_countdown(0), "00:00:00");
        assert_eq!(format_countdown(-5000), format_countdown(0));
        assert_eq!(format_countdown(i64::MIN), "00:00:00");
    }

    #[test]
    fn test_format_mixed_fields() {
        assert_eq!(format_countdown(3_723_000), "01:02:03");
        assert_eq!(format_countdown(59_000), "00:00:59");
        assert_eq!(format_countdown(60_000), "00:01:00");
        assert_eq!(format_countdown(3_599_000), "00:59:59");
    }

    #[test]
    fn test_format_truncates_partial_seconds() {
        assert_eq!(format_countdown(999), "00:00:00");
        assert_eq!(format_countdown(1_999), "00:00:01");
        assert_eq!(format_countdown(3_723_999), "01:02:03");
    }

    #[test]
    fn test_format_hours_exceed_a_day() {
        assert_eq!(format_countdown(72 * 3_600_000), "72:00:00");
        assert_eq!(format_countdown(100 * 3_600_000 + 1_000), "100:00:01");
    }

    #[test]
    fn test_countdown_for_event() {
        let day = DayBoundaries::new("2025-03-10", "05:42", "17:48");
        let event = NextEvent {
            boundary: Boundary::Iftar,
            at: day.iftar_at(),
            day: &day,
        };
        assert_eq!(countdown_for(Some(&event), dt(16, 46, 57)), "01:01:03");
        // Stale event already in the past
        assert_eq!(countdown_for(Some(&event), dt(18, 0, 0)), "00:00:00");
    }

    #[test]
    fn test_countdown_placeholder() {
        assert_eq!(countdown_for(None, dt(12, 0, 0)), COUNTDOWN_PLACEHOLDER);

        let day = DayBoundaries::new("2025-03-10", "later", "17:48");
        let event = NextEvent {
            boundary: Boundary::Sahur,
            at: EventTime::Invalid,
            day: &day,
        };
        assert_eq!(countdown_for(Some(&event), dt(12, 0, 0)), COUNTDOWN_PLACEHOLDER);
    }
}
