//! Clock abstraction feeding the current local instant to the runner.
//!
//! The resolver never reads the clock itself. The runner asks a [`TimeSource`]
//! for `now` once per tick and passes the value down, which lets `--at` start
//! the countdown from an arbitrary moment and lets tests pin time entirely.

use chrono::{Duration as ChronoDuration, Local, NaiveDateTime};
use std::time::{Duration as StdDuration, Instant};

use crate::constants::{CLI_DATETIME_FORMATS, CLOCK_JUMP_THRESHOLD_SECS};

/// Source of local wall-clock time.
#[cfg_attr(test, mockall::automock)]
pub trait TimeSource {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    /// Block for `duration` (or simulate doing so).
    fn sleep(&self, duration: StdDuration);

    /// Whether this clock is detached from the system clock.
    fn is_simulated(&self) -> bool {
        false
    }
}

/// The system clock.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }
}

/// Starts at a chosen instant and then advances with real elapsed time.
pub struct OffsetTimeSource {
    start_time: NaiveDateTime,
    started: Instant,
}

impl OffsetTimeSource {
    pub fn new(start_time: NaiveDateTime) -> Self {
        Self {
            start_time,
            started: Instant::now(),
        }
    }
}

impl TimeSource for OffsetTimeSource {
    fn now(&self) -> NaiveDateTime {
        let elapsed = ChronoDuration::from_std(self.started.elapsed())
            .unwrap_or_else(|_| ChronoDuration::zero());
        self.start_time + elapsed
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

/// Wall-clock movement between two ticks that real elapsed time doesn't
/// account for, when it exceeds [`CLOCK_JUMP_THRESHOLD_SECS`].
///
/// `real_elapsed` comes from a monotonic `Instant`, so time spent on the
/// tick's own work (reloads, slow terminal writes) doesn't count as a jump.
/// Suspend/resume and manual clock changes do.
pub fn clock_jump(
    previous: NaiveDateTime,
    now: NaiveDateTime,
    real_elapsed: StdDuration,
) -> Option<ChronoDuration> {
    let elapsed = ChronoDuration::from_std(real_elapsed).unwrap_or_else(|_| ChronoDuration::zero());
    let jump = now - previous - elapsed;
    (jump.num_seconds().abs() > CLOCK_JUMP_THRESHOLD_SECS).then_some(jump)
}

/// Parse a `--at` value, `YYYY-MM-DD HH:MM[:SS]`, as local time.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, String> {
    let trimmed = s.trim();
    CLI_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| format!("Invalid datetime format: {trimmed:?}. Use YYYY-MM-DD HH:MM[:SS]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(4, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime("2025-03-10 04:30"), Ok(expected));
        assert_eq!(parse_datetime("2025-03-10 04:30:00"), Ok(expected));
        assert_eq!(parse_datetime("  2025-03-10 04:30 "), Ok(expected));
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("tomorrow").is_err());
        assert!(parse_datetime("2025-03-10").is_err());
        assert!(parse_datetime("2025-13-10 04:30").is_err());
    }

    #[test]
    fn test_offset_source_starts_at_given_time() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(4, 0, 0)
            .unwrap();
        let source = OffsetTimeSource::new(start);
        let now = source.now();
        assert!(now >= start);
        assert!(now - start < ChronoDuration::seconds(5));
        assert!(source.is_simulated());
    }

    #[test]
    fn test_real_source_is_not_simulated() {
        assert!(!RealTimeSource.is_simulated());
    }

    #[test]
    fn test_clock_jump_ignores_slow_ticks() {
        let previous = NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        // A ten minute reload is real elapsed time, not a jump
        let now = previous + ChronoDuration::minutes(10);
        assert_eq!(clock_jump(previous, now, StdDuration::from_secs(600)), None);
        assert_eq!(clock_jump(previous, previous, StdDuration::from_secs(1)), None);
    }

    #[test]
    fn test_clock_jump_detects_resume_and_rewind() {
        let previous = NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let resumed = previous + ChronoDuration::hours(2);
        assert_eq!(
            clock_jump(previous, resumed, StdDuration::from_secs(1)),
            Some(ChronoDuration::hours(2) - ChronoDuration::seconds(1))
        );

        let rewound = previous - ChronoDuration::minutes(30);
        let jump = clock_jump(previous, rewound, StdDuration::from_secs(1)).unwrap();
        assert!(jump < ChronoDuration::zero());

        let threshold = ChronoDuration::seconds(CLOCK_JUMP_THRESHOLD_SECS);
        assert_eq!(clock_jump(previous, previous + threshold, StdDuration::ZERO), None);
    }

    #[test]
    fn test_mock_time_source() {
        let pinned = NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let mut mock = MockTimeSource::new();
        mock.expect_now().times(2).return_const(pinned);
        assert_eq!(mock.now(), pinned);
        assert_eq!(mock.now(), pinned);
    }
}
