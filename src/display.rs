//! Terminal presentation of the next event, the countdown and the calendar.
//!
//! Rendering functions return strings so they can be tested without a
//! terminal. [`CountdownLine`] owns the live, redrawn-in-place output.

use chrono::NaiveDateTime;
use crossterm::{
    cursor::MoveToColumn,
    execute,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::io::{self, IsTerminal, Write};

use crate::constants::NO_UPCOMING_EVENT_MESSAGE;
use crate::countdown::countdown_for;
use crate::schedule::Schedule;
use crate::time_state::{NextEvent, date_key};

/// How calendar dates are shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    Us,  // MM/DD/YYYY
    Iso, // YYYY-MM-DD, as stored
}

impl DateStyle {
    /// Map a config value to a style. Unknown values fall back to `Us`.
    pub fn from_config(value: &str) -> Self {
        match value {
            "iso" => DateStyle::Iso,
            _ => DateStyle::Us,
        }
    }
}

/// Rewrite `YYYY-MM-DD` as `MM/DD/YYYY`.
///
/// Anything that doesn't split into three dash-separated parts is returned
/// unchanged.
pub fn format_us_date(date: &str) -> String {
    let parts: Vec<&str> = date.split('-').collect();
    match parts.as_slice() {
        [year, month, day] => format!("{}/{}/{}", month, day, year),
        _ => date.to_string(),
    }
}

pub fn format_date(date: &str, style: DateStyle) -> String {
    match style {
        DateStyle::Us => format_us_date(date),
        DateStyle::Iso => date.to_string(),
    }
}

/// One-line description of the next event, e.g. `Iftar • 03/10/2025 • 5:48 PM`.
pub fn render_next_event(event: Option<&NextEvent<'_>>, style: DateStyle) -> String {
    match event {
        Some(event) => format!(
            "{} • {} • {}",
            event.boundary,
            format_date(&event.day.date, style),
            event.time_text()
        ),
        None => NO_UPCOMING_EVENT_MESSAGE.to_string(),
    }
}

/// The live countdown line.
pub fn render_countdown(event: Option<&NextEvent<'_>>, now: NaiveDateTime) -> String {
    match event {
        Some(event) => format!("{} in {}", event.boundary, countdown_for(Some(event), now)),
        None => countdown_for(None, now),
    }
}

/// One line per calendar day, marking the entry for today's date.
pub fn render_calendar(schedule: &Schedule, now: NaiveDateTime, style: DateStyle) -> Vec<String> {
    let today = date_key(now);
    schedule
        .iter()
        .map(|day| {
            let marker = if day.date == today { "  ← Today" } else { "" };
            format!(
                "{:<10}  Sahur {:>8}  Iftar {:>8}{}",
                format_date(&day.date, style),
                day.sahur,
                day.iftar,
                marker
            )
        })
        .collect()
}

/// Countdown output that redraws a single terminal line in place.
///
/// When stdout is not a terminal each update is printed on its own line
/// instead, so logs stay readable.
pub struct CountdownLine {
    interactive: bool,
    dirty: bool,
}

impl CountdownLine {
    pub fn new() -> Self {
        Self {
            interactive: io::stdout().is_terminal(),
            dirty: false,
        }
    }

    pub fn update(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        if self.interactive {
            execute!(
                stdout,
                MoveToColumn(0),
                Clear(ClearType::CurrentLine),
                Print(format!("┗ {}", text))
            )?;
            self.dirty = true;
        } else {
            writeln!(stdout, "┣ {}", text)?;
        }
        stdout.flush()
    }

    /// End the in-place line so regular log output starts on a fresh line.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.dirty {
            println!();
            self.dirty = false;
        }
        Ok(())
    }
}

impl Default for CountdownLine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::COUNTDOWN_PLACEHOLDER;
    use crate::schedule::DayBoundaries;
    use crate::time_state::resolve;
    use chrono::NaiveDate;

    fn dt(date: &str, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn schedule() -> Schedule {
        Schedule::new(vec![
            DayBoundaries::new("2025-03-10", "5:42 AM", "5:48 PM"),
            DayBoundaries::new("2025-03-11", "5:41 AM", "5:49 PM"),
        ])
    }

    #[test]
    fn test_format_us_date() {
        assert_eq!(format_us_date("2025-03-10"), "03/10/2025");
        assert_eq!(format_us_date("garbage"), "garbage");
        assert_eq!(format_us_date("2025-03"), "2025-03");
    }

    #[test]
    fn test_date_style_from_config() {
        assert_eq!(DateStyle::from_config("iso"), DateStyle::Iso);
        assert_eq!(DateStyle::from_config("us"), DateStyle::Us);
        assert_eq!(DateStyle::from_config("other"), DateStyle::Us);
        assert_eq!(format_date("2025-03-10", DateStyle::Iso), "2025-03-10");
    }

    #[test]
    fn test_render_next_event_uses_raw_time_text() {
        let schedule = schedule();
        let event = resolve(&schedule, dt("2025-03-10", 12, 0));
        assert_eq!(
            render_next_event(event.as_ref(), DateStyle::Us),
            "Iftar • 03/10/2025 • 5:48 PM"
        );
    }

    #[test]
    fn test_render_exhausted() {
        let schedule = schedule();
        let now = dt("2025-03-11", 20, 0);
        let event = resolve(&schedule, now);
        assert_eq!(render_next_event(event.as_ref(), DateStyle::Us), NO_UPCOMING_EVENT_MESSAGE);
        assert_eq!(render_countdown(event.as_ref(), now), COUNTDOWN_PLACEHOLDER);
    }

    #[test]
    fn test_render_countdown() {
        let schedule = schedule();
        let now = dt("2025-03-10", 4, 0);
        let event = resolve(&schedule, now);
        assert_eq!(render_countdown(event.as_ref(), now), "Sahur in 01:42:00");
    }

    #[test]
    fn test_render_calendar_marks_today() {
        let lines = render_calendar(&schedule(), dt("2025-03-11", 9, 0), DateStyle::Us);
        assert_eq!(lines.len(), 2);
        assert!(!lines[0].contains("Today"));
        assert!(lines[1].contains("Today"));
        assert!(lines[1].starts_with("03/11/2025"));
        assert!(lines[1].contains("5:49 PM"));
    }

    #[test]
    fn test_render_calendar_outside_range() {
        let lines = render_calendar(&schedule(), dt("2025-04-01", 9, 0), DateStyle::Iso);
        assert!(lines.iter().all(|line| !line.contains("Today")));
        assert!(lines[0].starts_with("2025-03-10"));
    }
}
