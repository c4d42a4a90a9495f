//! Next-event resolution for the Sahur/Iftar calendar.
//!
//! Given a [`Schedule`] and the current local instant, [`resolve`] decides
//! which boundary comes next. It is a pure function: the same inputs always
//! give the same answer and nothing is cached or mutated.
//!
//! ## Resolution
//! - **Today is in the calendar**: before today's Sahur the next event is
//!   Sahur, before today's Iftar it is Iftar, after that it is tomorrow's
//!   Sahur (or nothing when today is the last entry).
//! - **Today is not in the calendar** (e.g. before the month starts): the
//!   first entry in stored order whose Sahur or Iftar is still ahead wins.
//!
//! Comparisons are strict, so an event exactly at `now` counts as passed.
//! Instants that failed to parse are never ahead of `now` and are skipped.
//!
//! ## State view
//! The result always falls in one of three [`TimeState`]s and only moves
//! forward (`AwaitingSahur` → `AwaitingIftar` → `AwaitingSahur` of the next
//! day … → `Exhausted`) while `now` advances over a fixed schedule.

use chrono::{Duration, NaiveDateTime};
use std::fmt;

use crate::constants::DATE_KEY_FORMAT;
use crate::logger::Log;
use crate::schedule::{DayBoundaries, Schedule};
use crate::time_parse::EventTime;

/// Which of the two daily boundaries an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    Sahur, // Pre-dawn, start of the fast
    Iftar, // Dusk, end of the fast
}

impl Boundary {
    pub fn label(&self) -> &'static str {
        match self {
            Boundary::Sahur => "Sahur",
            Boundary::Iftar => "Iftar",
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolver output reduced to its state machine position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeState {
    AwaitingSahur,
    AwaitingIftar,
    Exhausted, // No boundary left in the calendar
}

/// The next boundary after `now`, borrowing its day from the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextEvent<'a> {
    pub boundary: Boundary,
    pub at: EventTime,
    pub day: &'a DayBoundaries,
}

impl<'a> NextEvent<'a> {
    pub fn state(&self) -> TimeState {
        match self.boundary {
            Boundary::Sahur => TimeState::AwaitingSahur,
            Boundary::Iftar => TimeState::AwaitingIftar,
        }
    }

    /// The boundary time exactly as the calendar wrote it.
    pub fn time_text(&self) -> &'a str {
        match self.boundary {
            Boundary::Sahur => &self.day.sahur,
            Boundary::Iftar => &self.day.iftar,
        }
    }

    /// Time left until the event, `None` when the instant is invalid.
    ///
    /// May be negative if `now` is past the event, which only happens when the
    /// event came from a stale resolution.
    pub fn remaining(&self, now: NaiveDateTime) -> Option<Duration> {
        self.at.instant().map(|at| at - now)
    }

    /// Owned identity of this event, for comparing across resolution passes.
    pub fn key(&self) -> EventKey {
        EventKey {
            boundary: self.boundary,
            date: self.day.date.clone(),
        }
    }
}

/// Identifies an event independently of the schedule it was resolved from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub boundary: Boundary,
    pub date: String,
}

/// State of an optional resolver result.
pub fn state_of(event: Option<&NextEvent<'_>>) -> TimeState {
    event.map_or(TimeState::Exhausted, |e| e.state())
}

/// Canonical `YYYY-MM-DD` key for the local date of `now`.
pub fn date_key(now: NaiveDateTime) -> String {
    now.format(DATE_KEY_FORMAT).to_string()
}

/// Determine the next Sahur or Iftar after `now`.
///
/// Returns `None` for an empty schedule, when the calendar is exhausted, or
/// when no entry has a boundary ahead of `now`.
pub fn resolve(schedule: &Schedule, now: NaiveDateTime) -> Option<NextEvent<'_>> {
    if schedule.is_empty() {
        return None;
    }

    let today = date_key(now);

    if let Some(index) = schedule.find_by_date(&today) {
        let day = schedule.at(index)?;
        if let Some(event) = consider_day(day, now) {
            return Some(event);
        }

        // Today's Iftar has passed: tomorrow's Sahur, trusting input order
        return schedule.at(index + 1).map(|tomorrow| NextEvent {
            boundary: Boundary::Sahur,
            at: tomorrow.sahur_at(),
            day: tomorrow,
        });
    }

    schedule.iter().find_map(|day| consider_day(day, now))
}

/// Sahur then Iftar of a single day, whichever is still strictly ahead.
fn consider_day(day: &DayBoundaries, now: NaiveDateTime) -> Option<NextEvent<'_>> {
    let sahur_at = day.sahur_at();
    if sahur_at.is_after(now) {
        return Some(NextEvent {
            boundary: Boundary::Sahur,
            at: sahur_at,
            day,
        });
    }

    let iftar_at = day.iftar_at();
    if iftar_at.is_after(now) {
        return Some(NextEvent {
            boundary: Boundary::Iftar,
            at: iftar_at,
            day,
        });
    }

    None
}

/// Get the announcement for moving from one resolved event to another.
///
/// Returns `None` when nothing changed between passes.
pub fn transition_message(previous: Option<&EventKey>, current: Option<&EventKey>) -> Option<String> {
    match (previous, current) {
        (Some(prev), Some(curr)) if prev == curr => None,
        (None, None) => None,
        (Some(prev), Some(curr)) => Some(format!(
            "{} passed for {}, next is {} on {}",
            prev.boundary, prev.date, curr.boundary, curr.date
        )),
        (Some(prev), None) => Some(format!(
            "{} passed for {}, no events remain in the calendar",
            prev.boundary, prev.date
        )),
        (None, Some(curr)) => Some(format!("Next event is {} on {}", curr.boundary, curr.date)),
    }
}

/// Report whether the next event changed between passes, logging the
/// announcement when it did.
///
/// Called by the runner once per tick with the previous and current keys.
pub fn state_changed(previous: Option<&EventKey>, current: Option<&EventKey>) -> bool {
    match transition_message(previous, current) {
        Some(message) => {
            Log::log_block_start(&message);
            true
        }
        None => false,
    }
}
