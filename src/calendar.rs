//! Calendar loading and validation.
//!
//! Reads a schedule from a local JSON file. Two shapes are accepted:
//!
//! ```json
//! [{"date": "2025-03-01", "sahur": "5:42 AM", "iftar": "5:48 PM"}, ...]
//! ```
//!
//! and the upstream provider's response envelope, which is flattened to the
//! first shape:
//!
//! ```json
//! {"status": "success", "data": {"fasting": [
//!     {"date": "2025-03-01", "time": {"sahur": "05:42", "iftar": "17:48"}}
//! ]}}
//! ```
//!
//! Validation never changes what the resolver does. It only reports entries
//! that will make the countdown behave oddly so the user can fix the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::constants::PROVIDER_SUCCESS_STATUS;
use crate::logger::Log;
use crate::schedule::{DayBoundaries, Schedule};
use crate::time_parse::{parse_calendar_date, parse_time_of_day};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CalendarFile {
    Days(Vec<DayBoundaries>),
    Provider(ProviderResponse),
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    status: String,
    data: Option<ProviderData>,
}

#[derive(Debug, Deserialize)]
struct ProviderData {
    fasting: Vec<ProviderDay>,
}

#[derive(Debug, Deserialize)]
struct ProviderDay {
    date: String,
    time: ProviderTimes,
}

// The provider sends more fields (duration, hijri date) that are ignored.
#[derive(Debug, Deserialize)]
struct ProviderTimes {
    sahur: String,
    iftar: String,
}

/// Something in a calendar that the resolver will tolerate but probably
/// shouldn't have to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleIssue {
    #[error("entry {index}: date {date:?} is not a valid YYYY-MM-DD date")]
    InvalidDate { index: usize, date: String },
    #[error("entry {index}: date {date} appears more than once")]
    DuplicateDate { index: usize, date: String },
    #[error("entry {index}: date {date} comes before the previous entry")]
    OutOfOrder { index: usize, date: String },
    #[error("entry {index}: {field} time {text:?} is not H:MM or H:MM AM/PM, using best-effort parsing")]
    NonStandardTime {
        index: usize,
        field: &'static str,
        text: String,
    },
    #[error("entry {index}: {field} time {text:?} cannot be parsed, this event will be skipped")]
    UnparsableTime {
        index: usize,
        field: &'static str,
        text: String,
    },
    #[error("entry {index}: iftar on {date} is not after sahur")]
    IftarNotAfterSahur { index: usize, date: String },
}

/// Parse calendar JSON in either accepted shape.
pub fn parse_calendar(json: &str) -> Result<Schedule> {
    let file: CalendarFile =
        serde_json::from_str(json).context("Calendar is not a list of {date, sahur, iftar} records")?;

    match file {
        CalendarFile::Days(days) => Ok(Schedule::new(days)),
        CalendarFile::Provider(response) => {
            if response.status != PROVIDER_SUCCESS_STATUS {
                anyhow::bail!(
                    "Calendar provider reported status {:?} instead of {:?}",
                    response.status,
                    PROVIDER_SUCCESS_STATUS
                );
            }
            let data = response
                .data
                .context("Calendar provider response has no data section")?;
            let days = data
                .fasting
                .into_iter()
                .map(|day| DayBoundaries::new(day.date, day.time.sahur, day.time.iftar))
                .collect();
            Ok(Schedule::new(days))
        }
    }
}

/// Read and parse a calendar file.
pub fn load_calendar(path: &Path) -> Result<Schedule> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read calendar file {}", path.display()))?;
    parse_calendar(&content).with_context(|| format!("Failed to parse calendar file {}", path.display()))
}

/// Report entries that break the calendar's implicit assumptions.
///
/// Checks that dates are valid, unique and ascending, that both times parse
/// with the structured parser, and that Iftar falls after Sahur.
pub fn validate_schedule(schedule: &Schedule) -> Vec<ScheduleIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    let mut previous_date = None;

    for (index, day) in schedule.iter().enumerate() {
        match parse_calendar_date(&day.date) {
            Ok(date) => {
                if let Some(previous) = previous_date {
                    if date < previous {
                        issues.push(ScheduleIssue::OutOfOrder {
                            index,
                            date: day.date.clone(),
                        });
                    }
                }
                previous_date = Some(date);
            }
            Err(_) => issues.push(ScheduleIssue::InvalidDate {
                index,
                date: day.date.clone(),
            }),
        }

        if !seen.insert(day.date.as_str()) {
            issues.push(ScheduleIssue::DuplicateDate {
                index,
                date: day.date.clone(),
            });
        }

        let boundaries = [
            ("sahur", &day.sahur, day.sahur_at()),
            ("iftar", &day.iftar, day.iftar_at()),
        ];
        for (field, text, at) in boundaries {
            if parse_time_of_day(text).is_ok() {
                continue;
            }
            let text = text.clone();
            if at.is_valid() {
                issues.push(ScheduleIssue::NonStandardTime { index, field, text });
            } else {
                issues.push(ScheduleIssue::UnparsableTime { index, field, text });
            }
        }

        if let (Some(sahur), Some(iftar)) = (day.sahur_at().instant(), day.iftar_at().instant()) {
            if iftar <= sahur {
                issues.push(ScheduleIssue::IftarNotAfterSahur {
                    index,
                    date: day.date.clone(),
                });
            }
        }
    }

    issues
}

/// Load a calendar, log any validation issues and apply the strictness policy.
///
/// With `strict` set, any issue fails the load. Otherwise issues are logged as
/// warnings and the schedule is returned unchanged.
pub fn load_validated(path: &Path, strict: bool) -> Result<Schedule> {
    let schedule = load_calendar(path)?;
    let issues = validate_schedule(&schedule);

    if !issues.is_empty() {
        Log::log_warning(&format!(
            "Calendar {} has {} issue(s):",
            path.display(),
            issues.len()
        ));
        for issue in &issues {
            Log::log_indented(&issue.to_string());
        }
        if strict {
            anyhow::bail!(
                "Calendar {} failed validation with {} issue(s) and strict_calendar is enabled",
                path.display(),
                issues.len()
            );
        }
    }

    if schedule.is_empty() {
        Log::log_warning("Calendar is empty, there is nothing to count down to");
    } else if let (Some(first), Some(last)) = (schedule.first(), schedule.last()) {
        Log::log_debug(&format!(
            "Loaded {} calendar day(s) from {}, {} to {}",
            schedule.len(),
            path.display(),
            first.date,
            last.date
        ));
    }

    Ok(schedule)
}
