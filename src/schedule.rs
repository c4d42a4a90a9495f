//! Ordered calendar of daily Sahur/Iftar boundaries.
//!
//! A [`Schedule`] is built once per calendar load and never mutated; a new
//! calendar replaces the whole value. Entries keep the order they were
//! supplied in, which is also the order "next day" lookups follow.

use serde::Deserialize;
use std::slice;

use crate::time_parse::{EventTime, boundary_instant};

/// One calendar day: its date and the two boundary times, as supplied.
///
/// The strings are kept verbatim so the presenter can show exactly what the
/// provider wrote. Parsing happens on demand through [`DayBoundaries::sahur_at`]
/// and [`DayBoundaries::iftar_at`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DayBoundaries {
    /// Calendar date as `YYYY-MM-DD`.
    pub date: String,
    pub sahur: String,
    pub iftar: String,
}

impl DayBoundaries {
    pub fn new(date: impl Into<String>, sahur: impl Into<String>, iftar: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            sahur: sahur.into(),
            iftar: iftar.into(),
        }
    }

    pub fn sahur_at(&self) -> EventTime {
        boundary_instant(&self.date, &self.sahur)
    }

    pub fn iftar_at(&self) -> EventTime {
        boundary_instant(&self.date, &self.iftar)
    }
}

/// Immutable, ordered sequence of [`DayBoundaries`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    days: Vec<DayBoundaries>,
}

impl Schedule {
    pub fn new(days: Vec<DayBoundaries>) -> Self {
        Self { days }
    }

    /// Index of the entry whose date string equals `date_key` exactly.
    pub fn find_by_date(&self, date_key: &str) -> Option<usize> {
        self.days.iter().position(|day| day.date == date_key)
    }

    pub fn at(&self, index: usize) -> Option<&DayBoundaries> {
        self.days.get(index)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, DayBoundaries> {
        self.days.iter()
    }

    pub fn first(&self) -> Option<&DayBoundaries> {
        self.days.first()
    }

    pub fn last(&self) -> Option<&DayBoundaries> {
        self.days.last()
    }
}

impl From<Vec<DayBoundaries>> for Schedule {
    fn from(days: Vec<DayBoundaries>) -> Self {
        Self::new(days)
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a DayBoundaries;
    type IntoIter = slice::Iter<'a, DayBoundaries>;

    fn into_iter(self) -> Self::IntoIter {
        self.days.iter()
    }
}
