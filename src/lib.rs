//! # Iftarr
//!
//! A terminal countdown to the next Sahur or Iftar, driven by a local
//! Ramadan calendar file.
//!
//! ## Architecture
//!
//! - **time_parse**: Calendar time strings to local instants, with a free-text fallback
//! - **schedule**: Calendar days and the ordered schedule
//! - **calendar**: Calendar file loading (two JSON shapes) and validation
//! - **time_state**: Next-event resolution and transition announcements
//! - **countdown**: `HH:MM:SS` countdown formatting
//! - **display**: Terminal rendering of events, countdowns and the calendar
//! - **time_source**: Real and offset clocks feeding `now` to the runner
//! - **config**: Configuration loading, validation, and default generation
//! - **args**: Command-line parsing
//! - **signals**: Shutdown and calendar reload signals
//! - **logger**: Structured logging with visual formatting
//! - **constants**: Application-wide constants and defaults

pub mod args;
pub mod calendar;
pub mod config;
pub mod constants;
pub mod countdown;
pub mod display;
pub mod logger;
pub mod schedule;
pub mod signals;
pub mod time_parse;
pub mod time_source;
pub mod time_state;
pub mod utils;

// Re-export important types for easier access
pub use config::Config;
pub use countdown::format_countdown;
pub use logger::{Log, LogLevel};
pub use schedule::{DayBoundaries, Schedule};
pub use time_parse::EventTime;
pub use time_state::{Boundary, EventKey, NextEvent, TimeState, resolve};
