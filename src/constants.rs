//! Application constants and default values for iftarr.
//!
//! Configuration defaults, validation limits, formats and operational timing
//! values used across the crate.

// ═══ Application Configuration Defaults ═══
// Used when an option is missing from iftarr.toml

pub const CONFIG_DIR_NAME: &str = "iftarr";
pub const CONFIG_FILE_NAME: &str = "iftarr.toml";
pub const DEFAULT_CALENDAR_FILE_NAME: &str = "calendar.json";
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 1000; // one countdown redraw per second
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3600; // re-read the calendar hourly
pub const DEFAULT_STRICT_CALENDAR: bool = false;
pub const DEFAULT_DATE_FORMAT: &str = "us";
pub const DEFAULT_SHOW_CALENDAR: bool = false;

// ═══ Validation Limits ═══

pub const MINIMUM_UPDATE_INTERVAL_MS: u64 = 100;
pub const MAXIMUM_UPDATE_INTERVAL_MS: u64 = 60_000;
pub const MINIMUM_REFRESH_INTERVAL_SECS: u64 = 60;
pub const MAXIMUM_REFRESH_INTERVAL_SECS: u64 = 86_400;
pub const DATE_FORMATS: &[&str] = &["us", "iso"];

// ═══ Calendar and Time Formats ═══

/// Canonical serialization of a calendar date, also the schedule lookup key.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Formats tried, in order, by the free-text fallback after the structured
/// 12/24-hour parsers fail. Input is `"<date> <time text>"`.
pub const FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%Y-%m-%d %H.%M",
    "%Y-%m-%d %H%M",
];

/// Formats accepted by `--at`.
pub const CLI_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Status value the upstream provider uses for a good response.
pub const PROVIDER_SUCCESS_STATUS: &str = "success";

// ═══ Display ═══

pub const COUNTDOWN_PLACEHOLDER: &str = "--:--:--";
pub const NO_UPCOMING_EVENT_MESSAGE: &str = "No upcoming event found.";

// ═══ Operational Timing Constants ═══

pub const CHECK_INTERVAL_MS: u64 = 100; // How often to check the running flag during sleep
pub const CLOCK_JUMP_THRESHOLD_SECS: i64 = 300; // Clock moved by more than this between ticks

// ═══ Exit Codes ═══

pub const EXIT_FAILURE: i32 = 1;
