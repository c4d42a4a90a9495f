//! Configuration system for iftarr.
//!
//! Settings live in `iftarr.toml` under the user's config directory
//! (`$XDG_CONFIG_HOME/iftarr/iftarr.toml`, usually `~/.config/iftarr/`). A
//! commented default file is written on first run.
//!
//! ```toml
//! calendar = "~/.config/iftarr/calendar.json"  # Calendar JSON file
//! update_interval = 1000                       # Countdown refresh (milliseconds)
//! refresh_interval = 3600                      # Calendar reload (seconds)
//! strict_calendar = false                      # Refuse calendars with issues
//! date_format = "us"                           # "us" (MM/DD/YYYY) or "iso"
//! show_calendar = false                        # Print the full calendar on start
//! ```
//!
//! Every field is optional. Missing values take the defaults from
//! `constants.rs`; present values are range-checked and rejected with a message
//! naming the accepted range.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::logger::Log;
use crate::utils::{expand_tilde, path_for_display};

/// Configuration loaded from `iftarr.toml`.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path of the calendar JSON file. `~` expands to the home directory.
    pub calendar: Option<String>,
    pub update_interval: Option<u64>,  // milliseconds between countdown redraws
    pub refresh_interval: Option<u64>, // seconds between calendar reloads
    /// Refuse to start (or to swap in a reload) when validation finds issues.
    pub strict_calendar: Option<bool>,
    pub date_format: Option<String>, // "us" or "iso"
    pub show_calendar: Option<bool>,
}

impl Config {
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join(CONFIG_DIR_NAME))
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Calendar location used when the config doesn't name one.
    pub fn default_calendar_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join(DEFAULT_CALENDAR_FILE_NAME))
    }

    /// Write a commented default configuration to `path`.
    pub fn create_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let calendar_path = Self::default_calendar_path()
            .map(|p| path_for_display(&p))
            .unwrap_or_else(|_| format!("~/.config/{}/{}", CONFIG_DIR_NAME, DEFAULT_CALENDAR_FILE_NAME));

        let content = ConfigBuilder::new()
            .add_section("iftarr configuration")
            .add_setting(
                "calendar",
                &format!("\"{}\"", calendar_path),
                "Calendar JSON file: [{date, sahur, iftar}, ...]",
            )
            .add_setting(
                "update_interval",
                &DEFAULT_UPDATE_INTERVAL_MS.to_string(),
                &format!(
                    "Countdown refresh in milliseconds ({}-{})",
                    MINIMUM_UPDATE_INTERVAL_MS, MAXIMUM_UPDATE_INTERVAL_MS
                ),
            )
            .add_setting(
                "refresh_interval",
                &DEFAULT_REFRESH_INTERVAL_SECS.to_string(),
                &format!(
                    "Calendar reload in seconds ({}-{})",
                    MINIMUM_REFRESH_INTERVAL_SECS, MAXIMUM_REFRESH_INTERVAL_SECS
                ),
            )
            .add_setting(
                "strict_calendar",
                &DEFAULT_STRICT_CALENDAR.to_string(),
                "Refuse calendars with out-of-order, duplicate or unparseable entries",
            )
            .add_section("Display")
            .add_setting(
                "date_format",
                &format!("\"{}\"", DEFAULT_DATE_FORMAT),
                "Select: \"us\" (MM/DD/YYYY) or \"iso\" (YYYY-MM-DD)",
            )
            .add_setting(
                "show_calendar",
                &DEFAULT_SHOW_CALENDAR.to_string(),
                "Print the whole calendar before the countdown",
            )
            .build();

        fs::write(path, content).context("Failed to write default config file")?;
        Ok(())
    }

    fn apply_defaults(config: &mut Config) {
        if config.update_interval.is_none() {
            config.update_interval = Some(DEFAULT_UPDATE_INTERVAL_MS);
        }
        if config.refresh_interval.is_none() {
            config.refresh_interval = Some(DEFAULT_REFRESH_INTERVAL_SECS);
        }
        if config.strict_calendar.is_none() {
            config.strict_calendar = Some(DEFAULT_STRICT_CALENDAR);
        }
        if config.date_format.is_none() {
            config.date_format = Some(DEFAULT_DATE_FORMAT.to_string());
        }
        if config.show_calendar.is_none() {
            config.show_calendar = Some(DEFAULT_SHOW_CALENDAR);
        }
    }

    /// Load from a specific path. Does not create the file when missing.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Configuration file not found at specified path: {}",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        validate_config(&config)?;
        Self::apply_defaults(&mut config);

        Ok(config)
    }

    /// Load from the default location, creating a default file first if needed.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)
                .context("Failed to create default config during load")?;
            Log::log_indented(&format!(
                "Created default configuration at {}",
                path_for_display(&config_path)
            ));
        }

        Self::load_from_path(&config_path).with_context(|| {
            format!(
                "Failed to load configuration from {}",
                config_path.display()
            )
        })
    }

    /// Resolved calendar path: the configured one or the default location.
    pub fn calendar_path(&self) -> Result<PathBuf> {
        match self.calendar.as_deref() {
            Some(path) => Ok(expand_tilde(path)),
            None => Self::default_calendar_path(),
        }
    }

    pub fn update_interval_ms(&self) -> u64 {
        self.update_interval.unwrap_or(DEFAULT_UPDATE_INTERVAL_MS)
    }

    pub fn refresh_interval_secs(&self) -> u64 {
        self.refresh_interval.unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS)
    }

    pub fn is_strict(&self) -> bool {
        self.strict_calendar.unwrap_or(DEFAULT_STRICT_CALENDAR)
    }

    pub fn date_format(&self) -> &str {
        self.date_format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT)
    }

    pub fn show_calendar(&self) -> bool {
        self.show_calendar.unwrap_or(DEFAULT_SHOW_CALENDAR)
    }

    pub fn log_config(&self) {
        let config_path = Self::get_config_path()
            .map(|p| path_for_display(&p))
            .unwrap_or_else(|_| format!("~/.config/{}/{}", CONFIG_DIR_NAME, CONFIG_FILE_NAME));

        Log::log_block_start(&format!("Loaded configuration from {}", config_path));

        match self.calendar_path() {
            Ok(path) => Log::log_indented(&format!("Calendar: {}", path_for_display(&path))),
            Err(_) => Log::log_indented("Calendar: <unknown>"),
        }
        Log::log_indented(&format!(
            "Update interval: {} ms",
            self.update_interval_ms()
        ));
        Log::log_indented(&format!(
            "Calendar refresh: every {} seconds",
            self.refresh_interval_secs()
        ));
        Log::log_indented(&format!("Strict calendar: {}", self.is_strict()));
        Log::log_indented(&format!("Date format: {}", self.date_format()));
    }
}

/// Check every present value against its accepted range.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(calendar) = config.calendar.as_deref() {
        if calendar.trim().is_empty() {
            anyhow::bail!("calendar path cannot be empty. Remove the line to use the default");
        }
    }

    if let Some(interval) = config.update_interval {
        if !(MINIMUM_UPDATE_INTERVAL_MS..=MAXIMUM_UPDATE_INTERVAL_MS).contains(&interval) {
            anyhow::bail!(
                "update_interval must be between {} and {} milliseconds (got {})",
                MINIMUM_UPDATE_INTERVAL_MS,
                MAXIMUM_UPDATE_INTERVAL_MS,
                interval
            );
        }
    }

    if let Some(interval) = config.refresh_interval {
        if !(MINIMUM_REFRESH_INTERVAL_SECS..=MAXIMUM_REFRESH_INTERVAL_SECS).contains(&interval) {
            anyhow::bail!(
                "refresh_interval must be between {} and {} seconds (got {})",
                MINIMUM_REFRESH_INTERVAL_SECS,
                MAXIMUM_REFRESH_INTERVAL_SECS,
                interval
            );
        }
    }

    if let Some(format) = config.date_format.as_deref() {
        if !DATE_FORMATS.contains(&format) {
            anyhow::bail!(
                "date_format must be one of {} (got {:?})",
                DATE_FORMATS.join(", "),
                format
            );
        }
    }

    Ok(())
}

/// Builds a config file with comments aligned in one column.
struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{}]", title)));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{} = {}", key, value),
            comment: format!("# {}", comment),
        });
        self
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                ConfigEntry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1; // one space between setting and comment

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) => {
                    if !first_section {
                        result.push(String::new());
                    }
                    result.push(title);
                    first_section = false;
                }
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{}{}{}", line, padding, comment));
                }
            }
        }

        result.push(String::new());
        result.join("\n")
    }
}
