//! Command-line argument parsing and processing.
//!
//! Supports the standard help, version and debug flags, plus options for
//! choosing a calendar file, starting the clock at a fixed moment and the
//! one-shot `--list` / `--once` modes. Unknown options lead to the help text.

use chrono::NaiveDateTime;

use crate::logger::Log;
use crate::time_source::parse_datetime;

/// Settings shared by every mode that reads a calendar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    pub debug_enabled: bool,
    /// Calendar path overriding the config file's `calendar` setting.
    pub calendar: Option<String>,
    /// Start the clock at this local time instead of now.
    pub at: Option<NaiveDateTime>,
}

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the live countdown
    Run(RunOptions),
    /// Print the calendar and exit
    List(RunOptions),
    /// Print the next event and countdown once and exit
    Once(RunOptions),
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown or malformed arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first item is taken to be the program name and skipped.
    /// Precedence: version, then help (or help due to errors), then
    /// `--list`, then `--once`, then the live countdown.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = RunOptions::default();
        let mut display_help = false;
        let mut display_version = false;
        let mut list_calendar = false;
        let mut run_once = false;
        let mut unknown_arg_found = false;

        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut i = 0;
        while i < args_vec.len() {
            let arg_str = &args_vec[i];
            match arg_str.as_str() {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--debug" | "-d" => options.debug_enabled = true,
                "--list" | "-l" => list_calendar = true,
                "--once" | "-o" => run_once = true,
                "--calendar" | "-c" => match args_vec.get(i + 1) {
                    Some(path) if !path.starts_with('-') => {
                        options.calendar = Some(path.clone());
                        i += 1;
                    }
                    _ => {
                        Log::log_warning("Missing path for --calendar. Usage: --calendar <path>");
                        unknown_arg_found = true;
                    }
                },
                "--at" | "-a" => match args_vec.get(i + 1) {
                    Some(value) => {
                        match parse_datetime(value) {
                            Ok(at) => options.at = Some(at),
                            Err(e) => {
                                Log::log_warning(&e);
                                unknown_arg_found = true;
                            }
                        }
                        i += 1;
                    }
                    None => {
                        Log::log_warning("Missing value for --at. Usage: --at \"YYYY-MM-DD HH:MM\"");
                        unknown_arg_found = true;
                    }
                },
                _ => {
                    if arg_str.starts_with('-') {
                        Log::log_warning(&format!("Unknown option: {}", arg_str));
                        unknown_arg_found = true;
                    }
                    // Non-option arguments are ignored
                }
            }
            i += 1;
        }

        let action = if display_version {
            CliAction::ShowVersion
        } else if unknown_arg_found {
            CliAction::ShowHelpDueToError
        } else if display_help {
            CliAction::ShowHelp
        } else if list_calendar {
            CliAction::List(options)
        } else if run_once {
            CliAction::Once(options)
        } else {
            CliAction::Run(options)
        };

        ParsedArgs { action }
    }

    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    Log::log_version();
    Log::log_pipe();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    Log::log_version();
    Log::log_block_start(env!("CARGO_PKG_DESCRIPTION"));
    Log::log_block_start("Usage: iftarr [OPTIONS]");
    Log::log_block_start("Options:");
    Log::log_indented("-a, --at <datetime>    Start the clock at \"YYYY-MM-DD HH:MM[:SS]\"");
    Log::log_indented("-c, --calendar <path>  Use this calendar file instead of the configured one");
    Log::log_indented("-d, --debug            Enable detailed debug output");
    Log::log_indented("-h, --help             Print help information");
    Log::log_indented("-l, --list             Print the calendar and exit");
    Log::log_indented("-o, --once             Print the next event and countdown, then exit");
    Log::log_indented("-V, --version          Print version information");
    Log::log_block_start("Signals:");
    Log::log_indented("SIGUSR2, SIGHUP        Reload the calendar file");
    Log::log_end();
}
