use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use crossterm::{cursor, execute};
use std::{
    io::{self, IsTerminal},
    path::PathBuf,
    time::{Duration, Instant},
};

use iftarr::{
    Config, Log, Schedule,
    args::{CliAction, ParsedArgs, RunOptions, display_help, display_version_info},
    calendar::load_validated,
    constants::*,
    display::{CountdownLine, DateStyle, render_calendar, render_countdown, render_next_event},
    resolve,
    signals::{SignalMessage, SignalState, setup_signal_handler},
    time_source::{OffsetTimeSource, RealTimeSource, TimeSource, clock_jump},
    time_state::{EventKey, TimeState, state_changed, state_of},
    utils::{expand_tilde, path_for_display},
};

const CHECK_INTERVAL: Duration = Duration::from_millis(CHECK_INTERVAL_MS);

/// Hides the cursor while the countdown runs and restores it on drop.
struct TerminalGuard;

impl TerminalGuard {
    /// Returns `None` when stdout is not a terminal (piped, running as a service).
    fn new() -> io::Result<Option<Self>> {
        if !io::stdout().is_terminal() {
            return Ok(None);
        }
        execute!(io::stdout(), cursor::Hide)?;
        Ok(Some(Self))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show);
    }
}

/// Everything the calendar-reading modes need, resolved from flags and config.
struct Session {
    config: Config,
    calendar_path: PathBuf,
    schedule: Schedule,
    clock: Box<dyn TimeSource>,
    style: DateStyle,
}

impl Session {
    fn start(options: &RunOptions) -> Result<Self> {
        let config = Config::load()?;
        config.log_config();

        let calendar_path = match options.calendar.as_deref() {
            Some(path) => expand_tilde(path),
            None => config.calendar_path()?,
        };

        Log::log_block_start(&format!(
            "Loading calendar from {}",
            path_for_display(&calendar_path)
        ));
        let schedule = load_validated(&calendar_path, config.is_strict())?;

        let clock: Box<dyn TimeSource> = match options.at {
            Some(start) => Box::new(OffsetTimeSource::new(start)),
            None => Box::new(RealTimeSource),
        };
        if clock.is_simulated() {
            Log::log_decorated(&format!(
                "Using a simulated clock starting at {}",
                clock.now().format("%Y-%m-%d %H:%M:%S")
            ));
        }

        let style = DateStyle::from_config(config.date_format());

        Ok(Self {
            config,
            calendar_path,
            schedule,
            clock,
            style,
        })
    }

    fn print_calendar(&self, now: NaiveDateTime) {
        Log::log_block_start("Calendar:");
        for line in render_calendar(&self.schedule, now, self.style) {
            Log::log_indented(&line);
        }
    }

    /// Re-read the calendar file, keeping the current schedule on failure.
    fn reload(&mut self) -> bool {
        match load_validated(&self.calendar_path, self.config.is_strict()) {
            Ok(schedule) => {
                self.schedule = schedule;
                true
            }
            Err(e) => {
                Log::log_error(&format!("Failed to reload calendar: {:#}", e));
                Log::log_indented("Keeping the previously loaded calendar");
                false
            }
        }
    }
}

fn run_list(options: &RunOptions) -> Result<()> {
    let session = Session::start(options)?;
    session.print_calendar(session.clock.now());
    Log::log_end();
    Ok(())
}

fn run_once(options: &RunOptions) -> Result<()> {
    let session = Session::start(options)?;
    let now = session.clock.now();
    if session.config.show_calendar() {
        session.print_calendar(now);
    }

    let event = resolve(&session.schedule, now);
    Log::log_block_start(&render_next_event(event.as_ref(), session.style));
    Log::log_decorated(&render_countdown(event.as_ref(), now));
    Log::log_end();
    Ok(())
}

/// Drain pending signal messages. Returns true if a reload was requested.
fn drain_signals(signal_state: &SignalState) -> bool {
    let mut reload_requested = false;
    while let Ok(message) = signal_state.signal_receiver.try_recv() {
        match message {
            SignalMessage::Reload => reload_requested = true,
            SignalMessage::Shutdown => {} // running flag is already cleared
        }
    }
    reload_requested
}

fn run_countdown(options: &RunOptions) -> Result<()> {
    let _term = TerminalGuard::new().context("failed to initialize terminal features")?;
    let signal_state = setup_signal_handler(options.debug_enabled)?;

    let mut session = Session::start(options)?;
    if session.config.show_calendar() {
        session.print_calendar(session.clock.now());
    }

    let update_interval = Duration::from_millis(session.config.update_interval_ms());
    let refresh_interval = Duration::from_secs(session.config.refresh_interval_secs());

    let mut line = CountdownLine::new();
    let mut previous_key: Option<EventKey> = None;
    let mut last_tick: Option<(NaiveDateTime, Instant)> = None;
    let mut last_refresh = Instant::now();

    while signal_state.is_running() {
        let reload_requested = drain_signals(&signal_state);
        if !signal_state.is_running() {
            break;
        }

        if reload_requested || last_refresh.elapsed() >= refresh_interval {
            line.finish()?;
            if reload_requested {
                Log::log_block_start("Reloading calendar on request...");
            } else {
                Log::log_debug("Periodic calendar refresh");
            }
            if session.reload() && reload_requested {
                // Re-announce the next event against the new calendar
                previous_key = None;
            }
            last_refresh = Instant::now();
        }

        let now = session.clock.now();
        let tick_started = Instant::now();
        if let Some((last_now, last_started)) = last_tick {
            let real_elapsed = tick_started.duration_since(last_started);
            if let Some(jump) = clock_jump(last_now, now, real_elapsed) {
                line.finish()?;
                Log::log_block_start(&format!(
                    "Clock jumped by {} minutes, resolving the next event again",
                    jump.num_minutes()
                ));
            }
        }
        last_tick = Some((now, tick_started));

        let event = resolve(&session.schedule, now);
        let key = event.as_ref().map(|e| e.key());
        if key != previous_key {
            line.finish()?;
            state_changed(previous_key.as_ref(), key.as_ref());
            Log::log_indented(&render_next_event(event.as_ref(), session.style));
            if state_of(event.as_ref()) == TimeState::Exhausted {
                Log::log_indented("Add days to the calendar and send SIGUSR2 to reload it");
            }
            previous_key = key;
        }

        line.update(&render_countdown(event.as_ref(), now))?;

        // Sleep in small chunks so signals are handled promptly
        let mut slept = Duration::ZERO;
        while slept < update_interval && signal_state.is_running() {
            let sleep_chunk = CHECK_INTERVAL.min(update_interval - slept);
            session.clock.sleep(sleep_chunk);
            slept += sleep_chunk;
        }
    }

    line.finish()?;
    Log::log_block_start("Shutting down iftarr...");
    Log::log_end();
    Ok(())
}

fn run(action: CliAction) -> Result<()> {
    match action {
        CliAction::ShowVersion => {
            display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::List(options) => {
            Log::set_debug(options.debug_enabled);
            Log::log_version();
            run_list(&options)
        }
        CliAction::Once(options) => {
            Log::set_debug(options.debug_enabled);
            Log::log_version();
            run_once(&options)
        }
        CliAction::Run(options) => {
            Log::set_debug(options.debug_enabled);
            Log::log_version();
            run_countdown(&options)
        }
    }
}

fn main() {
    let parsed = ParsedArgs::from_env();
    if let Err(e) = run(parsed.action) {
        Log::log_pipe();
        Log::log_critical(&format!("{:#}", e));
        Log::log_end();
        std::process::exit(EXIT_FAILURE);
    }
}
