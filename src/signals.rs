//! Signal handling for iftarr.
//!
//! SIGINT and SIGTERM stop the countdown. SIGUSR2 and SIGHUP ask the main loop
//! to re-read the calendar file without restarting.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR2},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    sync::mpsc,
    thread,
};

use crate::logger::Log;

/// Message sent from the signal thread to the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    /// Re-read the calendar (SIGUSR2, SIGHUP)
    Reload,
    /// Stop the countdown (SIGINT, SIGTERM)
    Shutdown,
}

/// Signal handling state shared between threads
pub struct SignalState {
    /// Cleared when a shutdown signal arrives
    pub running: Arc<AtomicBool>,
    pub signal_receiver: mpsc::Receiver<SignalMessage>,
}

impl SignalState {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Map a raw signal number to the action the main loop should take.
pub fn classify_signal(sig: i32) -> Option<SignalMessage> {
    match sig {
        SIGUSR2 | SIGHUP => Some(SignalMessage::Reload),
        SIGINT | SIGTERM => Some(SignalMessage::Shutdown),
        _ => None,
    }
}

fn shutdown_message(sig: i32, debug_enabled: bool) -> &'static str {
    match sig {
        SIGINT if debug_enabled => "Received SIGINT (Ctrl+C), shutting down...",
        SIGINT => "Received interrupt signal, shutting down...",
        SIGTERM => "Received termination request, shutting down...",
        _ => "Received shutdown signal, shutting down...",
    }
}

/// Register handlers and spawn the thread that forwards signals.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));
    let (signal_sender, signal_receiver) = mpsc::channel::<SignalMessage>();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR2])
        .context("failed to register signal handlers")?;

    let running_clone = running.clone();

    thread::spawn(move || {
        for sig in signals.forever() {
            match classify_signal(sig) {
                Some(SignalMessage::Reload) => {
                    Log::log_debug(&format!("Signal {} received, requesting calendar reload", sig));
                    if signal_sender.send(SignalMessage::Reload).is_err() {
                        // Main loop is gone
                        break;
                    }
                }
                Some(SignalMessage::Shutdown) => {
                    Log::log_pipe();
                    Log::log_decorated(shutdown_message(sig, debug_enabled));
                    running_clone.store(false, Ordering::SeqCst);
                    let _ = signal_sender.send(SignalMessage::Shutdown);
                }
                None => {}
            }
        }
    });

    Ok(SignalState {
        running,
        signal_receiver,
    })
}
