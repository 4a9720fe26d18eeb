//! User-facing output: the logger handed to each prepare invocation.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - The [`Logger`] seam and its console and in-memory backends

use std::sync::Mutex;

pub mod formatter;

pub use formatter::{
    format_error, format_prepared, format_status, format_success, format_warning,
};

/// Sink for progress messages emitted by the prepare steps.
///
/// The release host owns the logger and passes it in through the
/// [`Context`](crate::context::Context); nothing in this crate logs globally.
pub trait Logger: Send + Sync {
    /// Progress message
    fn log(&self, message: &str);

    /// A step finished successfully
    fn success(&self, message: &str);

    /// Something looks wrong but the step continues
    fn warn(&self, message: &str);

    /// A step failed
    fn error(&self, message: &str);
}

/// Logger printing styled lines to the terminal.
///
/// Status and success lines go to stdout, warnings and errors to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        println!("{}", format_status(message));
    }

    fn success(&self, message: &str) {
        println!("{}", format_success(message));
    }

    fn warn(&self, message: &str) {
        eprintln!("{}", format_warning(message));
    }

    fn error(&self, message: &str) {
        eprintln!("{}", format_error(message));
    }
}

/// Severity of a recorded message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Log,
    Success,
    Warn,
    Error,
}

/// Logger that keeps every message in memory.
///
/// Useful for hosts that forward messages elsewhere, and for tests.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded messages in emission order
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Recorded messages of one level
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((level, message.to_string()));
    }
}

impl Logger for MemoryLogger {
    fn log(&self, message: &str) {
        self.push(Level::Log, message);
    }

    fn success(&self, message: &str) {
        self.push(Level::Success, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}
