use std::sync::{Mutex, PoisonError};

use log::info;

/// Receives human-readable progress while importing and classifying.
pub trait StatusReporter: Send + Sync {
    fn report(&self, message: &str);
}

/// Forwards status lines to the log.
#[derive(Debug, Default)]
pub struct LogReporter;

impl StatusReporter for LogReporter {
    fn report(&self, message: &str) {
        info!("{message}");
    }
}

/// Keeps every status line, in order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StatusReporter for RecordingReporter {
    fn report(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

pub fn import_progress_message(done: usize, total: usize) -> String {
    let percent = if total == 0 { 100 } else { done * 100 / total };
    format!("Importing data... ({percent}%)")
}

pub fn trips_found_message(count: usize) -> String {
    format!("Found {count} trips, searching for more...")
}
