//! Progress reporting for the pipeline.
//!
//! Components never print directly. They receive an [`Observer`] and report
//! what they did through it, which keeps the statistics core testable without
//! capturing console output.

use std::sync::Mutex;

use crate::{info, warning};

/// Sink for progress and degradation messages.
pub trait Observer: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
}

/// Forwards messages to the colored console macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

impl Observer for ConsoleObserver {
    fn info(&self, message: &str) {
        info!("{}", message);
    }

    fn warn(&self, message: &str) {
        warning!("{}", message);
    }
}

/// Drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl Observer for SilentObserver {
    fn info(&self, _message: &str) {}

    fn warn(&self, _message: &str) {}
}

/// Keeps every message in memory, prefixed with its level.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    lines: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn warnings(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|l| l.strip_prefix("warn: ").map(str::to_string))
            .collect()
    }

    fn push(&self, line: String) {
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line),
            Err(poisoned) => poisoned.into_inner().push(line),
        }
    }
}

impl Observer for RecordingObserver {
    fn info(&self, message: &str) {
        self.push(format!("info: {message}"));
    }

    fn warn(&self, message: &str) {
        self.push(format!("warn: {message}"));
    }
}
