use chrono::{DateTime, Local};

use super::level::Level;

/// One dispatched message, stamped at creation. Never stored.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: Level,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

impl LogEvent {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Local::now(),
        }
    }
}
