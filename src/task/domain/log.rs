//! Per-task log entries surfaced to the task owner.

use super::ParseTaskValueError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity or kind of a task log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Informational progress.
    Info,
    /// A command executed inside the sandbox.
    Command,
    /// A failure or warning.
    Error,
    /// A step finished successfully.
    Success,
}

impl LogLevel {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Command => "command",
            Self::Error => "error",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for LogLevel {
    type Error = ParseTaskValueError;

    fn try_from(value: &str) -> Result<Self, ParseTaskValueError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(LogLevel::Info),
            "command" => Ok(LogLevel::Command),
            "error" => Ok(LogLevel::Error),
            "success" => Ok(LogLevel::Success),
            _ => Err(ParseTaskValueError {
                kind: "log level",
                value: value.to_owned(),
            }),
        }
    }
}

/// Timestamped log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLogEntry {
    /// Entry kind.
    pub level: LogLevel,
    /// Human-readable text.
    pub message: String,
    /// When the entry was produced.
    pub timestamp: DateTime<Utc>,
}

impl TaskLogEntry {
    /// Creates a log entry.
    #[must_use]
    pub fn new(level: LogLevel, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp,
        }
    }
}
