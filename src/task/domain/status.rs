//! Task lifecycle status and its transition table.

use super::ParseTaskStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has been recorded but no run has started.
    Pending,
    /// A run is in flight.
    Processing,
    /// The agent succeeded and its changes were pushed.
    Completed,
    /// The run failed; see the task's error message.
    Error,
    /// The user cancelled the run.
    Stopped,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Stopped => "stopped",
        }
    }

    /// Returns `true` when no run is in flight for this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error | Self::Stopped)
    }

    /// Returns `true` when a follow-up message may reactivate the task.
    #[must_use]
    pub const fn can_continue(self) -> bool {
        matches!(self, Self::Completed | Self::Error | Self::Processing)
    }

    /// Returns `true` when moving from `self` to `target` is permitted.
    ///
    /// `Processing → Processing` is the continuation re-entry. `Stopped` may
    /// still settle as `Completed` or `Error` because a run that has passed
    /// its last cancellation checkpoint finishes with its real outcome, but a
    /// stopped task never re-enters `Processing`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Processing | Self::Error | Self::Stopped)
                | (
                    Self::Processing,
                    Self::Processing | Self::Completed | Self::Error | Self::Stopped
                )
                | (Self::Completed | Self::Error, Self::Processing)
                | (Self::Stopped, Self::Completed | Self::Error)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    // `Self::Error` would be ambiguous with the associated error type here.
    fn try_from(value: &str) -> Result<Self, ParseTaskStatusError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "processing" => Ok(TaskStatus::Processing),
            "completed" => Ok(TaskStatus::Completed),
            "error" => Ok(TaskStatus::Error),
            "stopped" => Ok(TaskStatus::Stopped),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}
