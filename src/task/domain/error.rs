//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The owner identifier is empty after trimming.
    #[error("owner id must not be empty")]
    EmptyOwnerId,

    /// The prompt is empty after trimming.
    #[error("prompt must not be empty")]
    EmptyPrompt,

    /// A follow-up message is empty after trimming.
    #[error("message must not be empty")]
    EmptyMessage,

    /// The repository URL is not an `http(s)` or `git@` clone URL.
    #[error("invalid repository url '{0}'")]
    InvalidRepositoryUrl(String),

    /// The branch name is empty, contains forbidden characters, or is too
    /// long.
    #[error("invalid branch name '{0}'")]
    InvalidBranchName(String),

    /// The progress value exceeds 100.
    #[error("invalid progress {0}, expected a value between 0 and 100")]
    InvalidProgress(u8),

    /// The maximum duration is zero or exceeds the supported ceiling.
    #[error("invalid max duration of {0} minutes")]
    InvalidMaxDuration(u32),

    /// The requested state transition is not permitted.
    #[error("task {task_id} cannot transition from {from} to {to}")]
    InvalidStateTransition {
        /// The task identifier.
        task_id: TaskId,
        /// The current state.
        from: TaskStatus,
        /// The requested target state.
        to: TaskStatus,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing message roles or log levels from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseTaskValueError {
    /// Name of the value being parsed.
    pub kind: &'static str,
    /// Raw persisted value.
    pub value: String,
}
