//! Errors surfaced by the orchestrator.

use crate::agent::ports::AgentError;
use crate::sandbox::services::ProvisionError;
use crate::task::{
    domain::{BranchName, TaskDomainError, TaskId, TaskStatus},
    ports::{RateLimiterError, TaskStoreError},
};
use crate::vcs::ports::PushError;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Request rejected before any job starts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A request field failed domain validation.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// The task never reached branch creation.
    #[error("task {0} has no branch and cannot be continued")]
    MissingBranchName(TaskId),

    /// The task status does not allow a follow-up.
    #[error("task {task_id} cannot be continued while {status}")]
    NotContinuable {
        /// The task.
        task_id: TaskId,
        /// Its current status.
        status: TaskStatus,
    },

    /// The task status does not allow stopping.
    #[error("task {task_id} cannot be stopped while {status}")]
    NotStoppable {
        /// The task.
        task_id: TaskId,
        /// Its current status.
        status: TaskStatus,
    },
}

/// Errors returned synchronously by orchestrator operations.
#[derive(Debug, Clone, Error)]
pub enum OrchestratorError {
    /// The request was invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The owner exhausted their quota.
    #[error("rate limit exceeded: {remaining} of {total} requests remaining, resets at {reset_at}")]
    RateLimitExceeded {
        /// Requests left in the window.
        remaining: u32,
        /// Window quota.
        total: u32,
        /// Window reset time.
        reset_at: DateTime<Utc>,
    },

    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The rate limiter could not be consulted.
    #[error(transparent)]
    RateLimiter(#[from] RateLimiterError),

    /// The task store failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

impl From<TaskDomainError> for OrchestratorError {
    fn from(err: TaskDomainError) -> Self {
        Self::Validation(ValidationError::Domain(err))
    }
}

impl OrchestratorError {
    /// Returns `true` for request validation failures.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Failure that ends a run with status `error`.
///
/// The display text is written to the task's `error` field.
#[derive(Debug, Clone, Error)]
pub enum RunFailure {
    /// Provisioning failed fatally.
    #[error(transparent)]
    Provisioning(#[from] ProvisionError),

    /// The agent failed; its message is kept verbatim.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Git could not commit or push.
    #[error(transparent)]
    Publish(#[from] PushError),

    /// The remote rejected the push.
    #[error("failed to push changes to branch {0}")]
    PushRejected(BranchName),

    /// The run exceeded its wall-clock budget.
    #[error("Task timed out after {minutes} minute(s)")]
    Timeout {
        /// Configured budget.
        minutes: u32,
    },

    /// The task store failed mid-run.
    #[error("task store failure: {0}")]
    Store(#[from] TaskStoreError),

    /// The run panicked.
    #[error("run aborted unexpectedly: {0}")]
    Panicked(String),
}
