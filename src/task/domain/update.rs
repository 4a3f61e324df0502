//! Partial updates applied to a persisted task.
//!
//! The orchestrator never writes whole task records. Each change is a
//! [`TaskUpdate`] patch applied by the store against the current record, so
//! fields written concurrently by other actors (a `stopped` status from the
//! owner, an AI-generated branch name) survive.

use super::{Progress, TaskStatus};
use crate::agent::domain::AgentSessionId;
use crate::sandbox::domain::SandboxId;
use chrono::{DateTime, Utc};

/// Sandbox columns written together once a sandbox is provisioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxBinding {
    /// Provider-issued sandbox identifier.
    pub sandbox_id: SandboxId,
    /// Public URL of the sandbox.
    pub sandbox_url: Option<String>,
    /// Public URL of the running dev server.
    pub preview_url: Option<String>,
}

/// Patch describing the fields to change on a task.
///
/// `None` leaves a field untouched; nullable fields use `Some(None)` to clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    pub(crate) at: DateTime<Utc>,
    pub(crate) status: Option<TaskStatus>,
    pub(crate) progress: Option<Progress>,
    pub(crate) reset_progress: bool,
    pub(crate) status_message: Option<Option<String>>,
    pub(crate) error: Option<Option<String>>,
    pub(crate) sandbox: Option<Option<SandboxBinding>>,
    pub(crate) agent_session_id: Option<Option<AgentSessionId>>,
    pub(crate) completed_at: Option<Option<DateTime<Utc>>>,
}

impl TaskUpdate {
    /// Creates an empty patch stamped with the time of the change.
    #[must_use]
    pub const fn at(at: DateTime<Utc>) -> Self {
        Self {
            at,
            status: None,
            progress: None,
            reset_progress: false,
            status_message: None,
            error: None,
            sandbox: None,
            agent_session_id: None,
            completed_at: None,
        }
    }

    /// Re-enters `processing` for a follow-up message.
    ///
    /// Progress restarts from zero, `completed_at` and any previous error are
    /// cleared.
    #[must_use]
    pub fn reopen(at: DateTime<Utc>) -> Self {
        let mut update = Self::at(at)
            .status(TaskStatus::Processing)
            .progress(Progress::ZERO)
            .message("Processing follow-up message")
            .clear_error();
        update.reset_progress = true;
        update.completed_at = Some(None);
        update
    }

    /// Marks the run as successfully finished.
    #[must_use]
    pub fn completed(at: DateTime<Utc>) -> Self {
        let mut update = Self::at(at)
            .status(TaskStatus::Completed)
            .progress(Progress::COMPLETE)
            .message("Task completed successfully");
        update.completed_at = Some(Some(at));
        update
    }

    /// Marks the run as failed with `message` as the error.
    #[must_use]
    pub fn failed(at: DateTime<Utc>, message: impl Into<String>) -> Self {
        let text = message.into();
        let mut update = Self::at(at)
            .status(TaskStatus::Error)
            .message(format!("Task failed: {text}"));
        update.error = Some(Some(text));
        update.completed_at = Some(Some(at));
        update
    }

    /// Records a user cancellation.
    #[must_use]
    pub fn stopped(at: DateTime<Utc>) -> Self {
        let mut update = Self::at(at)
            .status(TaskStatus::Stopped)
            .message("Task was stopped by user");
        update.completed_at = Some(Some(at));
        update
    }

    /// Sets the status.
    #[must_use]
    pub const fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the progress; lower values than the current one are ignored
    /// unless the patch re-opens the task.
    #[must_use]
    pub const fn progress(mut self, progress: Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Sets the free-text status message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.status_message = Some(Some(message.into()));
        self
    }

    /// Clears the error message.
    #[must_use]
    pub fn clear_error(mut self) -> Self {
        self.error = Some(None);
        self
    }

    /// Records the provisioned sandbox.
    #[must_use]
    pub fn sandbox(mut self, binding: SandboxBinding) -> Self {
        self.sandbox = Some(Some(binding));
        self
    }

    /// Clears the sandbox columns after disposal.
    #[must_use]
    pub fn clear_sandbox(mut self) -> Self {
        self.sandbox = Some(None);
        self
    }

    /// Records the agent session for later resumption.
    #[must_use]
    pub fn agent_session(mut self, session_id: AgentSessionId) -> Self {
        self.agent_session_id = Some(Some(session_id));
        self
    }

    /// Returns the target status, if the patch changes it.
    #[must_use]
    pub const fn target_status(&self) -> Option<TaskStatus> {
        self.status
    }

    /// Returns the timestamp of the change.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.at
    }
}
