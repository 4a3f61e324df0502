//! Store port for task records, transcripts, and per-task logs.

use crate::task::domain::{
    BranchName, MessageOrder, Task, TaskDomainError, TaskId, TaskLogEntry, TaskMessage, TaskUpdate,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Task persistence contract.
///
/// The store is the authority for task state. Writes are partial patches
/// applied against the current record so that concurrent writers do not
/// clobber each other.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when the task ID already
    /// exists.
    async fn create(&self, task: &Task) -> TaskStoreResult<()>;

    /// Loads a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn get(&self, id: TaskId) -> TaskStoreResult<Option<Task>>;

    /// Applies a partial update and returns the resulting record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist and
    /// [`TaskStoreError::Domain`] when the patch violates the status machine.
    async fn update(&self, id: TaskId, update: TaskUpdate) -> TaskStoreResult<Task>;

    /// Records `candidate` as the branch name unless one is already set.
    ///
    /// Returns the branch name that is persisted after the call; `at` stamps
    /// the record when the candidate wins.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    async fn claim_branch_name(
        &self,
        id: TaskId,
        candidate: BranchName,
        at: DateTime<Utc>,
    ) -> TaskStoreResult<BranchName>;

    /// Appends a user-visible log entry.
    async fn append_log(&self, id: TaskId, entry: TaskLogEntry) -> TaskStoreResult<()>;

    /// Returns log entries in insertion order.
    async fn list_logs(&self, id: TaskId) -> TaskStoreResult<Vec<TaskLogEntry>>;

    /// Appends a transcript entry.
    async fn insert_message(&self, message: &TaskMessage) -> TaskStoreResult<()>;

    /// Returns up to `limit` transcript entries in the requested order.
    async fn list_messages(
        &self,
        id: TaskId,
        order: MessageOrder,
        limit: Option<usize>,
    ) -> TaskStoreResult<Vec<TaskMessage>>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The update was rejected by the task domain.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
