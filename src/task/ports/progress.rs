//! Observer port receiving run progress.

use crate::task::domain::{Progress, TaskId, TaskLogEntry};
use crate::task::ports::TaskStoreResult;
use async_trait::async_trait;

/// Receives log entries and progress percentages produced during a run.
///
/// Sinks are the single channel through which a run reports what it is
/// doing. Implementations may persist, forward, or drop events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Records a log entry for `task_id`.
    ///
    /// # Errors
    ///
    /// Returns the underlying store error when the entry cannot be recorded.
    async fn log(&self, task_id: TaskId, entry: TaskLogEntry) -> TaskStoreResult<()>;

    /// Records a progress update for `task_id`.
    ///
    /// # Errors
    ///
    /// Returns the underlying store error when the update cannot be recorded.
    async fn progress(
        &self,
        task_id: TaskId,
        progress: Progress,
        message: &str,
    ) -> TaskStoreResult<()>;
}
