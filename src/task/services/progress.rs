//! Per-run progress reporting.

use crate::task::{
    domain::{LogLevel, Progress, TaskId, TaskLogEntry},
    ports::ProgressSink,
};
use mockable::Clock;
use std::sync::Arc;

/// Reports log lines and progress for one task run.
///
/// Reporting never fails the run: a sink error is retried once and then
/// only traced.
#[derive(Clone)]
pub struct ProgressLogger {
    task_id: TaskId,
    sink: Arc<dyn ProgressSink>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl ProgressLogger {
    /// Creates a logger for `task_id` writing to `sink`.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        sink: Arc<dyn ProgressSink>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            task_id,
            sink,
            clock,
        }
    }

    /// Returns the task this logger reports for.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Records an informational line.
    pub async fn info(&self, message: impl Into<String>) {
        self.record(LogLevel::Info, message.into()).await;
    }

    /// Records a command that is about to run.
    pub async fn command(&self, message: impl Into<String>) {
        self.record(LogLevel::Command, message.into()).await;
    }

    /// Records a failure or warning.
    pub async fn error(&self, message: impl Into<String>) {
        self.record(LogLevel::Error, message.into()).await;
    }

    /// Records a successful step.
    pub async fn success(&self, message: impl Into<String>) {
        self.record(LogLevel::Success, message.into()).await;
    }

    /// Records a progress milestone together with its status message.
    pub async fn progress(&self, percent: u8, message: impl Into<String>) {
        let text = message.into();
        let value = Progress::saturating(percent);
        tracing::debug!(task_id = %self.task_id, progress = value.value(), "{text}");

        let first = self.sink.progress(self.task_id, value, &text).await;
        if first.is_ok() {
            return;
        }
        if let Err(err) = self.sink.progress(self.task_id, value, &text).await {
            tracing::warn!(task_id = %self.task_id, error = %err, "failed to record progress");
        }
    }

    async fn record(&self, level: LogLevel, message: String) {
        match level {
            LogLevel::Error => tracing::warn!(task_id = %self.task_id, "{message}"),
            LogLevel::Info | LogLevel::Command | LogLevel::Success => {
                tracing::info!(task_id = %self.task_id, level = level.as_str(), "{message}");
            }
        }

        let entry = TaskLogEntry::new(level, message, self.clock.utc());
        if self.sink.log(self.task_id, entry.clone()).await.is_ok() {
            return;
        }
        if let Err(err) = self.sink.log(self.task_id, entry).await {
            tracing::warn!(task_id = %self.task_id, error = %err, "failed to record task log");
        }
    }
}
