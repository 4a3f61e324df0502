//! Terminal status recording and sandbox disposal.

use super::{RunFailure, run::Finish, service::Engine};
use crate::task::{
    domain::{Task, TaskId, TaskStatus, TaskUpdate},
    services::ProgressLogger,
};
use mockable::Clock;

impl<C: Clock + Send + Sync + 'static> Engine<C> {
    /// Records the outcome of a run, then disposes of its sandbox.
    ///
    /// A stopped run writes no status: the stop itself already did.
    pub(super) async fn settle(
        &self,
        task_id: TaskId,
        result: Result<Finish, RunFailure>,
        logger: &ProgressLogger,
    ) -> TaskStatus {
        let (status, update) = match result {
            Ok(Finish::Completed) => {
                logger.success("Task completed successfully").await;
                (
                    TaskStatus::Completed,
                    Some(TaskUpdate::completed(self.clock.utc())),
                )
            }
            Ok(Finish::Stopped) => {
                logger.info("Task stopped").await;
                (TaskStatus::Stopped, None)
            }
            Err(failure) => {
                let message = failure.to_string();
                tracing::warn!(error = %message, "run failed");
                logger.error(message.as_str()).await;
                (
                    TaskStatus::Error,
                    Some(TaskUpdate::failed(self.clock.utc(), message)),
                )
            }
        };

        if let Some(terminal) = update {
            if let Err(err) = self.ports.store.update(task_id, terminal).await {
                tracing::error!(error = %err, status = %status, "failed to record run outcome");
            }
        }
        self.dispose(task_id, logger).await;
        status
    }

    /// Shuts down the task's live sandbox unless it is kept alive.
    ///
    /// Only the caller that removes the handle from the registry shuts it
    /// down, so each sandbox is shut down at most once. Failures are logged.
    pub(super) async fn dispose(&self, task_id: TaskId, logger: &ProgressLogger) {
        let registry = &self.ports.registry;
        let Some(live) = registry.lookup(task_id) else {
            return;
        };

        let task = self.ports.store.get(task_id).await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "could not read task before disposal");
            None
        });
        let bound = task
            .as_ref()
            .and_then(Task::sandbox_id)
            .is_some_and(|id| id == live.id());
        if bound && task.as_ref().is_some_and(Task::keep_alive) {
            logger
                .info(format!("Keeping sandbox {} alive for follow-ups", live.id()))
                .await;
            return;
        }

        let Some(handle) = registry.unregister(task_id) else {
            return;
        };
        match handle.shutdown().await {
            Ok(()) => {
                tracing::info!(sandbox_id = %handle.id(), "sandbox shut down");
                logger.info("Sandbox shut down").await;
            }
            Err(err) => {
                tracing::warn!(sandbox_id = %handle.id(), error = %err, "sandbox shutdown failed");
                logger
                    .info(format!("Sandbox shutdown failed: {err}"))
                    .await;
            }
        }

        if bound {
            let cleared = TaskUpdate::at(self.clock.utc()).clear_sandbox();
            if let Err(err) = self.ports.store.update(task_id, cleared).await {
                tracing::warn!(error = %err, "failed to clear sandbox fields");
            }
        }
    }
}
