//! Progress sink that persists through the task store.

use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;

use crate::task::{
    domain::{Progress, TaskId, TaskLogEntry, TaskUpdate},
    ports::{ProgressSink, TaskStore, TaskStoreResult},
};

/// Writes log entries and progress updates to a [`TaskStore`].
#[derive(Clone)]
pub struct StoreProgressSink<C: Clock + Send + Sync> {
    store: Arc<dyn TaskStore>,
    clock: Arc<C>,
}

impl<C: Clock + Send + Sync> StoreProgressSink<C> {
    /// Creates a sink backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn TaskStore>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }
}

#[async_trait]
impl<C: Clock + Send + Sync> ProgressSink for StoreProgressSink<C> {
    async fn log(&self, task_id: TaskId, entry: TaskLogEntry) -> TaskStoreResult<()> {
        self.store.append_log(task_id, entry).await
    }

    async fn progress(
        &self,
        task_id: TaskId,
        progress: Progress,
        message: &str,
    ) -> TaskStoreResult<()> {
        let update = TaskUpdate::at(self.clock.utc())
            .progress(progress)
            .message(message);
        self.store.update(task_id, update).await.map(|_| ())
    }
}
