//! Per-run cancellation context.

use crate::sandbox::ports::CancellationCheck;
use crate::task::{
    domain::{TaskId, TaskStatus},
    ports::TaskStore,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Cancellation state of one run.
///
/// The task store is the authority: a `stopped` status written by any
/// process is observed when a checkpoint polls the store, and the
/// observation is latched in a [`CancellationToken`].
#[derive(Clone)]
pub struct RunContext {
    task_id: TaskId,
    store: Arc<dyn TaskStore>,
    token: CancellationToken,
}

impl RunContext {
    /// Creates a context for `task_id`.
    #[must_use]
    pub fn new(task_id: TaskId, store: Arc<dyn TaskStore>) -> Self {
        Self {
            task_id,
            store,
            token: CancellationToken::new(),
        }
    }

    /// Returns the task this run drives.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the latched cancellation token.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Polls the store and reports whether the run has been stopped.
    ///
    /// Store failures are traced and treated as "not cancelled".
    pub async fn checkpoint(&self) -> bool {
        if self.token.is_cancelled() {
            return true;
        }
        match self.store.get(self.task_id).await {
            Ok(Some(task)) if task.status() == TaskStatus::Stopped => {
                tracing::info!(task_id = %self.task_id, "cancellation observed");
                self.token.cancel();
                true
            }
            Ok(_) => false,
            Err(err) => {
                tracing::warn!(task_id = %self.task_id, error = %err, "cancellation check failed");
                false
            }
        }
    }
}

#[async_trait]
impl CancellationCheck for RunContext {
    async fn is_cancelled(&self) -> bool {
        self.checkpoint().await
    }
}
