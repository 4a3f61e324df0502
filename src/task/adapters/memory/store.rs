//! In-memory task store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{
        BranchName, MessageOrder, Task, TaskId, TaskLogEntry, TaskMessage, TaskUpdate,
    },
    ports::{TaskStore, TaskStoreError, TaskStoreResult},
};

/// Thread-safe in-memory task store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    logs: HashMap<TaskId, Vec<TaskLogEntry>>,
    messages: HashMap<TaskId, Vec<TaskMessage>>,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskStoreResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state
            .read()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> TaskStoreResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state
            .write()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, task: &Task) -> TaskStoreResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskStoreError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn get(&self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn update(&self, id: TaskId, update: TaskUpdate) -> TaskStoreResult<Task> {
        let mut state = self.write()?;
        let current = state.tasks.get(&id).ok_or(TaskStoreError::NotFound(id))?;
        let mut next = current.clone();
        next.apply(update)?;
        state.tasks.insert(id, next.clone());
        Ok(next)
    }

    async fn claim_branch_name(
        &self,
        id: TaskId,
        candidate: BranchName,
        at: DateTime<Utc>,
    ) -> TaskStoreResult<BranchName> {
        let mut state = self.write()?;
        let task = state.tasks.get_mut(&id).ok_or(TaskStoreError::NotFound(id))?;
        Ok(task.claim_branch_name(candidate, at))
    }

    async fn append_log(&self, id: TaskId, entry: TaskLogEntry) -> TaskStoreResult<()> {
        let mut state = self.write()?;
        if !state.tasks.contains_key(&id) {
            return Err(TaskStoreError::NotFound(id));
        }
        state.logs.entry(id).or_default().push(entry);
        Ok(())
    }

    async fn list_logs(&self, id: TaskId) -> TaskStoreResult<Vec<TaskLogEntry>> {
        let state = self.read()?;
        Ok(state.logs.get(&id).cloned().unwrap_or_default())
    }

    async fn insert_message(&self, message: &TaskMessage) -> TaskStoreResult<()> {
        let mut state = self.write()?;
        let id = message.task_id();
        if !state.tasks.contains_key(&id) {
            return Err(TaskStoreError::NotFound(id));
        }
        state.messages.entry(id).or_default().push(message.clone());
        Ok(())
    }

    async fn list_messages(
        &self,
        id: TaskId,
        order: MessageOrder,
        limit: Option<usize>,
    ) -> TaskStoreResult<Vec<TaskMessage>> {
        let state = self.read()?;
        let mut messages = state.messages.get(&id).cloned().unwrap_or_default();
        if order == MessageOrder::Descending {
            messages.reverse();
        }
        if let Some(max) = limit {
            messages.truncate(max);
        }
        Ok(messages)
    }
}
