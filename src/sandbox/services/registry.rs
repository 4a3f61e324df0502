//! Process-local table of live sandboxes keyed by task.

use crate::sandbox::ports::SandboxHandle;
use crate::task::domain::TaskId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Live sandbox handles owned by this process.
///
/// Entries are added when a sandbox is created or reconnected and removed
/// when it is shut down. Removal hands the handle to exactly one caller.
#[derive(Clone, Default)]
pub struct SandboxRegistry {
    entries: Arc<RwLock<HashMap<TaskId, Arc<dyn SandboxHandle>>>>,
}

impl SandboxRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `handle` as the live sandbox of `task_id`, returning any
    /// handle it replaces.
    #[must_use = "a replaced sandbox is still running"]
    pub fn register(
        &self,
        task_id: TaskId,
        handle: Arc<dyn SandboxHandle>,
    ) -> Option<Arc<dyn SandboxHandle>> {
        match self.entries.write() {
            Ok(mut entries) => entries.insert(task_id, handle),
            Err(poisoned) => poisoned.into_inner().insert(task_id, handle),
        }
    }

    /// Removes and returns the live sandbox of `task_id`.
    #[must_use = "the removed sandbox is still running"]
    pub fn unregister(&self, task_id: TaskId) -> Option<Arc<dyn SandboxHandle>> {
        match self.entries.write() {
            Ok(mut entries) => entries.remove(&task_id),
            Err(poisoned) => poisoned.into_inner().remove(&task_id),
        }
    }

    /// Returns the live sandbox of `task_id` without removing it.
    #[must_use]
    pub fn lookup(&self, task_id: TaskId) -> Option<Arc<dyn SandboxHandle>> {
        match self.entries.read() {
            Ok(entries) => entries.get(&task_id).cloned(),
            Err(poisoned) => poisoned.into_inner().get(&task_id).cloned(),
        }
    }

    /// Returns the number of live sandboxes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(entries) => entries.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Returns `true` when no sandbox is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
