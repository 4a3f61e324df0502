//! Asynchronous branch name generation.

use crate::task::domain::{BranchName, Task};
use async_trait::async_trait;

/// Suggests a descriptive branch name for a task.
///
/// Generation runs concurrently with provisioning; the suggestion only
/// takes effect if it is persisted before any other name.
#[async_trait]
pub trait BranchNameGenerator: Send + Sync {
    /// Returns a suggested branch name, or `None` when generation fails.
    async fn suggest(&self, task: &Task) -> Option<BranchName>;
}
