//! Domain model for task lifecycle management.
//!
//! Tasks, their status machine, transcript and log entries, and the partial
//! updates the orchestrator applies while driving a run. All infrastructure
//! concerns stay outside of the domain boundary.

mod branch;
mod error;
mod ids;
mod log;
mod message;
mod status;
mod task;
mod update;

pub use branch::BranchName;
pub use error::{ParseTaskStatusError, ParseTaskValueError, TaskDomainError};
pub use ids::{MaxDuration, Progress, RepositoryUrl, TaskId, UserId};
pub use log::{LogLevel, TaskLogEntry};
pub use message::{MessageOrder, MessageRole, TaskMessage};
pub use status::TaskStatus;
pub use task::{NewTask, PersistedTaskData, Task, derive_title};
pub use update::{SandboxBinding, TaskUpdate};
