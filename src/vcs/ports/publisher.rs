//! Publishing the sandbox working tree.

use crate::sandbox::ports::{SandboxError, SandboxHandle};
use crate::task::domain::BranchName;
use crate::task::services::ProgressLogger;
use async_trait::async_trait;
use thiserror::Error;

/// Result of a publish attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PushOutcome {
    /// `true` when changes existed but could not be pushed.
    pub push_failed: bool,
    /// `true` when a commit was created.
    pub committed: bool,
}

impl PushOutcome {
    /// Nothing to commit; not a failure.
    #[must_use]
    pub const fn nothing_to_commit() -> Self {
        Self {
            push_failed: false,
            committed: false,
        }
    }

    /// Commit created and pushed.
    #[must_use]
    pub const fn pushed() -> Self {
        Self {
            push_failed: false,
            committed: true,
        }
    }

    /// Commit created but the push was rejected.
    #[must_use]
    pub const fn rejected() -> Self {
        Self {
            push_failed: true,
            committed: true,
        }
    }
}

/// Commits and pushes the sandbox working tree to a branch.
#[async_trait]
pub trait GitPublisher: Send + Sync {
    /// Commits all changes with `message` and pushes to `branch`.
    ///
    /// # Errors
    ///
    /// Returns [`PushError`] when the sandbox could not run the git commands
    /// at all. A rejected push is reported through [`PushOutcome`].
    async fn push(
        &self,
        handle: &dyn SandboxHandle,
        branch: &BranchName,
        message: &str,
        logger: &ProgressLogger,
    ) -> Result<PushOutcome, PushError>;
}

/// Failures running git inside the sandbox.
#[derive(Debug, Clone, Error)]
pub enum PushError {
    /// The sandbox failed while running a git command.
    #[error("git command failed to run: {0}")]
    Sandbox(#[from] SandboxError),

    /// Staging or committing failed.
    #[error("git commit failed: {0}")]
    Commit(String),
}
