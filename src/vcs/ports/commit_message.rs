//! AI commit message generation.

use crate::vcs::domain::CommitContext;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Generates a commit message from task context.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommitMessageGenerator: Send + Sync {
    /// Produces a commit message.
    ///
    /// # Errors
    ///
    /// Returns [`CommitMessageError`] when no message could be generated.
    async fn generate_commit_message(
        &self,
        context: &CommitContext,
    ) -> Result<String, CommitMessageError>;
}

/// Commit message generation failures.
#[derive(Debug, Clone, Error)]
pub enum CommitMessageError {
    /// No generation credential is configured.
    #[error("commit message generation is not configured")]
    NotConfigured,

    /// The generator returned an empty message.
    #[error("commit message generator returned an empty message")]
    Empty,

    /// The generator backend failed.
    #[error("commit message generation failed: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl CommitMessageError {
    /// Wraps a backend error.
    #[must_use]
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
