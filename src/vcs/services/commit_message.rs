//! Commit message resolution with a deterministic fallback.

use crate::vcs::{
    domain::{CommitContext, fallback_commit_message},
    ports::{CommitMessageError, CommitMessageGenerator},
};
use std::sync::Arc;

/// Resolves the commit message for a publish.
///
/// Tries the configured generator first and falls back to a message derived
/// from the prompt on any failure. Resolution itself never fails.
#[derive(Clone)]
pub struct CommitMessageResolver {
    generator: Option<Arc<dyn CommitMessageGenerator>>,
}

impl CommitMessageResolver {
    /// Creates a resolver; `None` means only the fallback is used.
    #[must_use]
    pub fn new(generator: Option<Arc<dyn CommitMessageGenerator>>) -> Self {
        Self { generator }
    }

    /// Returns a non-empty commit message for `context`.
    pub async fn resolve(&self, context: &CommitContext) -> String {
        match self.generate(context).await {
            Ok(message) => message,
            Err(err) => {
                tracing::debug!(error = %err, "using fallback commit message");
                fallback_commit_message(&context.prompt)
            }
        }
    }

    async fn generate(&self, context: &CommitContext) -> Result<String, CommitMessageError> {
        let generator = self
            .generator
            .as_ref()
            .ok_or(CommitMessageError::NotConfigured)?;
        let message = generator.generate_commit_message(context).await?;
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Err(CommitMessageError::Empty);
        }
        Ok(trimmed.to_owned())
    }
}
