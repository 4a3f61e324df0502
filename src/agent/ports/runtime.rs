//! Agent runtime port.

use crate::agent::domain::{AgentOutput, AgentRequest};
use crate::sandbox::ports::{SandboxError, SandboxHandle};
use crate::task::services::ProgressLogger;
use async_trait::async_trait;
use thiserror::Error;

/// Runs a coding agent inside a sandbox.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Executes `request` against the sandbox working tree.
    ///
    /// Intermediate output is written to `logger` as it is produced.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when the agent fails or cannot be started. The
    /// error text is surfaced verbatim on the task.
    async fn execute(
        &self,
        handle: &dyn SandboxHandle,
        request: &AgentRequest,
        logger: &ProgressLogger,
    ) -> Result<AgentOutput, AgentError>;
}

/// Agent execution failures.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    /// The agent ran and reported failure.
    #[error("{0}")]
    Failed(String),

    /// The sandbox could not run the agent.
    #[error("agent could not run: {0}")]
    Sandbox(#[from] SandboxError),
}
