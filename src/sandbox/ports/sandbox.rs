//! Port contracts for the external sandbox provisioning service.

use crate::sandbox::domain::{CommandOutput, SandboxCommand, SandboxCreateRequest, SandboxId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Result type for sandbox operations.
pub type SandboxResult<T> = Result<T, SandboxError>;

/// Handle to one live sandbox.
#[async_trait]
pub trait SandboxHandle: Send + Sync {
    /// Returns the provider-issued identifier.
    fn id(&self) -> &SandboxId;

    /// Runs a command to completion and captures its output.
    ///
    /// A non-zero exit code is reported through [`CommandOutput`], not as an
    /// error; errors mean the command could not be run at all.
    async fn run_command(&self, command: &SandboxCommand) -> SandboxResult<CommandOutput>;

    /// Runs a command to completion, sending each stdout line to `lines`
    /// as it is produced.
    ///
    /// The provided implementation forwards the captured stdout once the
    /// command exits; adapters with a live output stream override it.
    /// Lines are dropped silently once the receiver is gone.
    async fn run_streaming(
        &self,
        command: &SandboxCommand,
        lines: mpsc::UnboundedSender<String>,
    ) -> SandboxResult<CommandOutput> {
        let output = self.run_command(command).await?;
        for line in output.stdout.lines() {
            if lines.send(line.to_owned()).is_err() {
                break;
            }
        }
        drop(lines);
        Ok(output)
    }

    /// Launches a command in the background without waiting for it.
    async fn spawn_detached(&self, command: &SandboxCommand) -> SandboxResult<()>;

    /// Reads a file relative to the working tree; `None` when it is absent.
    async fn read_file(&self, path: &str) -> SandboxResult<Option<String>>;

    /// Writes a file, creating parent directories as needed.
    async fn write_file(&self, path: &str, contents: &str) -> SandboxResult<()>;

    /// Returns the public URL routed to `port`.
    async fn domain(&self, port: u16) -> SandboxResult<String>;

    /// Stops the sandbox and releases its resources.
    async fn shutdown(&self) -> SandboxResult<()>;
}

/// Sandbox provisioning service.
#[async_trait]
pub trait SandboxService: Send + Sync {
    /// Creates a sandbox and clones the requested source into it.
    async fn create(&self, request: &SandboxCreateRequest)
    -> SandboxResult<Arc<dyn SandboxHandle>>;

    /// Reconnects to an existing sandbox.
    ///
    /// Fails with [`SandboxError::NotFound`] or [`SandboxError::Unavailable`]
    /// when the sandbox has expired or been stopped.
    async fn get(&self, id: &SandboxId) -> SandboxResult<Arc<dyn SandboxHandle>>;
}

/// Errors returned by sandbox adapters.
#[derive(Debug, Clone, Error)]
pub enum SandboxError {
    /// No sandbox exists with the identifier.
    #[error("sandbox {0} not found")]
    NotFound(SandboxId),

    /// The sandbox exists but is stopped or expired.
    #[error("sandbox {0} is no longer available")]
    Unavailable(SandboxId),

    /// Creating the sandbox failed.
    #[error("sandbox creation failed: {0}")]
    Creation(String),

    /// Generic runtime failure.
    #[error("sandbox runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl SandboxError {
    /// Wraps a runtime error from the sandbox adapter.
    #[must_use]
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
