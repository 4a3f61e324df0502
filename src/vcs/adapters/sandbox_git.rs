//! Publishes by running git inside the sandbox.

use crate::sandbox::{domain::SandboxCommand, ports::SandboxHandle};
use crate::task::{domain::BranchName, services::ProgressLogger};
use crate::vcs::ports::{GitPublisher, PushError, PushOutcome};
use async_trait::async_trait;

/// Runs `git add`, `git commit` and `git push` in the sandbox working tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct SandboxGitPublisher;

impl SandboxGitPublisher {
    /// Creates the publisher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn git() -> SandboxCommand {
    SandboxCommand::new("git")
}

#[async_trait]
impl GitPublisher for SandboxGitPublisher {
    async fn push(
        &self,
        handle: &dyn SandboxHandle,
        branch: &BranchName,
        message: &str,
        logger: &ProgressLogger,
    ) -> Result<PushOutcome, PushError> {
        let add = handle.run_command(&git().args(["add", "-A"])).await?;
        if !add.succeeded() {
            return Err(PushError::Commit(add.diagnostic().to_owned()));
        }

        let status = handle
            .run_command(&git().args(["status", "--porcelain"]))
            .await?;
        if status.succeeded() && status.stdout.trim().is_empty() {
            logger.info("No changes to commit").await;
            return Ok(PushOutcome::nothing_to_commit());
        }

        logger.command(format!("git commit -m \"{message}\"")).await;
        let commit = handle
            .run_command(&git().args(["commit", "-m", message]))
            .await?;
        if !commit.succeeded() {
            return Err(PushError::Commit(commit.diagnostic().to_owned()));
        }

        logger.command(format!("git push origin {branch}")).await;
        let push = handle
            .run_command(&git().args(["push", "origin", branch.as_str()]))
            .await?;
        if push.succeeded() {
            logger
                .success(format!("Changes pushed to branch {branch}"))
                .await;
            return Ok(PushOutcome::pushed());
        }

        logger
            .error(format!("Failed to push branch {branch}: {}", push.diagnostic()))
            .await;
        Ok(PushOutcome::rejected())
    }
}
