//! In-memory version control adapters for tests and local runs.

use crate::sandbox::ports::SandboxHandle;
use crate::task::{
    domain::{BranchName, RepositoryUrl, Task},
    services::ProgressLogger,
};
use crate::vcs::{
    domain::RepoManifest,
    ports::{
        BranchNameGenerator, GitPublisher, PushError, PushOutcome, RepositoryInspector,
        RepositoryInspectorError,
    },
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// A publish recorded by [`RecordingGitPublisher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPush {
    /// Sandbox the publish ran against.
    pub sandbox_id: String,
    /// Target branch.
    pub branch: String,
    /// Commit message.
    pub message: String,
}

/// Publisher that records pushes and returns a configured outcome.
#[derive(Debug, Clone)]
pub struct RecordingGitPublisher {
    outcome: PushOutcome,
    pushes: Arc<Mutex<Vec<RecordedPush>>>,
}

impl RecordingGitPublisher {
    /// Creates a publisher whose pushes succeed.
    #[must_use]
    pub fn succeeding() -> Self {
        Self::with_outcome(PushOutcome::pushed())
    }

    /// Creates a publisher whose pushes are rejected.
    #[must_use]
    pub fn rejecting() -> Self {
        Self::with_outcome(PushOutcome::rejected())
    }

    /// Creates a publisher returning `outcome` for every push.
    #[must_use]
    pub fn with_outcome(outcome: PushOutcome) -> Self {
        Self {
            outcome,
            pushes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns the recorded pushes.
    #[must_use]
    pub fn pushes(&self) -> Vec<RecordedPush> {
        self.pushes
            .lock()
            .map(|pushes| pushes.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GitPublisher for RecordingGitPublisher {
    async fn push(
        &self,
        handle: &dyn SandboxHandle,
        branch: &BranchName,
        message: &str,
        _logger: &ProgressLogger,
    ) -> Result<PushOutcome, PushError> {
        if let Ok(mut pushes) = self.pushes.lock() {
            pushes.push(RecordedPush {
                sandbox_id: handle.id().as_str().to_owned(),
                branch: branch.as_str().to_owned(),
                message: message.to_owned(),
            });
        }
        Ok(self.outcome)
    }
}

/// Inspector returning a fixed manifest for every repository.
#[derive(Debug, Clone, Default)]
pub struct StaticRepositoryInspector {
    manifest: Option<RepoManifest>,
}

impl StaticRepositoryInspector {
    /// Returns `manifest` for every lookup.
    #[must_use]
    pub const fn new(manifest: RepoManifest) -> Self {
        Self {
            manifest: Some(manifest),
        }
    }

    /// Fails every lookup.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self { manifest: None }
    }
}

#[async_trait]
impl RepositoryInspector for StaticRepositoryInspector {
    async fn fetch_manifest(
        &self,
        repo: &RepositoryUrl,
    ) -> Result<RepoManifest, RepositoryInspectorError> {
        self.manifest.clone().ok_or_else(|| {
            RepositoryInspectorError::new(std::io::Error::other(format!(
                "no manifest available for {repo}"
            )))
        })
    }
}

/// Branch name generator returning a fixed suggestion.
#[derive(Debug, Clone, Default)]
pub struct StaticBranchNameGenerator {
    suggestion: Option<BranchName>,
}

impl StaticBranchNameGenerator {
    /// Suggests `name` for every task.
    #[must_use]
    pub const fn new(name: BranchName) -> Self {
        Self {
            suggestion: Some(name),
        }
    }
}

#[async_trait]
impl BranchNameGenerator for StaticBranchNameGenerator {
    async fn suggest(&self, _task: &Task) -> Option<BranchName> {
        self.suggestion.clone()
    }
}
