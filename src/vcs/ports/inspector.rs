//! Repository metadata lookup performed before a sandbox exists.

use crate::task::domain::RepositoryUrl;
use crate::vcs::domain::RepoManifest;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Reads project manifests from the hosted repository.
#[async_trait]
pub trait RepositoryInspector: Send + Sync {
    /// Fetches the top-level manifests of `repo`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryInspectorError`] when the repository cannot be read.
    async fn fetch_manifest(
        &self,
        repo: &RepositoryUrl,
    ) -> Result<RepoManifest, RepositoryInspectorError>;
}

/// Repository metadata lookup failure.
#[derive(Debug, Clone, Error)]
#[error("failed to inspect repository: {0}")]
pub struct RepositoryInspectorError(pub Arc<dyn std::error::Error + Send + Sync>);

impl RepositoryInspectorError {
    /// Wraps an underlying error.
    #[must_use]
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
