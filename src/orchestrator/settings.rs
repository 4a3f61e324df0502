//! Orchestrator wiring: collaborators and tunables.

use crate::agent::ports::AgentRuntime;
use crate::sandbox::{
    ports::SandboxService,
    services::{ProvisionerSettings, SandboxRegistry},
};
use crate::task::{
    domain::MaxDuration,
    ports::{ProgressSink, RateLimiter, TaskStore},
};
use crate::vcs::{
    ports::{BranchNameGenerator, GitPublisher, RepositoryInspector},
    services::CommitMessageResolver,
};
use std::sync::Arc;
use std::time::Duration;

/// Collaborators consumed by the orchestrator.
#[derive(Clone)]
pub struct OrchestratorPorts {
    /// Task record store.
    pub store: Arc<dyn TaskStore>,
    /// Sandbox provisioning service.
    pub sandboxes: Arc<dyn SandboxService>,
    /// Repository metadata for sandbox planning.
    pub inspector: Arc<dyn RepositoryInspector>,
    /// Coding agent runtime.
    pub agent: Arc<dyn AgentRuntime>,
    /// Git publisher.
    pub publisher: Arc<dyn GitPublisher>,
    /// Commit message resolution.
    pub commit_messages: CommitMessageResolver,
    /// Per-user quota.
    pub rate_limiter: Arc<dyn RateLimiter>,
    /// Optional AI branch name generation.
    pub branch_names: Option<Arc<dyn BranchNameGenerator>>,
    /// Progress observer; progress is written to the store when absent.
    pub progress: Option<Arc<dyn ProgressSink>>,
    /// Live sandboxes of this process.
    pub registry: SandboxRegistry,
}

/// Orchestrator tunables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// How long a run waits for a generated branch name.
    pub branch_name_wait: Duration,
    /// Poll interval while waiting for a branch name.
    pub branch_name_poll: Duration,
    /// Lead time of the timeout warning.
    pub timeout_warning_lead: Duration,
    /// Transcript entries fed back into follow-up prompts.
    pub history_limit: usize,
    /// Run budget for requests that do not set one.
    pub default_max_duration: MaxDuration,
    /// Sandbox provisioning settings.
    pub provisioner: ProvisionerSettings,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            branch_name_wait: Duration::from_secs(10),
            branch_name_poll: Duration::from_millis(500),
            timeout_warning_lead: Duration::from_secs(60),
            history_limit: 5,
            default_max_duration: MaxDuration::DEFAULT,
            provisioner: ProvisionerSettings::default(),
        }
    }
}
