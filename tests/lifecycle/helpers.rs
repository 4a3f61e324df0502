//! Shared wiring for orchestrator integration tests.

use atelier::agent::{
    adapters::{ScriptedAgentRuntime, scripted::ScriptedBehaviour},
    domain::{AgentOutput, AgentSessionId},
};
use atelier::orchestrator::{OrchestratorPorts, OrchestratorSettings, TaskLifecycleOrchestrator};
use atelier::sandbox::{adapters::memory::InMemorySandboxService, services::SandboxRegistry};
use atelier::task::{
    adapters::{
        memory::{InMemoryRateLimiter, InMemoryTaskStore},
        sink::StoreProgressSink,
    },
    domain::{Progress, Task, TaskId, TaskLogEntry, TaskUpdate},
    ports::{ProgressSink, TaskStore, TaskStoreResult},
};
use atelier::vcs::{
    adapters::memory::{RecordingGitPublisher, StaticBranchNameGenerator, StaticRepositoryInspector},
    domain::RepoManifest,
    ports::BranchNameGenerator,
    services::CommitMessageResolver,
};
use async_trait::async_trait;
use chrono::Utc;
use eyre::OptionExt;
use mockable::DefaultClock;
use std::sync::Arc;
use std::time::Duration;

/// Repository used by every scenario.
pub const REPO_URL: &str = "https://github.com/acme/storefront";

/// Owner used by every scenario.
pub const OWNER: &str = "user-42";

/// Orchestrator wired to in-memory collaborators that tests can inspect.
pub struct Harness {
    pub store: Arc<InMemoryTaskStore>,
    pub sandboxes: InMemorySandboxService,
    pub agent: ScriptedAgentRuntime,
    pub publisher: RecordingGitPublisher,
    pub orchestrator: TaskLifecycleOrchestrator<DefaultClock>,
}

/// Builder for [`Harness`].
pub struct HarnessBuilder {
    agent: ScriptedAgentRuntime,
    publisher: RecordingGitPublisher,
    sandboxes: InMemorySandboxService,
    quota: u32,
    branch_names: Option<StaticBranchNameGenerator>,
    branch_name_wait: Duration,
    stop_at: Option<u8>,
}

impl HarnessBuilder {
    pub fn agent(mut self, agent: ScriptedAgentRuntime) -> Self {
        self.agent = agent;
        self
    }

    pub fn publisher(mut self, publisher: RecordingGitPublisher) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn sandboxes(mut self, sandboxes: InMemorySandboxService) -> Self {
        self.sandboxes = sandboxes;
        self
    }

    pub const fn quota(mut self, quota: u32) -> Self {
        self.quota = quota;
        self
    }

    pub fn branch_names(mut self, generator: StaticBranchNameGenerator) -> Self {
        self.branch_names = Some(generator);
        self
    }

    pub const fn branch_name_wait(mut self, wait: Duration) -> Self {
        self.branch_name_wait = wait;
        self
    }

    /// Requests a stop once the run reports `threshold` percent.
    pub const fn stop_at_progress(mut self, threshold: u8) -> Self {
        self.stop_at = Some(threshold);
        self
    }

    pub fn build(self) -> Harness {
        let store = Arc::new(InMemoryTaskStore::new());
        let clock = Arc::new(DefaultClock);
        let progress = self.stop_at.map(|threshold| {
            Arc::new(StopAtProgress {
                inner: StoreProgressSink::new(store.clone(), Arc::clone(&clock)),
                store: Arc::clone(&store),
                threshold,
            }) as Arc<dyn ProgressSink>
        });
        let branch_names = self
            .branch_names
            .map(|generator| Arc::new(generator) as Arc<dyn BranchNameGenerator>);
        let ports = OrchestratorPorts {
            store: store.clone(),
            sandboxes: Arc::new(self.sandboxes.clone()),
            inspector: Arc::new(StaticRepositoryInspector::new(RepoManifest::new())),
            agent: Arc::new(self.agent.clone()),
            publisher: Arc::new(self.publisher.clone()),
            commit_messages: CommitMessageResolver::new(None),
            rate_limiter: Arc::new(InMemoryRateLimiter::new(self.quota, Arc::clone(&clock))),
            branch_names,
            progress,
            registry: SandboxRegistry::new(),
        };
        let settings = OrchestratorSettings {
            branch_name_wait: self.branch_name_wait,
            ..OrchestratorSettings::default()
        };

        Harness {
            store,
            sandboxes: self.sandboxes,
            agent: self.agent,
            publisher: self.publisher,
            orchestrator: TaskLifecycleOrchestrator::new(ports, settings, clock),
        }
    }
}

impl Harness {
    /// Starts a builder with a succeeding agent and publisher.
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            agent: ScriptedAgentRuntime::succeeding("Added the endpoint"),
            publisher: RecordingGitPublisher::succeeding(),
            sandboxes: InMemorySandboxService::new(),
            quota: 10,
            branch_names: None,
            branch_name_wait: Duration::ZERO,
            stop_at: None,
        }
    }

    /// Loads the current record of `task_id`.
    pub async fn task(&self, task_id: TaskId) -> eyre::Result<Task> {
        self.store.get(task_id).await?.ok_or_eyre("task missing from store")
    }
}

/// Agent that succeeds and reports a resumable session.
pub fn agent_with_session(session: &str) -> eyre::Result<ScriptedAgentRuntime> {
    Ok(ScriptedAgentRuntime::new(ScriptedBehaviour::Succeed(
        AgentOutput {
            response: Some("Done".to_owned()),
            session_id: Some(AgentSessionId::new(session)?),
        },
    )))
}

/// Persists progress, then marks the task stopped once `threshold` is
/// reported, as a user clicking stop mid-provisioning would.
struct StopAtProgress {
    inner: StoreProgressSink<DefaultClock>,
    store: Arc<InMemoryTaskStore>,
    threshold: u8,
}

#[async_trait]
impl ProgressSink for StopAtProgress {
    async fn log(&self, task_id: TaskId, entry: TaskLogEntry) -> TaskStoreResult<()> {
        self.inner.log(task_id, entry).await
    }

    async fn progress(
        &self,
        task_id: TaskId,
        progress: Progress,
        message: &str,
    ) -> TaskStoreResult<()> {
        self.inner.progress(task_id, progress, message).await?;
        if progress.value() == self.threshold {
            self.store
                .update(task_id, TaskUpdate::stopped(Utc::now()))
                .await?;
        }
        Ok(())
    }
}
