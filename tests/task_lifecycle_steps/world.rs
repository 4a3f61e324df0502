//! Shared world state for task lifecycle BDD scenarios.

use std::sync::Arc;
use std::time::Duration;

use atelier::agent::{
    adapters::{ScriptedAgentRuntime, scripted::ScriptedBehaviour},
    domain::{AgentOutput, AgentSessionId},
};
use atelier::orchestrator::{
    OrchestratorPorts, OrchestratorSettings, TaskJob, TaskLifecycleOrchestrator,
};
use atelier::sandbox::{adapters::memory::InMemorySandboxService, services::SandboxRegistry};
use atelier::task::{
    adapters::memory::{InMemoryRateLimiter, InMemoryTaskStore},
    domain::{Task, TaskId},
    ports::TaskStore,
};
use atelier::vcs::{
    adapters::memory::{RecordingGitPublisher, StaticRepositoryInspector},
    domain::RepoManifest,
    services::CommitMessageResolver,
};
use eyre::eyre;
use mockable::DefaultClock;
use rstest::fixture;

/// Scenario world for lifecycle behaviour tests.
pub struct LifecycleWorld {
    pub repo_url: String,
    pub keep_alive: bool,
    pub agent: ScriptedAgentRuntime,
    pub publisher: RecordingGitPublisher,
    pub sandboxes: InMemorySandboxService,
    pub store: Arc<InMemoryTaskStore>,
    pub orchestrator: Option<TaskLifecycleOrchestrator<DefaultClock>>,
    pub task_id: Option<TaskId>,
    pub job: Option<TaskJob>,
}

impl LifecycleWorld {
    /// Creates a world with a succeeding agent and publisher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            repo_url: String::new(),
            keep_alive: false,
            agent: ScriptedAgentRuntime::succeeding("Done"),
            publisher: RecordingGitPublisher::succeeding(),
            sandboxes: InMemorySandboxService::new(),
            store: Arc::new(InMemoryTaskStore::new()),
            orchestrator: None,
            task_id: None,
            job: None,
        }
    }

    /// Returns the orchestrator, wiring it on first use.
    pub fn orchestrator(&mut self) -> &TaskLifecycleOrchestrator<DefaultClock> {
        let orchestrator = self.orchestrator.take().unwrap_or_else(|| self.wire());
        self.orchestrator.insert(orchestrator)
    }

    fn wire(&self) -> TaskLifecycleOrchestrator<DefaultClock> {
        let clock = Arc::new(DefaultClock);
        let ports = OrchestratorPorts {
            store: self.store.clone(),
            sandboxes: Arc::new(self.sandboxes.clone()),
            inspector: Arc::new(StaticRepositoryInspector::new(RepoManifest::new())),
            agent: Arc::new(self.agent.clone()),
            publisher: Arc::new(self.publisher.clone()),
            commit_messages: CommitMessageResolver::new(None),
            rate_limiter: Arc::new(InMemoryRateLimiter::new(100, Arc::clone(&clock))),
            branch_names: None,
            progress: None,
            registry: SandboxRegistry::new(),
        };
        let settings = OrchestratorSettings {
            branch_name_wait: Duration::ZERO,
            ..OrchestratorSettings::default()
        };
        TaskLifecycleOrchestrator::new(ports, settings, clock)
    }

    /// Returns the task created by the scenario.
    pub fn task_id(&self) -> eyre::Result<TaskId> {
        self.task_id
            .ok_or_else(|| eyre!("missing created task in scenario world"))
    }

    /// Loads the scenario task from the store.
    pub fn task(&self) -> eyre::Result<Task> {
        let task_id = self.task_id()?;
        run_async(self.store.get(task_id))?
            .ok_or_else(|| eyre!("task {task_id} missing from store"))
    }
}

impl Default for LifecycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> LifecycleWorld {
    LifecycleWorld::default()
}

/// Agent that succeeds and reports a resumable session.
///
/// # Errors
///
/// Returns an error when the session identifier is rejected.
pub fn session_agent() -> eyre::Result<ScriptedAgentRuntime> {
    Ok(ScriptedAgentRuntime::new(ScriptedBehaviour::Succeed(
        AgentOutput {
            response: Some("Done".to_owned()),
            session_id: Some(AgentSessionId::new("sess-bdd")?),
        },
    )))
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
