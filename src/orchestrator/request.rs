//! Inputs accepted by the orchestrator.

use crate::agent::domain::{AgentKind, McpConnector, ModelId};
use crate::task::domain::TaskId;

/// Request to start a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    pub(crate) owner_id: String,
    pub(crate) repo_url: String,
    pub(crate) prompt: String,
    pub(crate) agent: AgentKind,
    pub(crate) model: Option<ModelId>,
    pub(crate) max_duration_minutes: Option<u32>,
    pub(crate) keep_alive: bool,
    pub(crate) install_dependencies: bool,
    pub(crate) connectors: Vec<McpConnector>,
}

impl CreateTaskRequest {
    /// Creates a request running the default agent.
    #[must_use]
    pub fn new(
        owner_id: impl Into<String>,
        repo_url: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            repo_url: repo_url.into(),
            prompt: prompt.into(),
            agent: AgentKind::Claude,
            model: None,
            max_duration_minutes: None,
            keep_alive: false,
            install_dependencies: false,
            connectors: Vec::new(),
        }
    }

    /// Selects the agent.
    #[must_use]
    pub const fn with_agent(mut self, agent: AgentKind) -> Self {
        self.agent = agent;
        self
    }

    /// Selects the model.
    #[must_use]
    pub fn with_model(mut self, model: ModelId) -> Self {
        self.model = Some(model);
        self
    }

    /// Overrides the configured run budget.
    #[must_use]
    pub const fn with_max_duration(mut self, minutes: u32) -> Self {
        self.max_duration_minutes = Some(minutes);
        self
    }

    /// Retains the sandbox after each run.
    #[must_use]
    pub const fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Installs dependencies during provisioning.
    #[must_use]
    pub const fn install_dependencies(mut self, install: bool) -> Self {
        self.install_dependencies = install;
        self
    }

    /// Makes MCP servers available to the agent.
    #[must_use]
    pub fn with_connectors(mut self, connectors: Vec<McpConnector>) -> Self {
        self.connectors = connectors;
        self
    }
}

/// Follow-up message for an existing task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinueTaskRequest {
    pub(crate) task_id: TaskId,
    pub(crate) message: String,
    pub(crate) connectors: Vec<McpConnector>,
}

impl ContinueTaskRequest {
    /// Creates a follow-up request.
    #[must_use]
    pub fn new(task_id: TaskId, message: impl Into<String>) -> Self {
        Self {
            task_id,
            message: message.into(),
            connectors: Vec::new(),
        }
    }

    /// Makes MCP servers available to the agent.
    #[must_use]
    pub fn with_connectors(mut self, connectors: Vec<McpConnector>) -> Self {
        self.connectors = connectors;
        self
    }
}
