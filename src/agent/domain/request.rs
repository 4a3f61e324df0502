//! Inputs and outputs of one agent execution.

use super::{AgentKind, AgentSessionId, McpConnector, ModelId, SanitizedPrompt};

/// Everything an agent runtime needs to apply one change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRequest {
    /// Sanitised instruction text.
    pub prompt: SanitizedPrompt,
    /// Agent to run.
    pub agent: AgentKind,
    /// Model override; the agent default applies when absent.
    pub model: Option<ModelId>,
    /// MCP servers made available to the agent.
    pub connectors: Vec<McpConnector>,
    /// Prior session to resume.
    pub session_id: Option<AgentSessionId>,
    /// Whether the sandbox was reconnected rather than freshly provisioned.
    pub is_resumed: bool,
}

impl AgentRequest {
    /// Creates a request for a fresh session with no connectors.
    #[must_use]
    pub const fn new(prompt: SanitizedPrompt, agent: AgentKind) -> Self {
        Self {
            prompt,
            agent,
            model: None,
            connectors: Vec::new(),
            session_id: None,
            is_resumed: false,
        }
    }

    /// Sets the model override.
    #[must_use]
    pub fn with_model(mut self, model: Option<ModelId>) -> Self {
        self.model = model;
        self
    }

    /// Sets the MCP connectors.
    #[must_use]
    pub fn with_connectors(mut self, connectors: Vec<McpConnector>) -> Self {
        self.connectors = connectors;
        self
    }

    /// Marks the request as resuming an existing session in a reconnected
    /// sandbox.
    #[must_use]
    pub fn resuming(mut self, session_id: Option<AgentSessionId>) -> Self {
        self.session_id = session_id;
        self.is_resumed = true;
        self
    }

    /// Returns the model to pass to the CLI.
    #[must_use]
    pub fn effective_model(&self) -> &str {
        self.model
            .as_ref()
            .map_or_else(|| self.agent.default_model(), ModelId::as_str)
    }
}

/// Successful agent execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentOutput {
    /// Human-readable summary to persist as a transcript entry.
    pub response: Option<String>,
    /// New or updated session identifier for later resumption.
    pub session_id: Option<AgentSessionId>,
}
