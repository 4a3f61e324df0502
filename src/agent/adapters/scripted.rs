//! Scripted agent runtime for tests and dry runs.

use crate::agent::{
    domain::{AgentOutput, AgentRequest},
    ports::{AgentError, AgentRuntime},
};
use crate::sandbox::ports::SandboxHandle;
use crate::task::services::ProgressLogger;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// What the scripted agent does when executed.
#[derive(Debug, Clone)]
pub enum ScriptedBehaviour {
    /// Return the output.
    Succeed(AgentOutput),
    /// Fail with the message.
    Fail(String),
    /// Never return.
    Hang,
}

/// Agent runtime replaying a fixed behaviour.
///
/// Every execution notifies [`Self::started`] and, when gated, waits for
/// [`Self::release`] before finishing.
#[derive(Debug, Clone)]
pub struct ScriptedAgentRuntime {
    behaviour: ScriptedBehaviour,
    gated: bool,
    started: Arc<Notify>,
    release: Arc<Notify>,
    requests: Arc<Mutex<Vec<AgentRequest>>>,
}

impl ScriptedAgentRuntime {
    /// Creates a runtime with `behaviour`.
    #[must_use]
    pub fn new(behaviour: ScriptedBehaviour) -> Self {
        Self {
            behaviour,
            gated: false,
            started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Succeeds with `response` as the transcript entry.
    #[must_use]
    pub fn succeeding(response: impl Into<String>) -> Self {
        Self::new(ScriptedBehaviour::Succeed(AgentOutput {
            response: Some(response.into()),
            session_id: None,
        }))
    }

    /// Fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(ScriptedBehaviour::Fail(message.into()))
    }

    /// Never completes.
    #[must_use]
    pub fn hanging() -> Self {
        Self::new(ScriptedBehaviour::Hang)
    }

    /// Holds each execution until [`Self::release`] is notified.
    #[must_use]
    pub const fn gated(mut self) -> Self {
        self.gated = true;
        self
    }

    /// Notified when an execution starts.
    #[must_use]
    pub fn started(&self) -> Arc<Notify> {
        Arc::clone(&self.started)
    }

    /// Releases a gated execution.
    pub fn release(&self) {
        self.release.notify_one();
    }

    /// Returns the requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<AgentRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AgentRuntime for ScriptedAgentRuntime {
    async fn execute(
        &self,
        _handle: &dyn SandboxHandle,
        request: &AgentRequest,
        logger: &ProgressLogger,
    ) -> Result<AgentOutput, AgentError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.started.notify_one();
        logger.info(format!("{} started", request.agent)).await;
        if self.gated {
            self.release.notified().await;
        }

        match &self.behaviour {
            ScriptedBehaviour::Succeed(output) => Ok(output.clone()),
            ScriptedBehaviour::Fail(message) => Err(AgentError::Failed(message.clone())),
            ScriptedBehaviour::Hang => std::future::pending().await,
        }
    }
}
