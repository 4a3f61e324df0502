//! Runs agent CLIs inside the sandbox.

use crate::agent::{
    domain::{AgentKind, AgentOutput, AgentRequest, AgentSessionId, connectors_to_mcp_config},
    ports::{AgentError, AgentRuntime},
};
use crate::sandbox::{domain::SandboxCommand, ports::SandboxHandle};
use crate::task::services::ProgressLogger;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use tokio::sync::mpsc;

/// Path of the MCP server configuration written before the agent starts.
pub const MCP_CONFIG_PATH: &str = ".atelier/mcp.json";

/// Longest agent error excerpt copied to the task.
const MAX_ERROR_CHARS: usize = 2000;

/// Agent runtime invoking the selected agent's command line tool.
#[derive(Debug, Clone, Default)]
pub struct SandboxCliAgentRuntime {
    env: BTreeMap<String, String>,
}

impl SandboxCliAgentRuntime {
    /// Creates a runtime with no extra environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Passes `key=value` to every agent invocation, typically API keys.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    fn command(&self, request: &AgentRequest, mcp_config: Option<&str>) -> SandboxCommand {
        let prompt = request.prompt.as_str();
        let model = request.effective_model();
        let base = SandboxCommand::new(request.agent.binary());
        let command = match request.agent {
            AgentKind::Claude => {
                let mut claude = base
                    .args(["-p", prompt, "--model", model])
                    .args(["--output-format", "json", "--dangerously-skip-permissions"]);
                if let Some(path) = mcp_config {
                    claude = claude.args(["--mcp-config", path]);
                }
                if let Some(session) = &request.session_id {
                    claude = claude.args(["--resume", session.as_str()]);
                }
                claude
            }
            AgentKind::Cursor => base
                .args(["-p", prompt, "--model", model])
                .args(["--output-format", "json", "--force"]),
            AgentKind::Codex => base.args(["exec", "--model", model, "--full-auto", prompt]),
            AgentKind::Copilot => base.args(["-p", prompt, "--model", model, "--allow-all-tools"]),
            AgentKind::Gemini => base.args(["-p", prompt, "--model", model, "--yolo"]),
            AgentKind::Opencode => base.args(["run", "--model", model, prompt]),
        };
        self.env
            .iter()
            .fold(command, |cmd, (key, value)| cmd.env(key, value))
    }
}

/// JSON result printed by agents run with `--output-format json`.
#[derive(Debug, Deserialize)]
struct JsonResult {
    result: Option<String>,
    session_id: Option<String>,
    #[serde(default)]
    is_error: bool,
}

fn parse_output(agent: AgentKind, stdout: &str) -> Result<AgentOutput, AgentError> {
    let trimmed = stdout.trim();
    if !matches!(agent, AgentKind::Claude | AgentKind::Cursor) {
        let response = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        return Ok(AgentOutput {
            response,
            session_id: None,
        });
    }

    let last_json_line = trimmed
        .lines()
        .rev()
        .find(|line| line.trim_start().starts_with('{'))
        .unwrap_or(trimmed);
    let Ok(parsed) = serde_json::from_str::<JsonResult>(last_json_line) else {
        return Ok(AgentOutput {
            response: (!trimmed.is_empty()).then(|| trimmed.to_owned()),
            session_id: None,
        });
    };
    if parsed.is_error {
        return Err(AgentError::Failed(
            parsed
                .result
                .unwrap_or_else(|| "agent reported an error".to_owned()),
        ));
    }
    Ok(AgentOutput {
        response: parsed.result,
        session_id: parsed.session_id.and_then(|id| AgentSessionId::new(id).ok()),
    })
}

fn excerpt(text: &str) -> String {
    text.chars().take(MAX_ERROR_CHARS).collect()
}

#[async_trait]
impl AgentRuntime for SandboxCliAgentRuntime {
    async fn execute(
        &self,
        handle: &dyn SandboxHandle,
        request: &AgentRequest,
        logger: &ProgressLogger,
    ) -> Result<AgentOutput, AgentError> {
        let mcp_config = if request.connectors.is_empty() || request.agent != AgentKind::Claude {
            None
        } else {
            let config = connectors_to_mcp_config(&request.connectors);
            handle
                .write_file(MCP_CONFIG_PATH, &config.to_string())
                .await?;
            logger
                .info(format!(
                    "Configured {} MCP server(s)",
                    request.connectors.len()
                ))
                .await;
            Some(MCP_CONFIG_PATH)
        };

        let command = self.command(request, mcp_config);
        logger
            .command(format!(
                "{} (model {})",
                request.agent.binary(),
                request.effective_model()
            ))
            .await;
        let (sender, mut receiver) = mpsc::unbounded_channel::<String>();
        let forward = async {
            while let Some(line) = receiver.recv().await {
                if !line.trim().is_empty() {
                    logger.info(line).await;
                }
            }
        };
        let (result, ()) = tokio::join!(handle.run_streaming(&command, sender), forward);
        let output = result?;

        if !output.succeeded() {
            let message = format!(
                "{} exited with code {}: {}",
                request.agent,
                output.exit_code,
                excerpt(output.diagnostic())
            );
            logger.error(message.clone()).await;
            return Err(AgentError::Failed(message));
        }

        let parsed = parse_output(request.agent, &output.stdout)?;
        logger
            .success(format!("{} finished", request.agent))
            .await;
        Ok(parsed)
    }
}
