//! MCP connector configurations handed to agents.

use super::AgentDomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transport used to reach an MCP server from inside the sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ConnectorTransport {
    /// A server launched as a local process speaking MCP over STDIO.
    Local {
        /// Executable command.
        command: String,
        /// Command-line arguments.
        args: Vec<String>,
        /// Environment variables for the process.
        env: BTreeMap<String, String>,
    },
    /// A remote server reached over HTTP.
    Remote {
        /// Server URL.
        url: String,
        /// Extra request headers, typically authorization.
        headers: BTreeMap<String, String>,
    },
}

/// A named MCP server the agent may call during execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpConnector {
    name: String,
    transport: ConnectorTransport,
}

impl McpConnector {
    /// Creates a connector for a local STDIO server.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError`] when the name is invalid or the command is
    /// empty.
    pub fn local(
        name: impl Into<String>,
        command: impl Into<String>,
        args: impl IntoIterator<Item = String>,
    ) -> Result<Self, AgentDomainError> {
        let command_value = command.into().trim().to_owned();
        if command_value.is_empty() {
            return Err(AgentDomainError::EmptyConnectorCommand);
        }
        Ok(Self {
            name: validate_name(name.into())?,
            transport: ConnectorTransport::Local {
                command: command_value,
                args: args.into_iter().collect(),
                env: BTreeMap::new(),
            },
        })
    }

    /// Creates a connector for a remote HTTP server.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError`] when the name is invalid or the URL does
    /// not use an HTTP scheme.
    pub fn remote(
        name: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<Self, AgentDomainError> {
        let url_value = url.into().trim().to_owned();
        if !(url_value.starts_with("http://") || url_value.starts_with("https://")) {
            return Err(AgentDomainError::InvalidConnectorUrl(url_value));
        }
        Ok(Self {
            name: validate_name(name.into())?,
            transport: ConnectorTransport::Remote {
                url: url_value,
                headers: BTreeMap::new(),
            },
        })
    }

    /// Replaces environment variables (local) or headers (remote).
    #[must_use]
    pub fn with_settings(mut self, values: impl IntoIterator<Item = (String, String)>) -> Self {
        let settings: BTreeMap<String, String> = values.into_iter().collect();
        match &mut self.transport {
            ConnectorTransport::Local { env, .. } => *env = settings,
            ConnectorTransport::Remote { headers, .. } => *headers = settings,
        }
        self
    }

    /// Returns the connector name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the transport configuration.
    #[must_use]
    pub const fn transport(&self) -> &ConnectorTransport {
        &self.transport
    }
}

fn validate_name(raw: String) -> Result<String, AgentDomainError> {
    let normalized = raw.trim();
    let is_valid = !normalized.is_empty()
        && normalized
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if !is_valid {
        return Err(AgentDomainError::InvalidConnectorName(raw));
    }
    Ok(normalized.to_owned())
}

/// Renders connectors in the `mcpServers` JSON layout agent CLIs read.
#[must_use]
pub fn connectors_to_mcp_config(connectors: &[McpConnector]) -> serde_json::Value {
    let servers: serde_json::Map<String, serde_json::Value> = connectors
        .iter()
        .map(|connector| {
            let entry = match connector.transport() {
                ConnectorTransport::Local { command, args, env } => serde_json::json!({
                    "command": command,
                    "args": args,
                    "env": env,
                }),
                ConnectorTransport::Remote { url, headers } => serde_json::json!({
                    "type": "http",
                    "url": url,
                    "headers": headers,
                }),
            };
            (connector.name().to_owned(), entry)
        })
        .collect();
    serde_json::json!({ "mcpServers": servers })
}
