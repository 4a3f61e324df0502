//! Error types for agent domain validation.

use thiserror::Error;

/// Errors returned while constructing agent domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentDomainError {
    /// The agent identifier is not one of the supported agents.
    #[error("unsupported agent: {0}")]
    UnknownAgent(String),

    /// The model identifier is empty after trimming.
    #[error("model id must not be empty")]
    EmptyModelId,

    /// The session identifier is empty after trimming.
    #[error("agent session id must not be empty")]
    EmptySessionId,

    /// The connector name is empty or contains characters outside
    /// `[A-Za-z0-9_-]`.
    #[error("invalid connector name '{0}'")]
    InvalidConnectorName(String),

    /// The local connector command is empty.
    #[error("connector command must not be empty")]
    EmptyConnectorCommand,

    /// The remote connector URL does not start with `http://` or `https://`.
    #[error("connector url '{0}' must start with 'http://' or 'https://'")]
    InvalidConnectorUrl(String),
}
