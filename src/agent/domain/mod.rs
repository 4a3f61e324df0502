//! Domain model for coding-agent execution.
//!
//! Agent kinds, model and session identifiers, MCP connector settings and the
//! request/response values exchanged with an agent runtime.

mod connector;
mod error;
mod kind;
mod prompt;
mod request;

pub use connector::{ConnectorTransport, McpConnector, connectors_to_mcp_config};
pub use error::AgentDomainError;
pub use kind::{AgentKind, AgentSessionId, ModelId};
pub use prompt::SanitizedPrompt;
pub use request::{AgentOutput, AgentRequest};
