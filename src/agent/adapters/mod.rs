//! Agent runtime adapters.

mod cli;
pub mod scripted;

pub use cli::{MCP_CONFIG_PATH, SandboxCliAgentRuntime};
pub use scripted::ScriptedAgentRuntime;
