//! Port contracts for running coding agents.

mod runtime;

pub use runtime::{AgentError, AgentRuntime};
