//! Task lifecycle orchestration.
//!
//! [`TaskLifecycleOrchestrator`] turns a request into a supervised job:
//!
//! 1. resolve the task branch (generated name or timestamped fallback)
//! 2. reconnect to a kept-alive sandbox or provision a fresh one
//! 3. run the coding agent inside the sandbox
//! 4. commit and push the branch
//! 5. record the terminal status and dispose of the sandbox
//!
//! Every run is bounded by the task's maximum duration and observes user
//! stops at fixed checkpoints before the agent starts.

mod context;
mod disposal;
mod error;
mod request;
mod run;
mod service;
mod settings;
mod watchdog;

pub use context::RunContext;
pub use error::{OrchestratorError, RunFailure, ValidationError};
pub use request::{ContinueTaskRequest, CreateTaskRequest};
pub use service::{TaskJob, TaskLifecycleOrchestrator};
pub use settings::{OrchestratorPorts, OrchestratorSettings};
pub use watchdog::{Watched, watch};

#[cfg(test)]
mod tests;
