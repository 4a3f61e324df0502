//! Atelier: supervised task runs for sandboxed AI coding agents.
//!
//! A user describes a change in natural language; Atelier provisions an
//! isolated sandbox with the repository cloned, runs a coding agent inside
//! it, and publishes the result on a branch. Every run is time-bounded,
//! cancellable, and resumable through follow-up messages.
//!
//! # Architecture
//!
//! Atelier follows hexagonal architecture principles. Each bounded context
//! exposes:
//!
//! - **Domain**: Pure types and rules with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, sandbox, CLI)
//! - **Services**: Workflows composed from ports
//!
//! # Modules
//!
//! - [`task`]: Task records, transcript, logs, and their stores
//! - [`sandbox`]: Sandbox ports, provisioning, and the live-sandbox registry
//! - [`agent`]: Coding agent runtimes and prompt handling
//! - [`vcs`]: Commit and push, commit messages, repository metadata
//! - [`orchestrator`]: The task lifecycle orchestrator
//! - [`config`]: Layered configuration
//! - [`telemetry`]: Tracing subscriber setup

pub mod agent;
pub mod config;
pub mod orchestrator;
pub mod sandbox;
pub mod task;
pub mod telemetry;
pub mod vcs;
