//! Domain model for ephemeral sandboxes.

mod command;
mod ids;
mod package;
mod source;

pub use command::{CommandOutput, SandboxCommand};
pub use ids::SandboxId;
pub use package::PackageManager;
pub use source::{ResourceSpec, SandboxCreateRequest, SandboxRuntime, SandboxSource};
