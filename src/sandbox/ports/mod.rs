//! Port contracts for sandbox provisioning.

mod cancellation;
mod sandbox;

pub use cancellation::CancellationCheck;
pub use sandbox::{SandboxError, SandboxHandle, SandboxResult, SandboxService};
