//! Sandbox services: the live-sandbox registry, port detection, dependency
//! installation, and provisioning.

pub mod dependencies;
mod port_detector;
mod provisioner;
mod registry;

pub use dependencies::DependencyInstall;
pub use port_detector::{DEFAULT_DEV_PORT, detect_port};
pub use provisioner::{
    ProvisionError, ProvisionOutcome, ProvisionRequest, ProvisionedSandbox, SandboxProvisioner,
    ProvisionerSettings,
};
pub use registry::SandboxRegistry;
