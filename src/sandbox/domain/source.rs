//! Creation parameters for a sandbox.

use crate::task::domain::RepositoryUrl;
use std::time::Duration;

/// Language runtime image for the sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SandboxRuntime {
    /// Node.js image (also provides git and common build tools).
    Node,
    /// Python image.
    Python,
}

/// Git source cloned into the sandbox at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxSource {
    /// Repository clone URL.
    pub repo_url: RepositoryUrl,
    /// Branch or commit to check out; the default branch when absent.
    pub revision: Option<String>,
    /// Shallow clone depth.
    pub depth: Option<u32>,
}

/// Compute resources requested for the sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSpec {
    /// Virtual CPU count.
    pub vcpus: u8,
    /// Runtime image.
    pub runtime: SandboxRuntime,
    /// Ports to expose through public domains.
    pub ports: Vec<u16>,
}

/// Full request passed to the provisioning service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxCreateRequest {
    /// Repository to clone.
    pub source: SandboxSource,
    /// Requested resources.
    pub resources: ResourceSpec,
    /// Lifetime after which the provider reclaims the sandbox.
    pub timeout: Duration,
}
