//! Version control adapters.

pub mod memory;
mod sandbox_git;

pub use sandbox_git::SandboxGitPublisher;
