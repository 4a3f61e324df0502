//! Publishing sandbox changes to version control.
//!
//! Commit message resolution, the git publisher port with a sandbox-git
//! adapter, repository inspection for sandbox planning, and branch name
//! generation.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
