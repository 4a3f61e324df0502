//! Ephemeral sandboxes: handles, provisioning, and the live-sandbox registry.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
