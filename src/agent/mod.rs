//! Coding agents: request values, the runtime port, CLI and scripted
//! runtimes, and follow-up prompt rendering.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
