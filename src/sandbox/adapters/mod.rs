//! Sandbox adapters.

pub mod memory;
