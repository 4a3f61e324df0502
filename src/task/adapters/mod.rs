//! Adapter implementations of the task ports.

pub mod memory;
pub mod postgres;
pub mod sink;
