//! Task records and the stores that persist them.
//!
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]: the task aggregate, its status machine,
//!   transcript and log entries, and partial updates
//! - Port contracts in [`ports`]: store, progress sink, and rate limiter
//! - Adapter implementations in [`adapters`]: in-memory and `PostgreSQL`
//! - Services in [`services`]: per-run progress reporting

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
