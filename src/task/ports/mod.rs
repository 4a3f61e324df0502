//! Port contracts for task persistence and progress reporting.
//!
//! Ports define infrastructure-agnostic interfaces used by the orchestrator.

pub mod progress;
pub mod rate_limit;
pub mod store;

pub use progress::ProgressSink;
pub use rate_limit::{RateLimitDecision, RateLimiter, RateLimiterError};
pub use store::{TaskStore, TaskStoreError, TaskStoreResult};

#[cfg(test)]
pub use progress::MockProgressSink;
