//! Cooperative cancellation probe consulted between provisioning steps.

use async_trait::async_trait;

/// Answers whether the current run has been cancelled.
#[async_trait]
pub trait CancellationCheck: Send + Sync {
    /// Returns `true` once the run should stop.
    async fn is_cancelled(&self) -> bool;
}
