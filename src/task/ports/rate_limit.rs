//! Rate limiting port consulted before a job starts.

use crate::task::domain::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Window quota.
    pub total: u32,
    /// When the window resets.
    pub reset_at: DateTime<Utc>,
}

/// Per-user request quota.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Checks and consumes one unit of quota for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimiterError`] when the quota cannot be evaluated.
    async fn check(&self, user: &UserId) -> Result<RateLimitDecision, RateLimiterError>;
}

/// Failure evaluating a rate limit.
#[derive(Debug, Clone, Error)]
#[error("rate limiter unavailable: {0}")]
pub struct RateLimiterError(pub Arc<dyn std::error::Error + Send + Sync>);

impl RateLimiterError {
    /// Wraps an underlying error.
    #[must_use]
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
