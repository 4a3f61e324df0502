//! In-memory daily request quota.

use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::task::{
    domain::UserId,
    ports::{RateLimitDecision, RateLimiter, RateLimiterError},
};

/// Counts requests per user within the current UTC day.
#[derive(Debug, Clone)]
pub struct InMemoryRateLimiter<C: Clock + Send + Sync> {
    quota: u32,
    clock: Arc<C>,
    usage: Arc<Mutex<HashMap<UserId, DailyUsage>>>,
}

#[derive(Debug, Clone, Copy)]
struct DailyUsage {
    day: NaiveDate,
    used: u32,
}

impl<C: Clock + Send + Sync> InMemoryRateLimiter<C> {
    /// Creates a limiter allowing `quota` requests per user per day.
    #[must_use]
    pub fn new(quota: u32, clock: Arc<C>) -> Self {
        Self {
            quota,
            clock,
            usage: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

fn next_reset(day: NaiveDate) -> DateTime<Utc> {
    day.checked_add_days(Days::new(1))
        .and_then(|next| next.and_hms_opt(0, 0, 0))
        .map_or(DateTime::<Utc>::MAX_UTC, |midnight| midnight.and_utc())
}

#[async_trait]
impl<C: Clock + Send + Sync> RateLimiter for InMemoryRateLimiter<C> {
    async fn check(&self, user: &UserId) -> Result<RateLimitDecision, RateLimiterError> {
        let today = self.clock.utc().date_naive();
        let mut usage = self
            .usage
            .lock()
            .map_err(|err| RateLimiterError::new(std::io::Error::other(err.to_string())))?;
        let entry = usage.entry(user.clone()).or_insert(DailyUsage { day: today, used: 0 });
        if entry.day != today {
            *entry = DailyUsage { day: today, used: 0 };
        }

        let allowed = entry.used < self.quota;
        if allowed {
            entry.used = entry.used.saturating_add(1);
        }
        Ok(RateLimitDecision {
            allowed,
            remaining: self.quota.saturating_sub(entry.used),
            total: self.quota,
            reset_at: next_reset(today),
        })
    }
}
