//! In-memory task adapters for tests and local runs.

mod rate_limit;
mod store;

pub use rate_limit::InMemoryRateLimiter;
pub use store::InMemoryTaskStore;
