//! `PostgreSQL` adapters for task lifecycle persistence.

mod conversion;
mod models;
mod schema;
mod store;

pub use store::{PostgresTaskStore, TaskPgPool};
