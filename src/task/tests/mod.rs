//! Unit tests for the task module.
//!
//! Tests are organised by concern: domain values and the aggregate, the
//! status machine, the in-memory adapters, and progress reporting.

mod store_tests;
