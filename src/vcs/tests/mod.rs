//! Unit tests for the version control module.
