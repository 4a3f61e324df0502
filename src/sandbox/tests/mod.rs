//! Unit tests for the sandbox module.

mod support;
