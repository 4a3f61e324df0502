//! Unit tests for orchestrator building blocks.
