//! Shared fixtures for sandbox tests.

use crate::sandbox::ports::CancellationCheck;
use crate::task::{domain::TaskId, ports::MockProgressSink, services::ProgressLogger};
use async_trait::async_trait;
use mockable::DefaultClock;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Logger whose sink accepts and discards everything.
pub(super) fn quiet_logger() -> ProgressLogger {
    let mut sink = MockProgressSink::new();
    sink.expect_log().returning(|_, _| Ok(()));
    sink.expect_progress().returning(|_, _, _| Ok(()));
    ProgressLogger::new(TaskId::new(), Arc::new(sink), Arc::new(DefaultClock))
}

/// Reports cancellation from the `n`th check onwards (zero-based).
pub(super) struct CancelAt {
    trigger: usize,
    checks: AtomicUsize,
}

impl CancelAt {
    pub(super) const fn check(trigger: usize) -> Self {
        Self {
            trigger,
            checks: AtomicUsize::new(0),
        }
    }

    pub(super) const fn never() -> Self {
        Self::check(usize::MAX)
    }
}

#[async_trait]
impl CancellationCheck for CancelAt {
    async fn is_cancelled(&self) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst) >= self.trigger
    }
}
