//! Deadline combinator with an early warning.

use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;

/// Result of racing work against a deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Watched<T> {
    /// The work finished first.
    Finished(T),
    /// The deadline elapsed first; the work future was dropped.
    TimedOut,
}

/// Runs `work` until it finishes or `limit` elapses.
///
/// `on_warning` runs once, `warning_lead` before the deadline, without
/// affecting the race. No warning fires when the lead is not shorter than
/// the limit. Both timers are dropped as soon as the work finishes.
pub async fn watch<F, W>(work: F, limit: Duration, warning_lead: Duration, on_warning: W) -> Watched<F::Output>
where
    F: Future,
    W: Future<Output = ()>,
{
    let warn_after = limit.checked_sub(warning_lead).filter(|delay| !delay.is_zero());
    let warning = async move {
        if let Some(delay) = warn_after {
            tokio::time::sleep(delay).await;
            on_warning.await;
        }
        std::future::pending::<Infallible>().await
    };
    let deadline = tokio::time::sleep(limit);
    tokio::pin!(work, warning, deadline);

    tokio::select! {
        biased;
        output = &mut work => Watched::Finished(output),
        () = &mut deadline => Watched::TimedOut,
        never = &mut warning => match never {},
    }
}
