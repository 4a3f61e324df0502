//! Runs cut short by a stop request or by the watchdog.

#![expect(
    clippy::panic_in_result_fn,
    reason = "Tests assert on outcomes while propagating setup errors with `?`"
)]

use super::helpers::{Harness, OWNER, REPO_URL};
use atelier::agent::adapters::ScriptedAgentRuntime;
use atelier::orchestrator::{CreateTaskRequest, OrchestratorError, ValidationError};
use atelier::task::{domain::TaskStatus, ports::TaskStore};
use eyre::OptionExt;
use rstest::rstest;

fn request() -> CreateTaskRequest {
    CreateTaskRequest::new(OWNER, REPO_URL, "Add a health endpoint")
}

#[rstest]
#[tokio::test]
async fn stop_before_the_run_starts_skips_provisioning() -> eyre::Result<()> {
    let harness = Harness::builder().build();

    // The current-thread runtime has not polled the job yet.
    let job = harness.orchestrator.create_task(request()).await?;
    let task_id = job.task_id();
    harness.orchestrator.stop_task(task_id).await?;
    let status = job.wait().await?;

    assert_eq!(status, TaskStatus::Stopped);
    let task = harness.task(task_id).await?;
    assert_eq!(task.status(), TaskStatus::Stopped);
    assert_eq!(task.status_message(), Some("Task was stopped by user"));
    assert!(task.error().is_none());
    assert!(harness.sandboxes.created().is_empty());
    assert!(harness.agent.requests().is_empty());
    assert!(harness.publisher.pushes().is_empty());
    Ok(())
}

#[rstest]
#[case::disposed(false, 1)]
#[case::kept_alive(true, 0)]
#[tokio::test]
async fn stop_after_provisioning_skips_the_agent(
    #[case] keep_alive: bool,
    #[case] shutdowns: usize,
) -> eyre::Result<()> {
    let harness = Harness::builder().stop_at_progress(45).build();

    let job = harness
        .orchestrator
        .create_task(request().keep_alive(keep_alive))
        .await?;
    let task_id = job.task_id();
    let status = job.wait().await?;

    assert_eq!(status, TaskStatus::Stopped);
    let task = harness.task(task_id).await?;
    assert_eq!(task.status(), TaskStatus::Stopped);
    assert_eq!(task.status_message(), Some("Task was stopped by user"));
    assert!(harness.agent.requests().is_empty());
    assert!(harness.publisher.pushes().is_empty());

    let created = harness.sandboxes.created();
    assert_eq!(created.len(), 1);
    let sandbox = created.first().ok_or_eyre("no sandbox created")?;
    assert_eq!(sandbox.shutdown_count(), shutdowns);
    assert_eq!(harness.orchestrator.registry().len(), usize::from(keep_alive));
    assert_eq!(
        task.sandbox_id().map(|id| id.as_str().to_owned()),
        keep_alive.then(|| "sbx-1".to_owned())
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn stop_after_agent_started_settles_with_real_outcome() -> eyre::Result<()> {
    let harness = Harness::builder()
        .agent(ScriptedAgentRuntime::succeeding("Done").gated())
        .build();
    let started = harness.agent.started();

    let job = harness.orchestrator.create_task(request()).await?;
    let task_id = job.task_id();
    started.notified().await;
    let stopped = harness.orchestrator.stop_task(task_id).await?;
    assert_eq!(stopped.status(), TaskStatus::Stopped);
    harness.agent.release();
    let status = job.wait().await?;

    assert_eq!(status, TaskStatus::Completed);
    assert_eq!(harness.task(task_id).await?.status(), TaskStatus::Completed);
    assert_eq!(harness.publisher.pushes().len(), 1);
    let sandbox = harness.sandboxes.created();
    assert_eq!(sandbox.first().map(|handle| handle.shutdown_count()), Some(1));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn finished_task_cannot_be_stopped() -> eyre::Result<()> {
    let harness = Harness::builder().build();
    let job = harness.orchestrator.create_task(request()).await?;
    let task_id = job.task_id();
    job.wait().await?;

    let result = harness.orchestrator.stop_task(task_id).await;

    assert!(matches!(
        result,
        Err(OrchestratorError::Validation(ValidationError::NotStoppable {
            status: TaskStatus::Completed,
            ..
        }))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn hanging_agent_times_out_after_warning() -> eyre::Result<()> {
    let harness = Harness::builder()
        .agent(ScriptedAgentRuntime::hanging())
        .build();

    let job = harness
        .orchestrator
        .create_task(request().with_max_duration(2))
        .await?;
    let task_id = job.task_id();
    let status = job.wait().await?;

    assert_eq!(status, TaskStatus::Error);
    let task = harness.task(task_id).await?;
    assert_eq!(task.error(), Some("Task timed out after 2 minute(s)"));

    let logs = harness.store.list_logs(task_id).await?;
    let warning = logs
        .iter()
        .position(|entry| entry.message == "Task will time out in 60 seconds")
        .ok_or_eyre("timeout warning not logged")?;
    let failure = logs
        .iter()
        .position(|entry| entry.message.contains("timed out after"))
        .ok_or_eyre("timeout failure not logged")?;
    assert!(warning < failure);

    let sandbox = harness.sandboxes.created();
    assert_eq!(sandbox.first().map(|handle| handle.shutdown_count()), Some(1));
    assert!(harness.publisher.pushes().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn timed_out_run_keeps_sandbox_alive_when_requested() -> eyre::Result<()> {
    let harness = Harness::builder()
        .agent(ScriptedAgentRuntime::hanging())
        .build();

    let job = harness
        .orchestrator
        .create_task(request().with_max_duration(1).keep_alive(true))
        .await?;
    let task_id = job.task_id();
    let status = job.wait().await?;

    assert_eq!(status, TaskStatus::Error);
    let task = harness.task(task_id).await?;
    assert!(task.error().is_some_and(|text| text.contains("timed out")));
    assert!(task.sandbox_id().is_some());
    let sandbox = harness.sandboxes.created();
    assert_eq!(sandbox.first().map(|handle| handle.shutdown_count()), Some(0));
    assert_eq!(harness.orchestrator.registry().len(), 1);
    Ok(())
}
