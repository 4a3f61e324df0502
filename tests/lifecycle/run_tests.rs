//! End-to-end runs of new tasks against in-memory collaborators.

#![expect(
    clippy::panic_in_result_fn,
    reason = "Tests assert on outcomes while propagating setup errors with `?`"
)]

use super::helpers::{Harness, OWNER, REPO_URL};
use atelier::agent::adapters::ScriptedAgentRuntime;
use atelier::orchestrator::{CreateTaskRequest, OrchestratorError};
use atelier::sandbox::{adapters::memory::InMemorySandboxService, domain::CommandOutput};
use atelier::task::{
    domain::{BranchName, MessageOrder, MessageRole, Progress, TaskStatus},
    ports::TaskStore,
};
use atelier::vcs::adapters::memory::{RecordingGitPublisher, StaticBranchNameGenerator};
use eyre::OptionExt;
use rstest::rstest;
use std::time::Duration;

fn request() -> CreateTaskRequest {
    CreateTaskRequest::new(OWNER, REPO_URL, "Add a health endpoint")
}

#[rstest]
#[tokio::test]
async fn successful_run_completes_and_disposes_sandbox() -> eyre::Result<()> {
    let harness = Harness::builder().build();

    let job = harness.orchestrator.create_task(request()).await?;
    let task_id = job.task_id();
    let status = job.wait().await?;

    assert_eq!(status, TaskStatus::Completed);
    let task = harness.task(task_id).await?;
    assert_eq!(task.status(), TaskStatus::Completed);
    assert_eq!(task.progress(), Progress::COMPLETE);
    assert!(task.completed_at().is_some());
    assert!(task.error().is_none());
    assert!(task.sandbox_id().is_none(), "sandbox fields are cleared");

    let created = harness.sandboxes.created();
    assert_eq!(created.len(), 1);
    let sandbox = created.first().ok_or_eyre("no sandbox created")?;
    assert_eq!(sandbox.shutdown_count(), 1);
    assert!(harness.orchestrator.registry().is_empty());

    let branch = task.branch_name().ok_or_eyre("branch not resolved")?;
    assert!(branch.as_str().starts_with("atelier/"));
    let pushes = harness.publisher.pushes();
    assert_eq!(pushes.len(), 1);
    let push = pushes.first().ok_or_eyre("no push recorded")?;
    assert_eq!(push.branch, branch.as_str());
    assert_eq!(push.message, "Add a health endpoint");
    assert_eq!(push.sandbox_id, "sbx-1");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn successful_run_records_transcript_and_logs() -> eyre::Result<()> {
    let harness = Harness::builder().build();

    let job = harness.orchestrator.create_task(request()).await?;
    let task_id = job.task_id();
    job.wait().await?;

    let messages = harness
        .store
        .list_messages(task_id, MessageOrder::Ascending, None)
        .await?;
    let roles: Vec<_> = messages.iter().map(|entry| entry.role()).collect();
    assert_eq!(roles, vec![MessageRole::User, MessageRole::Agent]);
    let reply = messages.last().ok_or_eyre("no agent reply")?;
    assert_eq!(reply.content(), "Added the endpoint");

    let logs = harness.store.list_logs(task_id).await?;
    let texts: Vec<_> = logs.iter().map(|entry| entry.message.as_str()).collect();
    assert!(texts.contains(&"Task completed successfully"));
    assert!(texts.contains(&"Sandbox shut down"));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn agent_failure_is_recorded_verbatim() -> eyre::Result<()> {
    let harness = Harness::builder()
        .agent(ScriptedAgentRuntime::failing(
            "claude exited with code 1: context window exceeded",
        ))
        .build();

    let job = harness.orchestrator.create_task(request()).await?;
    let task_id = job.task_id();
    let status = job.wait().await?;

    assert_eq!(status, TaskStatus::Error);
    let task = harness.task(task_id).await?;
    assert_eq!(task.status(), TaskStatus::Error);
    assert_eq!(
        task.error(),
        Some("claude exited with code 1: context window exceeded")
    );
    assert!(harness.publisher.pushes().is_empty());
    let sandbox = harness.sandboxes.created();
    assert_eq!(
        sandbox.first().map(|handle| handle.shutdown_count()),
        Some(1)
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn rejected_push_fails_the_task() -> eyre::Result<()> {
    let harness = Harness::builder()
        .publisher(RecordingGitPublisher::rejecting())
        .build();

    let job = harness.orchestrator.create_task(request()).await?;
    let task_id = job.task_id();
    let status = job.wait().await?;

    assert_eq!(status, TaskStatus::Error);
    let task = harness.task(task_id).await?;
    let error = task.error().ok_or_eyre("error not recorded")?;
    assert!(error.starts_with("failed to push changes to branch atelier/"));
    assert!(harness.orchestrator.registry().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test]
async fn failed_sandbox_creation_fails_without_agent_run() -> eyre::Result<()> {
    let sandboxes = InMemorySandboxService::new();
    sandboxes.fail_creation();
    let harness = Harness::builder().sandboxes(sandboxes).build();

    let job = harness.orchestrator.create_task(request()).await?;
    let task_id = job.task_id();
    let status = job.wait().await?;

    assert_eq!(status, TaskStatus::Error);
    let task = harness.task(task_id).await?;
    assert!(task.error().is_some_and(|text| text.contains("sandbox quota exhausted")));
    assert!(harness.agent.requests().is_empty());
    assert!(harness.sandboxes.created().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test]
async fn failed_branch_checkout_disposes_sandbox() -> eyre::Result<()> {
    let sandboxes = InMemorySandboxService::new()
        .with_response("git checkout", CommandOutput::failure(128, "invalid ref"));
    let harness = Harness::builder().sandboxes(sandboxes).build();

    let job = harness.orchestrator.create_task(request()).await?;
    let status = job.wait().await?;

    assert_eq!(status, TaskStatus::Error);
    let created = harness.sandboxes.created();
    assert_eq!(created.len(), 1);
    assert!(created.iter().all(|sandbox| sandbox.shutdown_count() == 1));
    assert!(harness.agent.requests().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test]
async fn failed_dependency_install_still_runs_the_agent() -> eyre::Result<()> {
    let sandboxes = InMemorySandboxService::new()
        .with_file("package.json", r#"{"scripts":{"dev":"vite"}}"#)
        .with_response("npm install", CommandOutput::failure(1, "ERESOLVE"));
    let harness = Harness::builder().sandboxes(sandboxes).build();

    let job = harness
        .orchestrator
        .create_task(request().install_dependencies(true))
        .await?;
    let task_id = job.task_id();
    let status = job.wait().await?;

    assert_eq!(status, TaskStatus::Completed);
    assert_eq!(harness.agent.requests().len(), 1);
    assert_eq!(harness.publisher.pushes().len(), 1);
    let sandbox = harness
        .sandboxes
        .created()
        .into_iter()
        .next()
        .ok_or_eyre("no sandbox created")?;
    assert!(sandbox.commands().iter().any(|line| line.starts_with("npm install")));
    assert!(sandbox.detached().is_empty());

    let logs = harness.store.list_logs(task_id).await?;
    assert!(
        logs.iter()
            .any(|entry| entry.message.starts_with("Dependency installation failed"))
    );
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn fallback_branch_is_claimed_at_once_without_a_generator() -> eyre::Result<()> {
    let harness = Harness::builder()
        .branch_name_wait(Duration::from_secs(10))
        .build();
    let started = tokio::time::Instant::now();

    let job = harness.orchestrator.create_task(request()).await?;
    let task_id = job.task_id();
    let status = job.wait().await?;

    assert_eq!(status, TaskStatus::Completed);
    assert!(started.elapsed() < Duration::from_secs(10));
    let task = harness.task(task_id).await?;
    let branch = task.branch_name().ok_or_eyre("branch not resolved")?;
    assert!(branch.as_str().starts_with("atelier/"));
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn generated_branch_name_is_used_when_configured() -> eyre::Result<()> {
    let generated = BranchName::new("feature/health-endpoint")?;
    let harness = Harness::builder()
        .branch_names(StaticBranchNameGenerator::new(generated))
        .branch_name_wait(Duration::from_secs(10))
        .build();

    let job = harness.orchestrator.create_task(request()).await?;
    let task_id = job.task_id();
    job.wait().await?;

    let task = harness.task(task_id).await?;
    assert_eq!(
        task.branch_name().map(BranchName::as_str),
        Some("feature/health-endpoint")
    );
    let pushes = harness.publisher.pushes();
    let push = pushes.first().ok_or_eyre("no push recorded")?;
    assert_eq!(push.branch, "feature/health-endpoint");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn quota_exhaustion_rejects_before_any_job() -> eyre::Result<()> {
    let harness = Harness::builder().quota(1).build();

    harness.orchestrator.create_task(request()).await?.wait().await?;
    let denied = harness.orchestrator.create_task(request()).await;

    let Err(OrchestratorError::RateLimitExceeded {
        remaining, total, ..
    }) = denied
    else {
        eyre::bail!("expected rate limit rejection, got {denied:?}");
    };
    assert_eq!((remaining, total), (0, 1));
    assert_eq!(harness.sandboxes.created().len(), 1);
    Ok(())
}

#[rstest]
#[case::blank_prompt("   ", REPO_URL)]
#[case::bad_repository("Add a health endpoint", "ftp://example.com/repo")]
#[tokio::test]
async fn malformed_requests_are_rejected(
    #[case] prompt: &str,
    #[case] repo_url: &str,
) -> eyre::Result<()> {
    let harness = Harness::builder().build();

    let result = harness
        .orchestrator
        .create_task(CreateTaskRequest::new(OWNER, repo_url, prompt))
        .await;

    assert!(result.as_ref().is_err_and(OrchestratorError::is_validation));
    assert!(harness.sandboxes.created().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test]
async fn out_of_range_duration_is_rejected() {
    let harness = Harness::builder().build();

    let result = harness
        .orchestrator
        .create_task(request().with_max_duration(0))
        .await;

    assert!(result.is_err_and(|err| err.is_validation()));
}
