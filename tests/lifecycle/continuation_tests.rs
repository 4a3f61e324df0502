//! Follow-up runs: reconnection, re-provisioning and request validation.

#![expect(
    clippy::panic_in_result_fn,
    reason = "Tests assert on outcomes while propagating setup errors with `?`"
)]

use super::helpers::{Harness, OWNER, REPO_URL, agent_with_session};
use atelier::agent::domain::{AgentKind, AgentSessionId};
use atelier::orchestrator::{
    ContinueTaskRequest, CreateTaskRequest, OrchestratorError, ValidationError,
};
use atelier::sandbox::domain::SandboxId;
use atelier::task::{
    domain::{
        MaxDuration, NewTask, RepositoryUrl, Task, TaskId, TaskStatus, TaskUpdate, UserId,
    },
    ports::TaskStore,
};
use chrono::Utc;
use eyre::OptionExt;
use mockable::DefaultClock;
use rstest::rstest;

fn kept_alive() -> CreateTaskRequest {
    CreateTaskRequest::new(OWNER, REPO_URL, "Add a health endpoint").keep_alive(true)
}

async fn finished_task(harness: &Harness, request: CreateTaskRequest) -> eyre::Result<TaskId> {
    let job = harness.orchestrator.create_task(request).await?;
    let task_id = job.task_id();
    let status = job.wait().await?;
    eyre::ensure!(status == TaskStatus::Completed, "first run ended as {status}");
    Ok(task_id)
}

#[rstest]
#[tokio::test]
async fn kept_alive_sandbox_survives_the_run() -> eyre::Result<()> {
    let harness = Harness::builder().agent(agent_with_session("sess-1")?).build();

    let task_id = finished_task(&harness, kept_alive()).await?;

    let task = harness.task(task_id).await?;
    assert_eq!(task.sandbox_id(), Some(&SandboxId::new("sbx-1")));
    assert_eq!(
        task.sandbox_url(),
        Some("https://sbx-1-3000.sandbox.test")
    );
    assert_eq!(task.agent_session_id(), Some(&AgentSessionId::new("sess-1")?));
    let sandbox = harness
        .sandboxes
        .sandbox(&SandboxId::new("sbx-1"))
        .ok_or_eyre("sandbox missing")?;
    assert_eq!(sandbox.shutdown_count(), 0);
    assert_eq!(harness.orchestrator.registry().len(), 1);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn follow_up_reconnects_and_resumes_the_session() -> eyre::Result<()> {
    let harness = Harness::builder().agent(agent_with_session("sess-1")?).build();
    let task_id = finished_task(&harness, kept_alive()).await?;
    let first_branch = harness.task(task_id).await?.branch_name().cloned();

    let job = harness
        .orchestrator
        .continue_task(ContinueTaskRequest::new(task_id, "Also document it"))
        .await?;
    let status = job.wait().await?;

    assert_eq!(status, TaskStatus::Completed);
    assert_eq!(harness.sandboxes.created().len(), 1, "no new sandbox");
    let requests = harness.agent.requests();
    let follow_up = requests.last().ok_or_eyre("agent not called")?;
    assert!(follow_up.is_resumed);
    assert_eq!(follow_up.session_id, Some(AgentSessionId::new("sess-1")?));
    assert_eq!(follow_up.prompt.as_str(), "Also document it");

    let task = harness.task(task_id).await?;
    assert_eq!(task.branch_name().cloned(), first_branch);
    assert_eq!(task.sandbox_id(), Some(&SandboxId::new("sbx-1")));
    let pushes = harness.publisher.pushes();
    let last_push = pushes.last().ok_or_eyre("no push")?;
    assert_eq!(last_push.message, "Also document it");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn expired_sandbox_is_replaced_with_history_prompt() -> eyre::Result<()> {
    let harness = Harness::builder().agent(agent_with_session("sess-1")?).build();
    let task_id = finished_task(&harness, kept_alive()).await?;
    harness.sandboxes.expire(&SandboxId::new("sbx-1"));

    let job = harness
        .orchestrator
        .continue_task(ContinueTaskRequest::new(task_id, "Also document it"))
        .await?;
    let status = job.wait().await?;

    assert_eq!(status, TaskStatus::Completed);
    let created = harness.sandboxes.created();
    assert_eq!(created.len(), 2);
    let old = created.first().ok_or_eyre("first sandbox missing")?;
    assert_eq!(old.shutdown_count(), 1, "stale sandbox retired once");

    let requests = harness.agent.requests();
    let follow_up = requests.last().ok_or_eyre("agent not called")?;
    assert!(!follow_up.is_resumed);
    assert!(follow_up.session_id.is_none());
    let prompt = follow_up.prompt.as_str();
    assert!(prompt.contains("Previous conversation:"));
    assert!(prompt.contains("user: Add a health endpoint"));
    assert!(prompt.ends_with("Also document it"));

    let task = harness.task(task_id).await?;
    assert_eq!(task.sandbox_id(), Some(&SandboxId::new("sbx-2")));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn follow_up_without_keep_alive_provisions_on_existing_branch() -> eyre::Result<()> {
    let harness = Harness::builder().build();
    let task_id = finished_task(
        &harness,
        CreateTaskRequest::new(OWNER, REPO_URL, "Add a health endpoint"),
    )
    .await?;
    let branch = harness
        .task(task_id)
        .await?
        .branch_name()
        .cloned()
        .ok_or_eyre("branch missing")?;

    let job = harness
        .orchestrator
        .continue_task(ContinueTaskRequest::new(task_id, "Rename the route"))
        .await?;
    job.wait().await?;

    let created = harness.sandboxes.created();
    assert_eq!(created.len(), 2);
    let second = created.last().ok_or_eyre("second sandbox missing")?;
    let fetch = format!("git fetch origin {branch}");
    assert!(second.commands().contains(&fetch));
    assert!(created.iter().all(|sandbox| sandbox.shutdown_count() == 1));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn follow_up_to_failed_task_clears_error() -> eyre::Result<()> {
    let harness = Harness::builder().build();
    let job = harness
        .orchestrator
        .create_task(CreateTaskRequest::new(OWNER, REPO_URL, "Add a health endpoint"))
        .await?;
    let task_id = job.task_id();
    job.wait().await?;
    harness
        .store
        .update(task_id, TaskUpdate::at(Utc::now()).status(TaskStatus::Processing))
        .await?;
    harness
        .store
        .update(task_id, TaskUpdate::failed(Utc::now(), "transient failure"))
        .await?;

    let job = harness
        .orchestrator
        .continue_task(ContinueTaskRequest::new(task_id, "Try again"))
        .await?;
    let status = job.wait().await?;

    assert_eq!(status, TaskStatus::Completed);
    let task = harness.task(task_id).await?;
    assert!(task.error().is_none());
    Ok(())
}

#[rstest]
#[tokio::test]
async fn blank_follow_up_is_rejected() -> eyre::Result<()> {
    let harness = Harness::builder().build();
    let task_id = finished_task(
        &harness,
        CreateTaskRequest::new(OWNER, REPO_URL, "Add a health endpoint"),
    )
    .await?;

    let result = harness
        .orchestrator
        .continue_task(ContinueTaskRequest::new(task_id, "  \n"))
        .await;

    assert!(result.is_err_and(|err| err.is_validation()));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn unknown_task_cannot_be_continued() {
    let harness = Harness::builder().build();
    let missing = TaskId::new();

    let result = harness
        .orchestrator
        .continue_task(ContinueTaskRequest::new(missing, "Hello"))
        .await;

    assert!(matches!(result, Err(OrchestratorError::NotFound(id)) if id == missing));
}

#[rstest]
#[tokio::test]
async fn task_without_branch_cannot_be_continued() -> eyre::Result<()> {
    let harness = Harness::builder().build();
    let task = Task::new(
        NewTask {
            owner_id: UserId::new(OWNER)?,
            prompt: "Add a health endpoint".to_owned(),
            repo_url: RepositoryUrl::new(REPO_URL)?,
            agent: AgentKind::Claude,
            model: None,
            max_duration: MaxDuration::DEFAULT,
            keep_alive: false,
            install_dependencies: false,
        },
        &DefaultClock,
    )?;
    harness.store.create(&task).await?;
    harness
        .store
        .update(task.id(), TaskUpdate::at(Utc::now()).status(TaskStatus::Processing))
        .await?;
    harness
        .store
        .update(task.id(), TaskUpdate::failed(Utc::now(), "sandbox quota exhausted"))
        .await?;

    let result = harness
        .orchestrator
        .continue_task(ContinueTaskRequest::new(task.id(), "Retry"))
        .await;

    assert!(matches!(
        result,
        Err(OrchestratorError::Validation(ValidationError::MissingBranchName(id))) if id == task.id()
    ));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn follow_ups_count_against_the_quota() -> eyre::Result<()> {
    let harness = Harness::builder().quota(1).build();
    let task_id = finished_task(
        &harness,
        CreateTaskRequest::new(OWNER, REPO_URL, "Add a health endpoint"),
    )
    .await?;

    let result = harness
        .orchestrator
        .continue_task(ContinueTaskRequest::new(task_id, "One more thing"))
        .await;

    assert!(matches!(result, Err(OrchestratorError::RateLimitExceeded { .. })));
    let task = harness.task(task_id).await?;
    assert_eq!(task.status(), TaskStatus::Completed, "task left untouched");
    Ok(())
}
