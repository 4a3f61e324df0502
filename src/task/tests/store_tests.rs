//! Tests for the in-memory task store.

#![expect(
    clippy::panic_in_result_fn,
    reason = "Tests assert on outcomes while propagating setup errors with `?`"
)]

use crate::agent::domain::AgentKind;
use crate::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{
        BranchName, LogLevel, MaxDuration, MessageOrder, MessageRole, NewTask, RepositoryUrl,
        Task, TaskId, TaskLogEntry, TaskMessage, TaskStatus, TaskUpdate, UserId,
    },
    ports::{TaskStore, TaskStoreError},
};
use chrono::Utc;
use eyre::Result;
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn task() -> Task {
    Task::new(
        NewTask {
            owner_id: UserId::new("user-1").expect("valid owner"),
            prompt: "Rename the config loader".to_owned(),
            repo_url: RepositoryUrl::new("https://github.com/acme/api").expect("valid url"),
            agent: AgentKind::Codex,
            model: None,
            max_duration: MaxDuration::DEFAULT,
            keep_alive: true,
            install_dependencies: false,
        },
        &DefaultClock,
    )
    .expect("valid task")
}

#[rstest]
#[tokio::test]
async fn create_rejects_duplicates(task: Task) -> Result<()> {
    let store = InMemoryTaskStore::new();
    store.create(&task).await?;

    let result = store.create(&task).await;

    assert!(matches!(result, Err(TaskStoreError::DuplicateTask(id)) if id == task.id()));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn update_applies_patch_to_current_record(task: Task) -> Result<()> {
    let store = InMemoryTaskStore::new();
    store.create(&task).await?;

    let updated = store
        .update(
            task.id(),
            TaskUpdate::at(Utc::now())
                .status(TaskStatus::Processing)
                .message("Task started"),
        )
        .await?;
    let loaded = store.get(task.id()).await?.expect("task exists");

    assert_eq!(updated, loaded);
    assert_eq!(loaded.status(), TaskStatus::Processing);
    assert_eq!(loaded.status_message(), Some("Task started"));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn update_rejects_invalid_transition(task: Task) -> Result<()> {
    let store = InMemoryTaskStore::new();
    store.create(&task).await?;

    let result = store
        .update(task.id(), TaskUpdate::completed(Utc::now()))
        .await;

    assert!(matches!(result, Err(TaskStoreError::Domain(_))));
    let loaded = store.get(task.id()).await?.expect("task exists");
    assert_eq!(loaded.status(), TaskStatus::Pending);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn update_of_unknown_task_is_not_found() {
    let store = InMemoryTaskStore::new();
    let missing = TaskId::new();

    let result = store.update(missing, TaskUpdate::at(Utc::now())).await;

    assert!(matches!(result, Err(TaskStoreError::NotFound(id)) if id == missing));
}

#[rstest]
#[tokio::test]
async fn claim_branch_name_keeps_first_value(task: Task) -> Result<()> {
    let store = InMemoryTaskStore::new();
    store.create(&task).await?;
    let generated = BranchName::new("feature/rename-loader")?;

    let first = store
        .claim_branch_name(task.id(), generated.clone(), Utc::now())
        .await?;
    let second = store
        .claim_branch_name(task.id(), BranchName::fallback(task.id(), Utc::now()), Utc::now())
        .await?;

    assert_eq!(first, generated);
    assert_eq!(second, generated);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn messages_are_listed_in_requested_order(task: Task) -> Result<()> {
    let store = InMemoryTaskStore::new();
    store.create(&task).await?;
    for (role, text) in [
        (MessageRole::User, "one"),
        (MessageRole::Agent, "two"),
        (MessageRole::User, "three"),
    ] {
        store
            .insert_message(&TaskMessage::new(task.id(), role, text, &DefaultClock)?)
            .await?;
    }

    let ascending = store
        .list_messages(task.id(), MessageOrder::Ascending, None)
        .await?;
    let latest_two = store
        .list_messages(task.id(), MessageOrder::Descending, Some(2))
        .await?;

    let contents: Vec<&str> = ascending.iter().map(TaskMessage::content).collect();
    assert_eq!(contents, ["one", "two", "three"]);
    let recent: Vec<&str> = latest_two.iter().map(TaskMessage::content).collect();
    assert_eq!(recent, ["three", "two"]);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn logs_require_an_existing_task(task: Task) -> Result<()> {
    let store = InMemoryTaskStore::new();
    let entry = TaskLogEntry::new(LogLevel::Info, "hello", Utc::now());

    let orphan = store.append_log(task.id(), entry.clone()).await;
    assert!(matches!(orphan, Err(TaskStoreError::NotFound(_))));

    store.create(&task).await?;
    store.append_log(task.id(), entry.clone()).await?;
    assert_eq!(store.list_logs(task.id()).await?, vec![entry]);
    Ok(())
}
