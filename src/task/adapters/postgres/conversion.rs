//! Conversions between task domain values and diesel rows.

use super::models::{NewTaskLogRow, TaskLogRow, TaskMessageRow, TaskRow};
use crate::agent::domain::{AgentKind, AgentSessionId, ModelId};
use crate::sandbox::domain::SandboxId;
use crate::task::{
    domain::{
        BranchName, LogLevel, MaxDuration, MessageRole, PersistedTaskData, Progress,
        RepositoryUrl, Task, TaskId, TaskLogEntry, TaskMessage, TaskStatus, UserId,
    },
    ports::{TaskStoreError, TaskStoreResult},
};

pub(super) fn task_to_row(task: &Task) -> TaskStoreResult<TaskRow> {
    let max_duration_minutes = i32::try_from(task.max_duration().minutes())
        .map_err(TaskStoreError::persistence)?;

    Ok(TaskRow {
        id: task.id().into_inner(),
        owner_id: task.owner_id().as_str().to_owned(),
        prompt: task.prompt().to_owned(),
        title: task.title().to_owned(),
        repo_url: task.repo_url().as_str().to_owned(),
        branch_name: task.branch_name().map(|name| name.as_str().to_owned()),
        agent: task.agent().as_str().to_owned(),
        model: task.model().map(|model| model.as_str().to_owned()),
        max_duration_minutes,
        keep_alive: task.keep_alive(),
        install_dependencies: task.install_dependencies(),
        status: task.status().as_str().to_owned(),
        progress: i16::from(task.progress().value()),
        status_message: task.status_message().map(str::to_owned),
        sandbox_id: task.sandbox_id().map(|id| id.as_str().to_owned()),
        sandbox_url: task.sandbox_url().map(str::to_owned),
        preview_url: task.preview_url().map(str::to_owned),
        agent_session_id: task.agent_session_id().map(|id| id.as_str().to_owned()),
        error: task.error().map(str::to_owned),
        deleted_at: task.deleted_at(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
        completed_at: task.completed_at(),
    })
}

pub(super) fn row_to_task(row: TaskRow) -> TaskStoreResult<Task> {
    let progress_value = u8::try_from(row.progress).map_err(TaskStoreError::persistence)?;
    let minutes = u32::try_from(row.max_duration_minutes).map_err(TaskStoreError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        owner_id: UserId::new(row.owner_id)?,
        prompt: row.prompt,
        title: row.title,
        repo_url: RepositoryUrl::new(row.repo_url)?,
        branch_name: row.branch_name.map(BranchName::new).transpose()?,
        agent: AgentKind::try_from(row.agent.as_str()).map_err(TaskStoreError::persistence)?,
        model: row
            .model
            .map(ModelId::new)
            .transpose()
            .map_err(TaskStoreError::persistence)?,
        max_duration: MaxDuration::from_minutes(minutes)?,
        keep_alive: row.keep_alive,
        install_dependencies: row.install_dependencies,
        status: TaskStatus::try_from(row.status.as_str()).map_err(TaskStoreError::persistence)?,
        progress: Progress::new(progress_value)?,
        status_message: row.status_message,
        sandbox_id: row.sandbox_id.map(SandboxId::new),
        sandbox_url: row.sandbox_url,
        preview_url: row.preview_url,
        agent_session_id: row
            .agent_session_id
            .map(AgentSessionId::new)
            .transpose()
            .map_err(TaskStoreError::persistence)?,
        error: row.error,
        deleted_at: row.deleted_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
        completed_at: row.completed_at,
    };
    Ok(Task::from_persisted(data))
}

pub(super) fn message_to_row(message: &TaskMessage) -> TaskMessageRow {
    TaskMessageRow {
        id: message.id(),
        task_id: message.task_id().into_inner(),
        role: message.role().as_str().to_owned(),
        content: message.content().to_owned(),
        created_at: message.created_at(),
    }
}

pub(super) fn row_to_message(row: TaskMessageRow) -> TaskStoreResult<TaskMessage> {
    let role = MessageRole::try_from(row.role.as_str()).map_err(TaskStoreError::persistence)?;
    Ok(TaskMessage::from_persisted(
        row.id,
        TaskId::from_uuid(row.task_id),
        role,
        row.content,
        row.created_at,
    ))
}

pub(super) fn log_to_row(task_id: TaskId, entry: TaskLogEntry) -> NewTaskLogRow {
    NewTaskLogRow {
        task_id: task_id.into_inner(),
        level: entry.level.as_str().to_owned(),
        message: entry.message,
        created_at: entry.timestamp,
    }
}

pub(super) fn row_to_log(row: TaskLogRow) -> TaskStoreResult<TaskLogEntry> {
    let level = LogLevel::try_from(row.level.as_str()).map_err(TaskStoreError::persistence)?;
    Ok(TaskLogEntry::new(level, row.message, row.created_at))
}
