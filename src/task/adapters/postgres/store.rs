//! `PostgreSQL` store implementation for task lifecycle storage.

use super::{
    conversion::{log_to_row, message_to_row, row_to_log, row_to_message, row_to_task, task_to_row},
    models::{TaskLogRow, TaskMessageRow, TaskRow},
    schema::{task_logs, task_messages, tasks},
};
use crate::task::{
    domain::{BranchName, MessageOrder, Task, TaskId, TaskLogEntry, TaskMessage, TaskUpdate},
    ports::{TaskStore, TaskStoreError, TaskStoreResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task store.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: TaskPgPool,
}

impl PostgresTaskStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskStoreError::persistence)?
    }
}

/// Transaction error wrapper so diesel can roll back on domain failures.
enum TxError {
    Store(TaskStoreError),
    Diesel(DieselError),
}

impl From<DieselError> for TxError {
    fn from(err: DieselError) -> Self {
        Self::Diesel(err)
    }
}

impl From<TaskStoreError> for TxError {
    fn from(err: TaskStoreError) -> Self {
        Self::Store(err)
    }
}

impl From<TxError> for TaskStoreError {
    fn from(err: TxError) -> Self {
        match err {
            TxError::Store(store) => store,
            TxError::Diesel(diesel) => Self::persistence(diesel),
        }
    }
}

fn lock_task(connection: &mut PgConnection, id: TaskId) -> Result<Task, TxError> {
    let row = tasks::table
        .filter(tasks::id.eq(id.into_inner()))
        .select(TaskRow::as_select())
        .for_update()
        .first::<TaskRow>(connection)
        .optional()?
        .ok_or(TaskStoreError::NotFound(id))?;
    Ok(row_to_task(row)?)
}

fn ensure_task_exists(connection: &mut PgConnection, id: TaskId) -> TaskStoreResult<()> {
    let found = tasks::table
        .filter(tasks::id.eq(id.into_inner()))
        .select(tasks::id)
        .first::<uuid::Uuid>(connection)
        .optional()
        .map_err(TaskStoreError::persistence)?;
    found.map(|_| ()).ok_or(TaskStoreError::NotFound(id))
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn create(&self, task: &Task) -> TaskStoreResult<()> {
        let task_id = task.id();
        let row = task_to_row(task)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskStoreError::DuplicateTask(task_id)
                    }
                    _ => TaskStoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn get(&self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskStoreError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn update(&self, id: TaskId, update: TaskUpdate) -> TaskStoreResult<Task> {
        self.run_blocking(move |connection| {
            connection
                .transaction::<Task, TxError, _>(|tx| {
                    let mut task = lock_task(tx, id)?;
                    task.apply(update).map_err(TaskStoreError::from)?;
                    let row = task_to_row(&task)?;
                    diesel::update(tasks::table.filter(tasks::id.eq(id.into_inner())))
                        .set(&row)
                        .execute(tx)?;
                    Ok(task)
                })
                .map_err(TaskStoreError::from)
        })
        .await
    }

    async fn claim_branch_name(
        &self,
        id: TaskId,
        candidate: BranchName,
        at: DateTime<Utc>,
    ) -> TaskStoreResult<BranchName> {
        self.run_blocking(move |connection| {
            connection
                .transaction::<BranchName, TxError, _>(|tx| {
                    let mut task = lock_task(tx, id)?;
                    let claimed = task.claim_branch_name(candidate, at);
                    diesel::update(tasks::table.filter(tasks::id.eq(id.into_inner())))
                        .set((
                            tasks::branch_name.eq(claimed.as_str()),
                            tasks::updated_at.eq(task.updated_at()),
                        ))
                        .execute(tx)?;
                    Ok(claimed)
                })
                .map_err(TaskStoreError::from)
        })
        .await
    }

    async fn append_log(&self, id: TaskId, entry: TaskLogEntry) -> TaskStoreResult<()> {
        let row = log_to_row(id, entry);
        self.run_blocking(move |connection| {
            ensure_task_exists(connection, id)?;
            diesel::insert_into(task_logs::table)
                .values(&row)
                .execute(connection)
                .map_err(TaskStoreError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn list_logs(&self, id: TaskId) -> TaskStoreResult<Vec<TaskLogEntry>> {
        self.run_blocking(move |connection| {
            let rows = task_logs::table
                .filter(task_logs::task_id.eq(id.into_inner()))
                .order(task_logs::id.asc())
                .select(TaskLogRow::as_select())
                .load::<TaskLogRow>(connection)
                .map_err(TaskStoreError::persistence)?;
            rows.into_iter().map(row_to_log).collect()
        })
        .await
    }

    async fn insert_message(&self, message: &TaskMessage) -> TaskStoreResult<()> {
        let task_id = message.task_id();
        let row = message_to_row(message);
        self.run_blocking(move |connection| {
            ensure_task_exists(connection, task_id)?;
            diesel::insert_into(task_messages::table)
                .values(&row)
                .execute(connection)
                .map_err(TaskStoreError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn list_messages(
        &self,
        id: TaskId,
        order: MessageOrder,
        limit: Option<usize>,
    ) -> TaskStoreResult<Vec<TaskMessage>> {
        let row_limit = limit
            .map(i64::try_from)
            .transpose()
            .map_err(TaskStoreError::persistence)?;
        self.run_blocking(move |connection| {
            let mut query = task_messages::table
                .filter(task_messages::task_id.eq(id.into_inner()))
                .select(TaskMessageRow::as_select())
                .into_boxed();
            query = match order {
                MessageOrder::Ascending => query.order(task_messages::created_at.asc()),
                MessageOrder::Descending => query.order(task_messages::created_at.desc()),
            };
            if let Some(max) = row_limit {
                query = query.limit(max);
            }
            let rows = query
                .load::<TaskMessageRow>(connection)
                .map_err(TaskStoreError::persistence)?;
            rows.into_iter().map(row_to_message).collect()
        })
        .await
    }
}
