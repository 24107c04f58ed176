use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{
    DeleteMode, EditScope, NewTaskData, NewUserData, OutboxMessage, StoreConfig, Task, TaskEdit,
    UpdateProfileData, UserProfile,
};
use crate::reminder::ReminderDigest;
use crate::state::TaskSnapshot;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

// Re-export domain modules
pub mod tasks;
pub mod series;
pub mod users;
pub mod reminders;

// Traits are defined in this module and implemented in respective domain modules

/// Domain-specific trait for single-record task operations
#[async_trait]
pub trait TaskRepository {
    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError>;
    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError>;
    async fn find_tasks_by_owner(&self, owner_id: Uuid) -> Result<Vec<Task>, CoreError>;
    async fn snapshot(&self, owner_id: Uuid) -> Result<TaskSnapshot, CoreError>;
    async fn toggle_done(&self, id: Uuid) -> Result<Task, CoreError>;
}

/// Domain-specific trait for recurring series operations
#[async_trait]
pub trait SeriesRepository {
    /// Writes a head and its members in one transaction and returns the head.
    async fn create_series(&self, data: NewTaskData) -> Result<Task, CoreError>;
    /// Head (if it still exists) and members of a series, in creation order.
    async fn find_series_records(&self, series_id: Uuid) -> Result<Vec<Task>, CoreError>;
    /// Applies `edit` to the records selected by `scope` and returns them.
    async fn edit_task(&self, id: Uuid, edit: TaskEdit, scope: EditScope) -> Result<Vec<Task>, CoreError>;
    /// Deletes the records selected by `mode` and returns how many went away.
    async fn delete_task(&self, id: Uuid, mode: DeleteMode) -> Result<usize, CoreError>;
}

/// Domain-specific trait for user profiles
#[async_trait]
pub trait UserRepository {
    async fn add_user(&self, data: NewUserData) -> Result<UserProfile, CoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, CoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserProfile>, CoreError>;
    async fn find_users(&self) -> Result<Vec<UserProfile>, CoreError>;
    async fn update_profile(&self, id: Uuid, data: UpdateProfileData) -> Result<UserProfile, CoreError>;
    /// Removes the profile and every task it owns; returns the task count.
    async fn delete_user(&self, id: Uuid) -> Result<usize, CoreError>;
}

/// Domain-specific trait for the reminder digest job
#[async_trait]
pub trait ReminderRepository {
    async fn find_reminder_candidates(&self, today: NaiveDate) -> Result<Vec<Task>, CoreError>;
    /// Digests that `run_reminders` would send, without writing anything.
    async fn pending_reminders(&self, today: NaiveDate, now: DateTime<Utc>) -> Result<Vec<ReminderDigest>, CoreError>;
    /// Queues digests in the outbox and stamps the included tasks.
    async fn run_reminders(&self, today: NaiveDate, now: DateTime<Utc>) -> Result<Vec<ReminderDigest>, CoreError>;
    async fn find_outbox(&self, owner_id: Option<Uuid>) -> Result<Vec<OutboxMessage>, CoreError>;
}

/// Main repository trait that composes all domain traits
#[async_trait]
pub trait Repository:
    TaskRepository +
    SeriesRepository +
    UserRepository +
    ReminderRepository
{
    // This trait automatically composes all domain-specific repositories
    // Individual domain operations are defined in their respective traits
}

/// SQLite implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
    config: StoreConfig,
}

impl SqliteRepository {
    pub fn new(pool: DbPool, config: StoreConfig) -> Self {
        Self { pool, config }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub(crate) fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub(crate) fn batch_size(&self) -> usize {
        self.config.delete_batch_size.max(1)
    }

    /// Deletes `ids` in sequential chunks, one transaction per chunk.
    ///
    /// A failure leaves earlier chunks committed; every remaining record is
    /// still reachable and can be deleted again.
    pub(crate) async fn delete_ids_in_batches(&self, ids: &[Uuid]) -> Result<usize, CoreError> {
        let mut deleted = 0;
        for (batch, chunk) in ids.chunks(self.batch_size()).enumerate() {
            let mut tx = self.pool().begin().await?;
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("DELETE FROM tasks WHERE id IN ");
            push_id_list(&mut qb, chunk);
            let result = qb.build().execute(&mut *tx).await?;
            tx.commit().await?;

            deleted += result.rows_affected() as usize;
            tracing::info!(batch, records = chunk.len(), "committed delete batch");
        }
        Ok(deleted)
    }
}

/// Appends `(?, ?, ...)` with `ids` bound.
pub(crate) fn push_id_list(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[Uuid]) {
    qb.push("(");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

// The main Repository trait implementation will automatically be available
// when all domain trait implementations are defined
impl Repository for SqliteRepository {}
