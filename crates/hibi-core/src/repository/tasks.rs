use crate::error::CoreError;
use crate::models::{NewTaskData, Task};
use crate::repository::{SqliteRepository, TaskRepository};
use crate::state::TaskSnapshot;
use crate::validation::{normalize_description, validate_title};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

#[async_trait]
impl TaskRepository for SqliteRepository {
    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError> {
        validate_title(&data.title)?;

        let task = Task {
            id: Uuid::now_v7(),
            owner_id: data.owner_id,
            title: data.title,
            description: normalize_description(data.description),
            due_date: data.due_date,
            created_at: Utc::now(),
            ..Default::default()
        };

        let mut tx = self.pool().begin().await?;
        let task = Self::insert_task_in_transaction(&mut tx, &task).await?;
        tx.commit().await?;

        tracing::debug!(task = %task.id, "added task");
        Ok(task)
    }

    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError> {
        let task = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(task)
    }

    async fn find_tasks_by_owner(&self, owner_id: Uuid) -> Result<Vec<Task>, CoreError> {
        let tasks = sqlx::query_as(
            "SELECT * FROM tasks WHERE owner_id = $1 ORDER BY created_at, rowid",
        )
        .bind(owner_id)
        .fetch_all(self.pool())
        .await?;
        Ok(tasks)
    }

    async fn snapshot(&self, owner_id: Uuid) -> Result<TaskSnapshot, CoreError> {
        let taken_at = Utc::now();
        let tasks = self.find_tasks_by_owner(owner_id).await?;
        Ok(TaskSnapshot {
            owner_id,
            tasks,
            taken_at,
        })
    }

    async fn toggle_done(&self, id: Uuid) -> Result<Task, CoreError> {
        let mut tx = self.pool().begin().await?;

        let current = Self::find_task_by_id_in_transaction(&mut tx, id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        let done = !current.done;
        let completed_at = done.then(Utc::now);

        let updated: Task = sqlx::query_as(
            r#"UPDATE tasks
            SET done = $1, completed_at = $2
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(done)
        .bind(completed_at)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }
}

impl SqliteRepository {
    pub(crate) async fn find_task_by_id_in_transaction(
        tx: &mut Transaction<'_, Sqlite>,
        id: Uuid,
    ) -> Result<Option<Task>, CoreError> {
        let task = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(task)
    }

    /// Inserts a fully built record as-is.
    pub(crate) async fn insert_task_in_transaction(
        tx: &mut Transaction<'_, Sqlite>,
        task: &Task,
    ) -> Result<Task, CoreError> {
        let inserted: Task = sqlx::query_as(
            r#"
            INSERT INTO tasks (id, owner_id, title, description, due_date, done, completed_at,
                               is_repeating, parent_id, created_at, last_reminder_sent_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(task.id)
        .bind(task.owner_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.due_date)
        .bind(task.done)
        .bind(task.completed_at)
        .bind(task.is_repeating)
        .bind(task.parent_id)
        .bind(task.created_at)
        .bind(task.last_reminder_sent_at)
        .fetch_one(&mut **tx)
        .await?;
        Ok(inserted)
    }
}
