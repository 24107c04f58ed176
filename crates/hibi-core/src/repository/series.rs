use crate::error::CoreError;
use crate::models::{DeleteMode, EditScope, NewTaskData, Task, TaskEdit};
use crate::repository::{push_id_list, SeriesRepository, SqliteRepository};
use crate::series::{plan_series, resolve_due_date_change, select_delete_targets, select_edit_targets};
use crate::validation::{normalize_description, validate_title};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{Executor, QueryBuilder, Sqlite, Transaction};
use uuid::Uuid;

#[async_trait]
impl SeriesRepository for SqliteRepository {
    async fn create_series(&self, data: NewTaskData) -> Result<Task, CoreError> {
        // Validation happens while planning, before the transaction opens.
        let records = plan_series(&data, Utc::now())?;

        let mut tx = self.pool().begin().await?;
        let mut inserted = Vec::with_capacity(records.len());
        for record in &records {
            inserted.push(Self::insert_task_in_transaction(&mut tx, record).await?);
        }
        tx.commit().await?;

        let head = inserted
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::InvalidInput("Series expansion produced no records".to_string()))?;
        tracing::info!(series = %head.id, records = records.len(), "created series");
        Ok(head)
    }

    async fn find_series_records(&self, series_id: Uuid) -> Result<Vec<Task>, CoreError> {
        Self::fetch_series_records(self.pool(), series_id).await
    }

    async fn edit_task(&self, id: Uuid, edit: TaskEdit, scope: EditScope) -> Result<Vec<Task>, CoreError> {
        validate_title(&edit.title)?;
        let description = normalize_description(edit.description.clone());

        let mut tx = self.pool().begin().await?;

        let target = Self::find_task_by_id_in_transaction(&mut tx, id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        let due_date = resolve_due_date_change(&target, &edit, scope)?;

        let ids = match scope {
            EditScope::Single => vec![target.id],
            _ => {
                let records = Self::fetch_series_records(&mut *tx, target.series_id()).await?;
                select_edit_targets(&records, &target, scope)
            }
        };

        Self::update_task_fields(&mut tx, &ids, &edit.title, description.as_deref(), due_date).await?;

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM tasks WHERE id IN ");
        push_id_list(&mut qb, &ids);
        qb.push(" ORDER BY created_at, rowid");
        let updated: Vec<Task> = qb.build_query_as().fetch_all(&mut *tx).await?;

        tx.commit().await?;

        tracing::info!(task = %id, %scope, records = updated.len(), "edited task");
        Ok(updated)
    }

    async fn delete_task(&self, id: Uuid, mode: DeleteMode) -> Result<usize, CoreError> {
        let target = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        let ids = match mode {
            DeleteMode::Single => vec![target.id],
            _ => {
                let records = self.find_series_records(target.series_id()).await?;
                select_delete_targets(&records, &target, mode)
            }
        };

        if target.is_series_head() && mode == DeleteMode::Single {
            tracing::warn!(series = %target.id, "deleting series head; members are kept as orphans");
        }

        let deleted = self.delete_ids_in_batches(&ids).await?;
        tracing::info!(task = %id, %mode, deleted, "deleted tasks");
        Ok(deleted)
    }
}

impl SqliteRepository {
    /// Head and members of a series, on the pool or inside a transaction.
    async fn fetch_series_records<'e, E>(executor: E, series_id: Uuid) -> Result<Vec<Task>, CoreError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let records = sqlx::query_as(
            "SELECT * FROM tasks WHERE id = $1 OR parent_id = $1 ORDER BY created_at, rowid",
        )
        .bind(series_id)
        .fetch_all(executor)
        .await?;
        Ok(records)
    }

    /// Writes title and description to every id, and the due date when one
    /// was resolved.
    async fn update_task_fields(
        tx: &mut Transaction<'_, Sqlite>,
        ids: &[Uuid],
        title: &str,
        description: Option<&str>,
        due_date: Option<Option<NaiveDate>>,
    ) -> Result<(), CoreError> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE tasks SET title = ");
        qb.push_bind(title.to_string());
        qb.push(", description = ");
        qb.push_bind(description.map(str::to_string));

        if let Some(due_date) = due_date {
            qb.push(", due_date = ");
            qb.push_bind(due_date);
        }

        qb.push(" WHERE id IN ");
        push_id_list(&mut qb, ids);

        qb.build().execute(&mut **tx).await?;
        Ok(())
    }
}
