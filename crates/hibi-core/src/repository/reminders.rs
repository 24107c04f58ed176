use crate::error::CoreError;
use crate::models::{OutboxMessage, Task};
use crate::reminder::{plan_reminders, ReminderDigest};
use crate::repository::{push_id_list, ReminderRepository, SqliteRepository, UserRepository};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

#[async_trait]
impl ReminderRepository for SqliteRepository {
    async fn find_reminder_candidates(&self, today: NaiveDate) -> Result<Vec<Task>, CoreError> {
        let tasks = sqlx::query_as(
            r#"SELECT * FROM tasks
            WHERE done = 0 AND (due_date IS NULL OR due_date < $1)
            ORDER BY created_at, rowid
            "#,
        )
        .bind(today)
        .fetch_all(self.pool())
        .await?;
        Ok(tasks)
    }

    async fn pending_reminders(&self, today: NaiveDate, now: DateTime<Utc>) -> Result<Vec<ReminderDigest>, CoreError> {
        let candidates = self.find_reminder_candidates(today).await?;
        let users = self.find_users().await?;
        Ok(plan_reminders(&candidates, &users, today, now, self.config().reminder_interval))
    }

    async fn run_reminders(&self, today: NaiveDate, now: DateTime<Utc>) -> Result<Vec<ReminderDigest>, CoreError> {
        let digests = self.pending_reminders(today, now).await?;
        if digests.is_empty() {
            tracing::info!("no reminders due");
            return Ok(digests);
        }

        let mut tx = self.pool().begin().await?;

        for digest in &digests {
            sqlx::query(
                r#"INSERT INTO outbox (id, owner_id, to_address, subject, body, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)"#,
            )
            .bind(Uuid::now_v7())
            .bind(digest.owner_id)
            .bind(&digest.to_address)
            .bind(digest.subject())
            .bind(digest.body())
            .bind(now)
            .execute(&mut *tx)
            .await?;

            let ids: Vec<Uuid> = digest.task_ids().collect();
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE tasks SET last_reminder_sent_at = ");
            qb.push_bind(now);
            qb.push(" WHERE id IN ");
            push_id_list(&mut qb, &ids);
            qb.build().execute(&mut *tx).await?;

            tracing::info!(owner = %digest.owner_id, tasks = ids.len(), "queued reminder digest");
        }

        tx.commit().await?;
        Ok(digests)
    }

    async fn find_outbox(&self, owner_id: Option<Uuid>) -> Result<Vec<OutboxMessage>, CoreError> {
        let messages = match owner_id {
            Some(owner_id) => {
                sqlx::query_as("SELECT * FROM outbox WHERE owner_id = $1 ORDER BY created_at, rowid")
                    .bind(owner_id)
                    .fetch_all(self.pool())
                    .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM outbox ORDER BY created_at, rowid")
                    .fetch_all(self.pool())
                    .await?
            }
        };
        Ok(messages)
    }
}
