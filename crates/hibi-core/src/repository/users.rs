use crate::error::CoreError;
use crate::models::{NewUserData, UpdateProfileData, UserProfile};
use crate::repository::{SqliteRepository, UserRepository};
use crate::validation::{validate_display_name, validate_email, validate_favorite_quote};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn add_user(&self, data: NewUserData) -> Result<UserProfile, CoreError> {
        let email = data.email.trim().to_lowercase();
        validate_email(&email)?;
        let display_name = blank_to_none(data.display_name);
        if let Some(name) = &display_name {
            validate_display_name(name)?;
        }

        if self.find_user_by_email(&email).await?.is_some() {
            return Err(CoreError::InvalidInput(format!("A profile for {} already exists", email)));
        }

        let user: UserProfile = sqlx::query_as(
            r#"INSERT INTO users (id, email, display_name, avatar, favorite_quote, created_at)
            VALUES ($1, $2, $3, NULL, NULL, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&email)
        .bind(&display_name)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await?;

        tracing::info!(user = %user.id, "created profile");
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, CoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserProfile>, CoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    async fn find_users(&self) -> Result<Vec<UserProfile>, CoreError> {
        let users = sqlx::query_as("SELECT * FROM users ORDER BY created_at, rowid")
            .fetch_all(self.pool())
            .await?;
        Ok(users)
    }

    async fn update_profile(&self, id: Uuid, data: UpdateProfileData) -> Result<UserProfile, CoreError> {
        let display_name = data.display_name.map(blank_to_none);
        let avatar = data.avatar.map(blank_to_none);
        let favorite_quote = data.favorite_quote.map(blank_to_none);

        if let Some(Some(name)) = &display_name {
            validate_display_name(name)?;
        }
        if let Some(Some(quote)) = &favorite_quote {
            validate_favorite_quote(quote)?;
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut updated = false;

        for (column, value) in [
            ("display_name", display_name),
            ("avatar", avatar),
            ("favorite_quote", favorite_quote),
        ] {
            if let Some(value) = value {
                if updated {
                    qb.push(", ");
                }
                qb.push(column);
                qb.push(" = ");
                qb.push_bind(value);
                updated = true;
            }
        }

        if !updated {
            return self
                .find_user_by_id(id)
                .await?
                .ok_or_else(|| CoreError::NotFound(id.to_string()));
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING *");

        qb.build_query_as::<UserProfile>()
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    async fn delete_user(&self, id: Uuid) -> Result<usize, CoreError> {
        if self.find_user_by_id(id).await?.is_none() {
            return Err(CoreError::NotFound(id.to_string()));
        }

        let ids: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM tasks WHERE owner_id = $1 ORDER BY created_at, rowid")
            .bind(id)
            .fetch_all(self.pool())
            .await?;
        let deleted = self.delete_ids_in_batches(&ids).await?;

        // Profile last: a failed run leaves it in place for another attempt.
        sqlx::query("DELETE FROM outbox WHERE owner_id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        tracing::info!(user = %id, tasks = deleted, "deleted profile");
        Ok(deleted)
    }
}
