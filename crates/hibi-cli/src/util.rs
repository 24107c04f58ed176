use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use hibi_core::error::CoreError;
use hibi_core::models::UserProfile;
use hibi_core::repository::{Repository, UserRepository};
use hibi_core::state::{AppState, TaskFeed};
use hibi_core::timezone::local_date;
use uuid::Uuid;

use crate::config::Config;

/// The profile commands act on.
///
/// `user_email` selects it explicitly; otherwise a single existing profile is
/// used. Without any profile, tasks belong to the local owner (nil id).
pub async fn resolve_owner(repo: &impl Repository, config: &Config) -> Result<Option<UserProfile>> {
    if let Some(email) = &config.user_email {
        return match repo.find_user_by_email(email).await? {
            Some(user) => Ok(Some(user)),
            None => Err(anyhow!(CoreError::NotFound(format!(
                "No profile for '{}'. Create one with `hibi user init {}`",
                email, email
            )))),
        };
    }

    let mut users = repo.find_users().await?;
    match users.len() {
        0 => Ok(None),
        1 => Ok(users.pop()),
        _ => Err(anyhow!(CoreError::InvalidInput(
            "Several profiles exist. Set HIBI_USER_EMAIL to pick one".to_string()
        ))),
    }
}

pub async fn resolve_owner_id(repo: &impl Repository, config: &Config) -> Result<Uuid> {
    Ok(resolve_owner(repo, config).await?.map_or(Uuid::nil(), |u| u.id))
}

/// Loads the owner's tasks into a fresh [`AppState`].
pub async fn load_state(repo: &(impl Repository + Sync), owner_id: Uuid) -> Result<AppState> {
    let feed = TaskFeed::new(owner_id);
    let mut state = AppState::new(feed.current());
    state.replace(feed.refresh(repo).await?);
    Ok(state)
}

pub fn resolve_task_id(state: &AppState, short_id: &str) -> Result<Uuid> {
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    let tasks = state.find_by_prefix(short_id);
    if tasks.len() == 1 {
        Ok(tasks[0].id)
    } else if tasks.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No task found with ID prefix '{}'",
            short_id
        ))))
    } else {
        let task_info: Vec<(String, String)> = tasks
            .into_iter()
            .map(|t| (t.id.to_string(), t.title.clone()))
            .collect();
        Err(anyhow!(CoreError::AmbiguousId(task_info)))
    }
}

pub fn today(config: &Config) -> Result<NaiveDate> {
    Ok(local_date(&config.timezone, Utc::now())?)
}
