use anyhow::Result;
use chrono_humanize::Humanize;
use hibi_core::repository::{Repository, TaskRepository};

use crate::cli::DoCommand;
use crate::config::Config;
use crate::util::{load_state, resolve_owner_id, resolve_task_id};

pub async fn do_task(repo: &(impl Repository + Sync), command: DoCommand, config: &Config) -> Result<()> {
    let state = load_state(repo, resolve_owner_id(repo, config).await?).await?;
    let task_id = resolve_task_id(&state, &command.id)?;

    let task = repo.toggle_done(task_id).await?;
    match task.completed_at {
        Some(at) if task.done => println!("Completed task: '{}' ({})", task.title, at.humanize()),
        _ => println!("Reopened task: '{}'", task.title),
    }

    Ok(())
}
