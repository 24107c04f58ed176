use anyhow::{anyhow, Result};
use dialoguer::{Confirm, Select};
use hibi_core::models::DeleteMode;
use hibi_core::repository::{Repository, SeriesRepository};
use owo_colors::OwoColorize;

use crate::cli::DeleteCommand;
use crate::config::Config;
use crate::util::{load_state, resolve_owner_id, resolve_task_id};

pub async fn delete_task(repo: &(impl Repository + Sync), command: DeleteCommand, config: &Config) -> Result<()> {
    let state = load_state(repo, resolve_owner_id(repo, config).await?).await?;
    let task_id = resolve_task_id(&state, &command.id)?;

    let task = state
        .find(task_id)
        .ok_or_else(|| anyhow!("Task not found"))?;
    let series_len = state.series_of(task).len();

    let mode = if series_len <= 1 && !task.is_date_locked() {
        DeleteMode::Single
    } else if let Some(mode) = command.mode {
        mode
    } else {
        println!("{}", "This task is part of a recurring series.".yellow());
        let options = [
            "This task only",
            "This and later tasks in the series",
            "Entire series",
        ];
        let selection = Select::new()
            .with_prompt("What would you like to delete?")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => DeleteMode::Single,
            1 => DeleteMode::Future,
            _ => DeleteMode::All,
        }
    };

    if !command.force {
        let target = match mode {
            DeleteMode::Single => format!("task '{}'", task.title),
            DeleteMode::Future => format!("task '{}' and later tasks in its series", task.title),
            DeleteMode::All => format!("all {} tasks in the series '{}'", series_len, task.title),
        };
        let confirmation = Confirm::new()
            .with_prompt(format!("Are you sure you want to delete {}?", target))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    let deleted = repo.delete_task(task_id, mode).await?;
    println!(
        "Deleted {} task{}",
        deleted,
        if deleted == 1 { "" } else { "s" }
    );
    if task.is_series_head() && mode == DeleteMode::Single && series_len > 1 {
        println!("The remaining {} tasks of this series are kept.", series_len - 1);
    }

    Ok(())
}
