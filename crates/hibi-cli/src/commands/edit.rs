use anyhow::{anyhow, Result};
use dialoguer::Select;
use hibi_core::models::{EditScope, TaskEdit};
use hibi_core::repository::{Repository, SeriesRepository};
use owo_colors::OwoColorize;

use crate::cli::EditCommand;
use crate::config::Config;
use crate::parser::parse_due_date;
use crate::util::{load_state, resolve_owner_id, resolve_task_id};

pub async fn edit_task(repo: &(impl Repository + Sync), command: EditCommand, config: &Config) -> Result<()> {
    let state = load_state(repo, resolve_owner_id(repo, config).await?).await?;
    let task_id = resolve_task_id(&state, &command.id)?;

    let task = state
        .find(task_id)
        .ok_or_else(|| anyhow!("Task not found"))?;
    let in_series = state.series_of(task).len() > 1 || task.is_date_locked();

    let scope = if !in_series {
        EditScope::Single
    } else if let Some(scope) = command.scope {
        scope
    } else {
        // Interactive scope selection
        let scope_options = vec![
            format!(
                "This task only ({})",
                task.due_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "No due date".to_string())
            ),
            "This and later tasks in the series".to_string(),
            "Entire series".to_string(),
        ];

        println!("{}", "This task is part of a recurring series.".yellow());
        let selection = Select::new()
            .with_prompt("How would you like to apply your changes?")
            .items(&scope_options)
            .default(0)
            .interact()?;

        match selection {
            0 => EditScope::Single,
            1 => EditScope::FutureFromThis,
            _ => EditScope::All,
        }
    };

    let description = if command.description_clear {
        None
    } else {
        command.description.or_else(|| task.description.clone())
    };

    let due_date = if command.due_clear {
        Some(None)
    } else if let Some(due_str) = command.due {
        Some(Some(parse_due_date(&due_str, &config.timezone)?))
    } else {
        None
    };

    let edit = TaskEdit {
        title: command.title.unwrap_or_else(|| task.title.clone()),
        description,
        due_date,
    };

    let updated = repo.edit_task(task_id, edit, scope).await?;

    match scope {
        EditScope::Single => println!("Updated task with ID: {}", task_id),
        EditScope::FutureFromThis => println!("Updated {} tasks from this one onward", updated.len()),
        EditScope::All => println!("Updated all {} tasks in the series", updated.len()),
    }

    Ok(())
}
