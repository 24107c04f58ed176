use anyhow::Result;
use hibi_core::models::NewTaskData;
use hibi_core::repository::{Repository, SeriesRepository, TaskRepository};
use hibi_core::series::SERIES_MEMBER_COUNT;
use owo_colors::{OwoColorize, Style};

use crate::cli::AddCommand;
use crate::config::Config;
use crate::parser::parse_due_date;
use crate::util::resolve_owner_id;

pub async fn add_task(repo: &impl Repository, command: AddCommand, config: &Config) -> Result<()> {
    let due_date = command
        .due
        .as_deref()
        .map(|d| parse_due_date(d, &config.timezone))
        .transpose()?;

    let new_task_data = NewTaskData {
        owner_id: resolve_owner_id(repo, config).await?,
        title: command.title,
        description: command.description,
        due_date,
    };

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();

    if command.repeat {
        let head = repo.create_series(new_task_data).await?;
        println!(
            "{} Created recurring task: {}",
            "✓".style(success_style),
            head.title.bright_white().bold()
        );
        println!("  {} Task ID: {}", "→".style(info_style), head.id);
        if let Some(start) = head.due_date {
            let end = start + chrono::Duration::days(SERIES_MEMBER_COUNT as i64);
            println!(
                "  {} Repeats daily from {} to {} ({} tasks)",
                "→".style(info_style),
                start.to_string().cyan(),
                end.to_string().cyan(),
                SERIES_MEMBER_COUNT + 1
            );
        }
    } else {
        let added_task = repo.add_task(new_task_data).await?;
        println!(
            "{} Created task: {}",
            "✓".style(success_style),
            added_task.title.bright_white().bold()
        );
        println!("  {} Task ID: {}", "→".style(info_style), added_task.id);
        if let Some(due) = added_task.due_date {
            println!("  {} Due: {}", "→".style(info_style), due.to_string().cyan());
        }
    }

    Ok(())
}
