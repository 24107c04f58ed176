use anyhow::Result;
use chrono::Utc;
use hibi_core::reminder::ReminderDigest;
use hibi_core::repository::{ReminderRepository, Repository};
use owo_colors::{OwoColorize, Style};

use crate::cli::RemindCommand;
use crate::config::Config;
use crate::util::today;

fn print_digest(digest: &ReminderDigest) {
    println!("{} {}", "To:".bold(), digest.to_address);
    println!("{} {}", "Subject:".bold(), digest.subject());
    println!("{}", digest.body());
}

pub async fn remind(repo: &impl Repository, command: RemindCommand, config: &Config) -> Result<()> {
    let today = today(config)?;
    let now = Utc::now();

    if command.dry_run {
        let digests = match repo.pending_reminders(today, now).await {
            Ok(digests) => digests,
            Err(e) => {
                tracing::warn!(error = %e, "could not plan reminders");
                println!("Reminders could not be planned right now.");
                return Ok(());
            }
        };
        if digests.is_empty() {
            println!("No reminders due.");
        }
        for digest in &digests {
            print_digest(digest);
        }
        return Ok(());
    }

    let digests = repo.run_reminders(today, now).await?;
    let success_style = Style::new().green().bold();
    let tasks: usize = digests.iter().map(|d| d.items.len()).sum();
    println!(
        "{} Queued {} digest{} covering {} task{}",
        "✓".style(success_style),
        digests.len(),
        if digests.len() == 1 { "" } else { "s" },
        tasks,
        if tasks == 1 { "" } else { "s" }
    );

    Ok(())
}
