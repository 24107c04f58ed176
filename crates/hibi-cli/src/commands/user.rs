use anyhow::{anyhow, Result};
use dialoguer::Confirm;
use hibi_core::error::CoreError;
use hibi_core::models::{NewUserData, UpdateProfileData};
use hibi_core::repository::{Repository, UserRepository};
use owo_colors::{OwoColorize, Style};

use crate::cli::{UserCommand, UserSubcommand};
use crate::config::Config;
use crate::util::resolve_owner;
use crate::views::table::display_users;

fn clearable(value: Option<String>, clear: bool) -> Option<Option<String>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

pub async fn user_command(repo: &impl Repository, command: UserCommand, config: &Config) -> Result<()> {
    let success_style = Style::new().green().bold();

    match command.command {
        UserSubcommand::Init(init) => {
            let user = repo
                .add_user(NewUserData {
                    email: init.email,
                    display_name: init.name,
                })
                .await?;
            println!("{} Created profile for {}", "✓".style(success_style), user.email.bright_white().bold());
            println!("  ID: {}", user.id);
        }
        UserSubcommand::Show => {
            let user = resolve_owner(repo, config)
                .await?
                .ok_or_else(|| anyhow!(CoreError::NotFound("No profile yet. Create one with `hibi user init EMAIL`".to_string())))?;
            println!("{} {}", "Email:".bold(), user.email);
            println!("{} {}", "Name:".bold(), user.display_name.as_deref().unwrap_or("None"));
            println!("{} {}", "Avatar:".bold(), user.avatar.as_deref().unwrap_or("None"));
            println!("{} {}", "Quote:".bold(), user.favorite_quote.as_deref().unwrap_or("None"));
        }
        UserSubcommand::Set(set) => {
            let user = resolve_owner(repo, config)
                .await?
                .ok_or_else(|| anyhow!(CoreError::NotFound("No profile to update".to_string())))?;
            let updated = repo
                .update_profile(
                    user.id,
                    UpdateProfileData {
                        display_name: clearable(set.name, set.name_clear),
                        avatar: clearable(set.avatar, set.avatar_clear),
                        favorite_quote: clearable(set.quote, set.quote_clear),
                    },
                )
                .await?;
            println!("{} Updated profile {}", "✓".style(success_style), updated.email);
        }
        UserSubcommand::List => {
            display_users(&repo.find_users().await?);
        }
        UserSubcommand::Delete(delete) => {
            let user = resolve_owner(repo, config)
                .await?
                .ok_or_else(|| anyhow!(CoreError::NotFound("No profile to delete".to_string())))?;

            if !delete.force {
                let confirmation = Confirm::new()
                    .with_prompt(format!(
                        "Delete the profile {} and all of its tasks?",
                        user.email
                    ))
                    .default(false)
                    .interact()
                    .unwrap_or(false);
                if !confirmation {
                    println!("Deletion cancelled.");
                    return Ok(());
                }
            }

            let deleted = repo.delete_user(user.id).await?;
            println!("Deleted profile {} and {} tasks", user.email, deleted);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clearable() {
        assert_eq!(clearable(None, true), Some(None));
        assert_eq!(clearable(Some("x".to_string()), false), Some(Some("x".to_string())));
        assert_eq!(clearable(None, false), None);
    }
}
