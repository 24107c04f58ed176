use clap::{Parser, Subcommand, ValueEnum};
use hibi_core::models::{DeleteMode, EditScope};
use hibi_core::view::SortKey;
use std::path::PathBuf;

/// A day planner with recurring task series
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a new task
    Add(AddCommand),
    /// List tasks
    List(ListCommand),
    /// Toggle a task between open and done
    Do(DoCommand),
    /// Edit a task
    Edit(EditCommand),
    /// Delete a task
    Delete(DeleteCommand),
    /// Queue reminder digests for overdue and undated tasks
    Remind(RemindCommand),
    /// Manage user profiles
    User(UserCommand),
    /// Weather lookups
    Weather(WeatherCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The title of the task
    pub title: String,
    /// The description of the task
    #[clap(short, long)]
    pub description: Option<String>,
    /// The due date of the task (e.g. '2025-08-20', 'tomorrow')
    #[clap(long)]
    pub due: Option<String>,
    /// Repeat daily for 30 days starting at the due date
    #[clap(long, requires = "due")]
    pub repeat: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// Hide tasks (and series) that are completely done
    #[clap(long)]
    pub hide_done: bool,
    /// Show only recurring series
    #[clap(long, conflicts_with = "hide_repeating")]
    pub only_repeating: bool,
    /// Hide recurring series
    #[clap(long)]
    pub hide_repeating: bool,
    /// Show only tasks without a due date
    #[clap(long)]
    pub no_due: bool,
    /// Sort order (date|title)
    #[clap(long)]
    pub sort: Option<SortKey>,
    /// Show every member of each series
    #[clap(short, long)]
    pub all: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DoCommand {
    /// The ID of the task to toggle
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct EditCommand {
    /// The ID of the task to edit
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, conflicts_with = "description")]
    pub description_clear: bool,

    #[arg(long)]
    pub due: Option<String>,
    #[arg(long, conflicts_with = "due")]
    pub due_clear: bool,

    /// How to apply changes to a recurring task (single|future|all)
    #[arg(long, help = "How to apply changes to recurring tasks")]
    pub scope: Option<EditScope>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID of the task to delete
    pub id: String,
    /// What to delete for a recurring task (single|future|all)
    #[clap(long)]
    pub mode: Option<DeleteMode>,
    /// Force deletion without confirmation
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct RemindCommand {
    /// Show the digests without queueing them
    #[clap(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct UserCommand {
    #[command(subcommand)]
    pub command: UserSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum UserSubcommand {
    /// Create a profile
    Init(UserInitCommand),
    /// Show the active profile
    Show,
    /// Update the active profile
    Set(UserSetCommand),
    /// List profiles
    List,
    /// Delete the active profile and all of its tasks
    Delete(UserDeleteCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct UserInitCommand {
    /// Email address of the profile
    pub email: String,
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct UserSetCommand {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, conflicts_with = "name")]
    pub name_clear: bool,

    #[arg(long)]
    pub avatar: Option<String>,
    #[arg(long, conflicts_with = "avatar")]
    pub avatar_clear: bool,

    #[arg(long)]
    pub quote: Option<String>,
    #[arg(long, conflicts_with = "quote")]
    pub quote_clear: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct UserDeleteCommand {
    /// Force deletion without confirmation
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct WeatherCommand {
    #[command(subcommand)]
    pub command: WeatherSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum WeatherSubcommand {
    /// Describe a WMO weather code
    Code(WeatherCodeCommand),
    /// Show a saved Open-Meteo forecast
    Show(WeatherShowCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct WeatherCodeCommand {
    #[arg(allow_negative_numbers = true)]
    pub code: i64,
}

#[derive(Parser, Debug, Clone)]
pub struct WeatherShowCommand {
    /// Path to an Open-Meteo JSON response
    pub file: PathBuf,
    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_code_accepts_negative_numbers() {
        let cli = Cli::try_parse_from(["hibi", "weather", "code", "-1"]).unwrap();
        match cli.command {
            Commands::Weather(WeatherCommand {
                command: WeatherSubcommand::Code(code),
            }) => assert_eq!(code.code, -1),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
