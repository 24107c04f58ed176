use anyhow::Result;
use clap::Parser;
use hibi_core::db;
use hibi_core::error::CoreError;
use hibi_core::repository::SqliteRepository;
use owo_colors::{OwoColorize, Style};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod util;
mod views;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("HIBI_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = cli::Cli::parse();

    if let Err(e) = run(cli).await {
        handle_error(e);
        std::process::exit(1);
    }
}

async fn run(cli: cli::Cli) -> Result<()> {
    let config = config::Config::new().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable configuration");
        config::Config::default()
    });

    let db_pool = db::establish_connection(&config.database_path).await?;
    let repository = SqliteRepository::new(db_pool, config.store_config());

    match cli.command {
        cli::Commands::Add(command) => commands::add::add_task(&repository, command, &config).await,
        cli::Commands::List(command) => commands::list::list_tasks(&repository, command, &config).await,
        cli::Commands::Do(command) => commands::r#do::do_task(&repository, command, &config).await,
        cli::Commands::Edit(command) => commands::edit::edit_task(&repository, command, &config).await,
        cli::Commands::Delete(command) => {
            commands::delete::delete_task(&repository, command, &config).await
        }
        cli::Commands::Remind(command) => commands::remind::remind(&repository, command, &config).await,
        cli::Commands::User(command) => {
            commands::user::user_command(&repository, command, &config).await
        }
        cli::Commands::Weather(command) => {
            commands::weather::weather_command(&repository, command, &config).await
        }
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::AmbiguousId(tasks) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, title) in tasks {
                    eprintln!("  {} ({})", id.yellow(), title);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::Validation(v) => {
                eprintln!("{} {}", "Error:".style(error_style), v);
            }
            CoreError::Database(e) => {
                tracing::debug!(error = ?e, "database failure");
                eprintln!("{} Database error: {}", "Error:".style(error_style), e);
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {:#}", "Error:".style(error_style), err);
    }
}
