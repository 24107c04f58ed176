use anyhow::{Context, Result};
use hibi_core::repository::Repository;
use hibi_core::weather::{describe_weather_code, is_precipitation, parse_forecast, should_show_umbrella_alert};
use owo_colors::OwoColorize;

use crate::cli::{OutputFormat, WeatherCommand, WeatherSubcommand};
use crate::config::Config;
use crate::util::{load_state, resolve_owner_id, today};
use crate::views::table::{display_forecast, weather_label};

pub async fn weather_command(repo: &(impl Repository + Sync), command: WeatherCommand, config: &Config) -> Result<()> {
    match command.command {
        WeatherSubcommand::Code(code) => {
            let info = describe_weather_code(code.code);
            println!("{} {}", info.icon, weather_label(info.label));
            if is_precipitation(code.code) {
                println!("Precipitation expected.");
            }
        }
        WeatherSubcommand::Show(show) => {
            let json = tokio::fs::read_to_string(&show.file)
                .await
                .with_context(|| format!("Failed to read forecast file {}", show.file.display()))?;
            let days = parse_forecast(&json)?;

            match show.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&days)?),
                OutputFormat::Table => {
                    let today = today(config)?;
                    display_forecast(&days, today);

                    let todays = days.iter().find(|d| d.date == today);
                    let tasks = match resolve_owner_id(repo, config).await {
                        Ok(owner_id) => match load_state(repo, owner_id).await {
                            Ok(state) => state.tasks().to_vec(),
                            Err(e) => {
                                tracing::warn!(error = %e, "could not load tasks for umbrella alert");
                                Vec::new()
                            }
                        },
                        Err(e) => {
                            tracing::warn!(error = %e, "could not resolve profile for umbrella alert");
                            Vec::new()
                        }
                    };
                    let open: Vec<_> = tasks.into_iter().filter(|t| !t.done).collect();
                    if should_show_umbrella_alert(&open, todays) {
                        println!("{}", "☔ Rain today and you have plans outside. Take an umbrella!".yellow());
                    }
                }
            }
        }
    }

    Ok(())
}
