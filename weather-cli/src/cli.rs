use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use tracing::debug;
use weather_core::{
    Command as SearchCommand, Config, FileStore, KeyValueStore, Notification,
    RecentSearchHistory, SearchController, UnitPreference, provider_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather by city name")]
pub struct Cli {
    /// Defaults to `interactive` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default unit.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "Kyiv" or "New York".
        city: String,

        /// Display Fahrenheit instead of the configured default.
        #[arg(long)]
        imperial: bool,

        /// Print the raw snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Prompt for cities until `:q`.
    Interactive,

    /// List recent searches.
    History,
}

const PROMPT_HELP: &str = ":u toggle units, :h history, :q quit";

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => configure(),
            Command::Show { city, imperial, json } => show(&city, imperial, json).await,
            Command::Interactive => interactive().await,
            Command::History => history(),
        }
    }
}

fn build_controller(config: &Config, unit: UnitPreference) -> anyhow::Result<SearchController> {
    let provider = provider_from_config(config)?;
    let store = FileStore::open_default()?;
    debug!(path = %store.path().display(), "using state file");

    Ok(SearchController::new(provider, Box::new(store), unit))
}

fn notify(note: Notification) {
    eprintln!("✗ {note}");
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let units = vec![UnitPreference::Metric, UnitPreference::Imperial];
    let start = units.iter().position(|u| *u == config.default_unit).unwrap_or(0);
    let unit = Select::new("Default unit:", units)
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read default unit")?;

    config.set_api_key(api_key.trim().to_string());
    config.default_unit = unit;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(city: &str, imperial: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let unit = if imperial { UnitPreference::Imperial } else { config.default_unit };
    let mut ctl = build_controller(&config, unit)?;

    if let Some(note) = ctl.submit(city).await {
        notify(note);
        return Ok(());
    }

    if let Some(msg) = ctl.state().error_message() {
        eprintln!("Oops! {msg}");
        return Ok(());
    }

    if json {
        match snapshot_json(&ctl)? {
            Some(text) => println!("{text}"),
            None => eprintln!("No weather data returned"),
        }
        return Ok(());
    }

    print!("{}", render::screen(&ctl, Utc::now()));
    Ok(())
}

async fn interactive() -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut ctl = build_controller(&config, config.default_unit)?;

    loop {
        let input = match Text::new("City:")
            .with_placeholder("Enter city name...")
            .with_help_message(PROMPT_HELP)
            .prompt()
        {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read input"),
        };

        match input.trim() {
            ":q" => break,
            ":u" => {
                ctl.dispatch(SearchCommand::ToggleUnit).await;
                println!("Units: {}", ctl.unit());
            }
            ":h" => print!("{}", history_text(ctl.recent_searches())),
            _ => {
                if let Some(query) = ctl.begin_search(&input) {
                    print!("{}", render::screen(&ctl, Utc::now()));
                    if let Some(note) = ctl.complete_search(&query).await {
                        notify(note);
                        continue;
                    }
                }
            }
        }

        print!("{}", render::screen(&ctl, Utc::now()));
    }

    Ok(())
}

/// The last fetched snapshot as pretty JSON, whether or not the panel would show it.
fn snapshot_json(ctl: &SearchController) -> anyhow::Result<Option<String>> {
    ctl.snapshot()
        .map(serde_json::to_string_pretty)
        .transpose()
        .context("Failed to serialize weather snapshot")
}

fn history_text(history: &RecentSearchHistory) -> String {
    if history.is_empty() {
        "No recent searches.\n".to_string()
    } else {
        render::recent_searches(history)
    }
}

fn stored_history_text(store: &dyn KeyValueStore) -> String {
    history_text(&RecentSearchHistory::load_or_empty(store))
}

fn history() -> anyhow::Result<()> {
    let store = FileStore::open_default()?;
    print!("{}", stored_history_text(&store));
    Ok(())
}
