use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, Select, Text};
use tokio::sync::watch;
use weatherdash_core::{
    CitySuggester, Config, Coordinates, Dashboard, FetchState, WeatherFetchService,
    provider_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Terminal weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the weatherstack API key.
    Configure,

    /// Show current weather and forecast for a location.
    Show {
        /// City name, "city, country", or "lat,lon".
        query: String,
    },

    /// Open the interactive dashboard.
    Dashboard {
        /// Latitude of the current position; falls back to New York when absent.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude of the current position.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// List city names matching the input.
    Suggest {
        input: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { query } => show(&query).await,
            Command::Dashboard { lat, lon } => {
                let position = lat.zip(lon).map(|(latitude, longitude)| Coordinates {
                    latitude,
                    longitude,
                });
                dashboard(position).await
            }
            Command::Suggest { input } => suggest(&input).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("weatherstack API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn load_config() -> anyhow::Result<Config> {
    let config = Config::load()?;
    if !config.has_api_key() {
        eprintln!(
            "No API key configured.\n\
             Hint: run `weatherdash configure` or set WEATHERSTACK_API_KEY."
        );
    }
    Ok(config)
}

/// Upper bound for one debounce + fetch cycle.
fn cycle_timeout(config: &Config) -> Duration {
    config.fetch_settings().debounce + config.timeout() * 2
}

async fn wait_settled(
    rx: &mut watch::Receiver<FetchState>,
    limit: Duration,
) -> anyhow::Result<FetchState> {
    let state = tokio::time::timeout(limit, rx.wait_for(FetchState::is_settled))
        .await
        .context("Timed out waiting for weather data")?
        .context("Weather service stopped")?
        .clone();
    Ok(state)
}

async fn show(query: &str) -> anyhow::Result<()> {
    if query.trim().is_empty() {
        bail!("Query must not be empty");
    }

    let config = load_config()?;
    let provider = provider_from_config(&config)?;
    let service = WeatherFetchService::new(provider, config.fetch_settings());

    let mut rx = service.subscribe();
    service.set_query(query);
    let state = wait_settled(&mut rx, cycle_timeout(&config)).await?;

    println!("{}", render::render_state(&state));
    Ok(())
}

async fn suggest(input: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let suggester = CitySuggester::from_config(&config)?;

    let names = suggester.suggest(input).await?;
    if names.is_empty() {
        println!("No matching cities");
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

async fn dashboard(position: Option<Coordinates>) -> anyhow::Result<()> {
    let config = load_config()?;
    let provider = provider_from_config(&config)?;
    let suggester = CitySuggester::from_config(&config)?;
    let limit = cycle_timeout(&config);

    let mut dash = Dashboard::new(provider, config.fetch_settings(), &config.countries);
    let mut rx = dash.subscribe();
    dash.bootstrap(position);

    wait_settled(&mut rx, limit).await?;
    for card in dash.cards() {
        let mut card_rx = card.subscribe();
        if let Err(err) = wait_settled(&mut card_rx, limit).await {
            tracing::warn!(country = card.country(), error = %err, "card did not settle");
        }
    }
    dash.sync_from_state();
    print_dashboard(&dash);

    loop {
        let input = Text::new("Search city:")
            .with_initial_value(dash.search_text())
            .with_help_message("Enter to search, Esc or empty to quit")
            .prompt_skippable()?;

        let Some(input) = input.filter(|s| !s.trim().is_empty()) else {
            break;
        };

        if let Some(request) = dash.set_search_text(input) {
            let result = suggester.suggest(&request.input).await;
            dash.apply_suggestions(request.seq, result);
        }

        let before = dash.query();
        let mut rx = dash.subscribe();

        match pick_suggestion(&dash)? {
            Some(choice) => dash.select_suggestion(&choice),
            None => dash.submit_search(),
        }

        if dash.query() != before {
            rx.changed().await.context("Weather service stopped")?;
            wait_settled(&mut rx, limit).await?;
            dash.sync_from_state();
        }
        print_dashboard(&dash);
    }

    dash.dispose();
    Ok(())
}

/// `None` means "search the typed text as-is".
fn pick_suggestion(dash: &Dashboard) -> anyhow::Result<Option<String>> {
    if dash.suggestions().is_empty() {
        return Ok(None);
    }

    let typed = format!("Search \"{}\"", dash.search_text());
    let mut options = vec![typed.clone()];
    options.extend(dash.suggestions().iter().cloned());

    let choice = Select::new("Did you mean:", options).prompt_skippable()?;
    Ok(choice.filter(|c| *c != typed))
}

fn print_dashboard(dash: &Dashboard) {
    let today = chrono::Local::now().date_naive();
    let view = dash.view(today, &mut rand::thread_rng());
    println!("{}", render::render_dashboard(&view));
}
