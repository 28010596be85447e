use std::sync::Arc;

use anyhow::{Context, anyhow};
use chrono::Locale;
use clap::{Args, Parser, Subcommand};
use tokio::{sync::watch, task::JoinHandle};
use weather_core::{
    CityName, Config, DisplayZone, FileStore, LabelPolicy, Phase, SessionSnapshot,
    WeatherProvider, WeatherSession, config::parse_zone, provider_from_config,
};

use crate::render;

type Session = WeatherSession<Arc<dyn WeatherProvider>, FileStore>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather dashboard in the terminal")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct DisplayArgs {
    /// Skip the 5-day forecast.
    #[arg(long)]
    no_forecast: bool,

    /// IANA timezone for forecast labels, e.g. "Europe/Paris". Defaults to config, then system.
    #[arg(long)]
    tz: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and display preferences.
    Configure,

    /// Show current weather and forecast for a city.
    Show {
        /// City name as you would type it into the search box.
        city: String,

        #[command(flatten)]
        display: DisplayArgs,
    },

    /// List recent searches, or look one up again by its number.
    Recent {
        /// Position in the list, starting at 1.
        index: Option<usize>,

        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Re-fetch the most recently searched city.
    Refresh {
        #[command(flatten)]
        display: DisplayArgs,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, display } => {
                let mut session = open_session(&display)?;
                let indicator = spawn_loading_indicator(session.subscribe());
                session.submit(&city).await;
                finish_lookup(session, &display, indicator).await
            }
            Command::Recent { index: None, display } => {
                let session = open_session(&display)?;
                println!("{}", render::history_list(session.history()));
                Ok(())
            }
            Command::Recent { index: Some(index), display } => {
                let position = index
                    .checked_sub(1)
                    .ok_or_else(|| anyhow!("Recent searches are numbered from 1"))?;
                let mut session = open_session(&display)?;
                let indicator = spawn_loading_indicator(session.subscribe());
                session.select_history(position).await?;
                finish_lookup(session, &display, indicator).await
            }
            Command::Refresh { display } => {
                let mut session = open_session(&display)?;
                let indicator = spawn_loading_indicator(session.subscribe());
                session
                    .select_history(0)
                    .await
                    .map_err(|_| anyhow!("No recent searches to refresh"))?;
                finish_lookup(session, &display, indicator).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    let current_tz = config.timezone.clone().unwrap_or_default();
    let tz = inquire::Text::new("Timezone for forecast labels (empty = system):")
        .with_default(&current_tz)
        .prompt()
        .context("Failed to read timezone")?;
    match tz.trim() {
        "" => config.timezone = None,
        name => config.set_timezone(parse_zone(name)?),
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn open_session(display: &DisplayArgs) -> anyhow::Result<Session> {
    let config = Config::load()?;

    let zone = match display.tz.as_deref() {
        Some(name) => DisplayZone::Named(parse_zone(name)?),
        None => config.display_zone()?,
    };
    let labels = LabelPolicy::new(zone, Locale::en_US);

    let store = FileStore::new(config.store_file_path()?);
    tracing::debug!(store = %store.path().display(), "opening session");

    Ok(WeatherSession::new(provider_from_config(&config), store, labels))
}

/// Print the current panel and, after a successful lookup, the forecast for the same city.
async fn finish_lookup(
    mut session: Session,
    display: &DisplayArgs,
    indicator: JoinHandle<()>,
) -> anyhow::Result<()> {
    println!("{}", render::current_panel(session.current()));

    if !display.no_forecast && session.current().phase() == Phase::Success {
        // A successful lookup always puts its city at the front of the history.
        let city: Option<CityName> = session.history().first().cloned();
        session.watch_forecast_city(city).await;

        println!();
        println!("{}", render::forecast_panel(session.forecast(), session.labels()));
    }

    // Closing the session ends the indicator's subscription.
    drop(session);
    indicator.await.context("Loading indicator task failed")?;
    Ok(())
}

fn spawn_loading_indicator(mut updates: watch::Receiver<SessionSnapshot>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            if updates.borrow_and_update().current.is_loading() {
                eprintln!("Searching...");
            }
        }
    })
}
