use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use weather_core::{Config, Location, WeatherProvider, normalize, provider_from_config};
use weather_server::{AppState, create_router};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather proxy server")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server.
    Serve {
        /// Listen address, overrides config and WEATHER_BIND.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Fetch one report and print it as JSON.
    Show {
        /// City name.
        #[arg(required_unless_present_all = ["lat", "lon"], conflicts_with_all = ["lat", "lon"])]
        city: Option<String>,

        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { bind } => {
                let mut config = load_config(self.config.as_deref())?;
                if let Some(bind) = bind {
                    config.server.bind = bind;
                }
                serve(config).await
            }
            Command::Configure => configure(self.config),
            Command::Show { city, lat, lon } => {
                let config = load_config(self.config.as_deref())?;
                let location = match (city, lat, lon) {
                    (Some(city), _, _) => Location::City(city),
                    (None, Some(lat), Some(lon)) => Location::Coordinates { lat, lon },
                    _ => anyhow::bail!("Pass a city name or both --lat and --lon"),
                };
                show(&config, &location).await
            }
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env();
    Ok(config)
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let state = match provider_from_config(&config) {
        Ok(provider) => AppState::new(Arc::new(provider)),
        Err(e) => {
            warn!("{e}");
            warn!("Starting without an API key; weather requests will fail with 500");
            AppState::unconfigured()
        }
    };

    let app = create_router(state);

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    info!(
        bind = %config.server.bind,
        upstream = %config.openweather.base_url,
        "Weather proxy listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server shutdown complete");
    Ok(())
}

fn configure(path: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = match &path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key);
    if !config.has_api_key() {
        anyhow::bail!("API key must not be empty");
    }

    let saved_to = match path {
        Some(path) => {
            config.save_to(&path)?;
            path
        }
        None => config.save()?,
    };

    println!("Saved configuration to {}", saved_to.display());
    Ok(())
}

async fn show(config: &Config, location: &Location) -> anyhow::Result<()> {
    let provider = provider_from_config(config)?;

    let upstream = provider
        .fetch(location)
        .await
        .with_context(|| format!("Failed to fetch weather for {location}"))?;

    let report = normalize(&upstream.current, &upstream.forecast);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
