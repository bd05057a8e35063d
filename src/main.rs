mod desktop;
mod error_mapping;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use skycast_core::{AppError, Config, ConfigError};
use skycast_weather::{
    Coordinates, DnsConnectivity, PipelineController, PipelineSettings, PipelineState, Platform,
    SnapshotStore, SqliteKeyValueStore, WeatherClient,
};

use crate::desktop::{
    ConfigHintNavigator, DesktopPermissions, FixedPositioning, LogRationale, TerminalRenderer,
};

#[tokio::main]
async fn main() -> Result<()> {
    skycast_core::init()?;

    match run().await {
        Ok(PipelineState::Failed(reason)) => {
            // The renderer already printed the pipeline's own message, if any.
            let shown = reason.user_message().is_some();
            let err = error_mapping::app_error(reason);
            tracing::error!("Weather update failed: {}", err);
            if !shown {
                eprintln!("{}", err.user_message());
            }
            std::process::exit(1);
        }
        Ok(state) => tracing::info!("Weather update finished: {:?}", state),
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("{}", err.user_message());
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn run() -> Result<PipelineState, AppError> {
    let (config, _) = Config::load_validated().map_err(|e| error_mapping::config_error(&e))?;
    require_api_key(&config)?;
    std::fs::create_dir_all(&config.config_dir)?;

    let controller = build_controller(&config)?;
    tracing::info!("Skycast started");

    let state = controller.start().await.map_err(anyhow::Error::from)?;
    Ok(state)
}

/// Without a key every request is rejected, so stop before touching location.
fn require_api_key(config: &Config) -> Result<(), AppError> {
    if config.weather.has_api_key() {
        Ok(())
    } else {
        Err(ConfigError::MissingSetting("weather.api_key".to_string()).into())
    }
}

fn build_controller(config: &Config) -> Result<PipelineController> {
    let coordinates = config
        .location
        .coordinates()
        .map(|(lat, lon)| Coordinates::new(lat, lon));

    let connectivity = DnsConnectivity::for_url(&config.weather.base_url)
        .with_context(|| format!("No host in weather.base_url: {}", config.weather.base_url))?;

    let platform = Platform {
        positioning: Arc::new(FixedPositioning::new(coordinates, config.location.enabled)),
        permissions: Arc::new(DesktopPermissions),
        rationale: Arc::new(LogRationale),
        settings: Arc::new(ConfigHintNavigator::new(Config::config_path()?)),
        connectivity: Arc::new(connectivity),
        renderer: Arc::new(TerminalRenderer),
    };

    let client = WeatherClient::with_base_url(
        &config.weather.base_url,
        Duration::from_secs(config.weather.request_timeout_secs),
    )
    .context("Failed to build HTTP client")?;

    let kv = SqliteKeyValueStore::open(config.cache_path())
        .with_context(|| format!("Failed to open cache: {}", config.cache_path().display()))?;

    let mut settings = PipelineSettings::new(config.weather.api_key.clone());
    settings.unit_system = config.weather.unit_system;
    if let Some(region) = &config.weather.region {
        settings.region = region.to_ascii_uppercase();
    }
    settings.location_timeout = Duration::from_secs(config.weather.location_timeout_secs);

    Ok(PipelineController::new(
        platform,
        client,
        SnapshotStore::new(Arc::new(kv)),
        settings,
    ))
}
