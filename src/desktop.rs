//! Desktop stand-ins for the platform services a phone would provide.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use skycast_weather::location::{FixRequest, Provider, SubscriptionId};
use skycast_weather::permission::{Capability, PermissionState, RationaleChoice};
use skycast_weather::{
    Coordinates, LocationError, PermissionPlatform, PositioningProvider, RationalePrompt,
    Renderer, SettingsNavigator, WeatherViewModel,
};
use tokio::sync::mpsc;

/// Reports the configured coordinates as a network fix.
pub struct FixedPositioning {
    coordinates: Option<Coordinates>,
    enabled: bool,
    next_id: AtomicU64,
}

impl FixedPositioning {
    pub fn new(coordinates: Option<Coordinates>, enabled: bool) -> Self {
        Self {
            coordinates,
            enabled,
            next_id: AtomicU64::new(1),
        }
    }
}

impl PositioningProvider for FixedPositioning {
    fn is_provider_enabled(&self, provider: Provider) -> bool {
        provider == Provider::Network && self.enabled && self.coordinates.is_some()
    }

    fn subscribe(
        &self,
        _request: FixRequest,
        sink: mpsc::Sender<Coordinates>,
    ) -> Result<SubscriptionId, LocationError> {
        let coordinates = self
            .coordinates
            .ok_or_else(|| LocationError::Subscribe("no coordinates configured".to_string()))?;

        sink.try_send(coordinates)
            .map_err(|e| LocationError::Subscribe(e.to_string()))?;

        Ok(SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }

    fn unsubscribe(&self, _id: SubscriptionId) {}
}

/// Desktop processes need no location grant.
pub struct DesktopPermissions;

#[async_trait]
impl PermissionPlatform for DesktopPermissions {
    fn status(&self, _capabilities: &[Capability]) -> PermissionState {
        PermissionState::Granted
    }

    async fn request(&self, _capabilities: &[Capability]) -> PermissionState {
        PermissionState::Granted
    }
}

/// No dialog to show; logs the rationale and declines.
pub struct LogRationale;

#[async_trait]
impl RationalePrompt for LogRationale {
    async fn show_rationale(&self, message: &str) -> RationaleChoice {
        tracing::warn!("{}", message);
        RationaleChoice::Cancel
    }
}

/// Points the user at the config file instead of a settings screen.
pub struct ConfigHintNavigator {
    config_path: PathBuf,
}

impl ConfigHintNavigator {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }
}

impl SettingsNavigator for ConfigHintNavigator {
    fn open_location_settings(&self) {
        eprintln!(
            "Location is off. Set [location] latitude and longitude in {}",
            self.config_path.display()
        );
    }

    fn open_app_settings(&self) {
        eprintln!("Check the settings in {}", self.config_path.display());
    }
}

pub struct TerminalRenderer;

impl Renderer for TerminalRenderer {
    fn render(&self, view: &WeatherViewModel) {
        if !view.has_data {
            tracing::debug!("Nothing cached yet");
            return;
        }

        println!();
        println!("  {}, {}", view.location_name, view.country);
        println!(
            "  {} {} ({})",
            view.icon_id().unwrap_or("-"),
            view.condition,
            view.description
        );
        println!(
            "  {}  (min {}, max {})",
            view.temperature, view.temp_min, view.temp_max
        );
        println!("  Humidity {}%  Wind {}", view.humidity, view.wind_speed);
        println!("  Sunrise {}  Sunset {}", view.sunrise, view.sunset);
    }

    fn set_loading(&self, loading: bool) {
        if loading {
            eprintln!("Updating...");
        }
    }

    fn show_message(&self, message: &str) {
        eprintln!("{}", message);
    }
}
