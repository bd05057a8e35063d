//! Location -> fetch -> cache -> display orchestration.
//!
//! A run walks `ServiceCheck -> PermissionCheck -> Acquire -> Fetch` and ends
//! in one of the halted or terminal [`PipelineState`]s. Every run starts by
//! rendering whatever the snapshot store already holds.

use std::sync::Arc;
use std::time::Duration;

use chrono::FixedOffset;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::cache::SnapshotStore;
use crate::client::WeatherClient;
use crate::connectivity::Connectivity;
use crate::location::{LocationAcquirer, PositioningProvider};
use crate::permission::{
    GateOutcome, PermissionGate, PermissionPlatform, RationalePrompt, SettingsNavigator,
    LOCATION_CAPABILITIES,
};
use crate::types::{
    Coordinates, FetchError, LocationError, UnitSystem, WeatherQuery, WeatherSnapshot,
};
use crate::units;
use crate::view::WeatherViewModel;

const DEFAULT_LOCATION_TIMEOUT_SECS: u64 = 30;

pub const PERMISSION_DENIED_MESSAGE: &str = "You've denied location permission";
pub const NO_INTERNET_MESSAGE: &str = "No internet";

/// Why a run ended in `Failed`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureReason {
    #[error("Location permission permanently denied")]
    PermissionPermanentlyDenied,
    #[error("Location unavailable: {0}")]
    LocationUnavailable(LocationError),
    #[error("No network connection")]
    NetworkUnavailable,
    #[error(transparent)]
    Fetch(FetchError),
}

impl FailureReason {
    /// Message to put in front of the user, if this failure warrants one.
    ///
    /// Fetch and location failures are only logged; stale data stays on screen.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::PermissionPermanentlyDenied => Some(PERMISSION_DENIED_MESSAGE),
            Self::NetworkUnavailable => Some(NO_INTERNET_MESSAGE),
            Self::LocationUnavailable(_) | Self::Fetch(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    /// Positioning is off; the user was sent to location settings.
    AwaitingLocationService,
    /// Permission was refused and the rationale was shown.
    AwaitingPermission,
    AcquiringLocation,
    FetchingWeather,
    Success,
    Failed(FailureReason),
}

impl PipelineState {
    pub fn shows_loading(&self) -> bool {
        matches!(self, Self::AcquiringLocation | Self::FetchingWeather)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("A weather update is already running")]
    AlreadyRunning,
}

/// Passive display surface
pub trait Renderer: Send + Sync {
    fn render(&self, view: &WeatherViewModel);
    fn set_loading(&self, loading: bool);
    fn show_message(&self, message: &str);
}

/// Platform collaborators the controller drives
#[derive(Clone)]
pub struct Platform {
    pub positioning: Arc<dyn PositioningProvider>,
    pub permissions: Arc<dyn PermissionPlatform>,
    pub rationale: Arc<dyn RationalePrompt>,
    pub settings: Arc<dyn SettingsNavigator>,
    pub connectivity: Arc<dyn Connectivity>,
    pub renderer: Arc<dyn Renderer>,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub api_key: String,
    pub unit_system: UnitSystem,
    /// Region code used for the unit symbol; empty means unknown.
    pub region: String,
    pub location_timeout: Duration,
    /// Fixed offset for sunrise/sunset; `None` converts each time in the
    /// host's local zone.
    pub display_offset: Option<FixedOffset>,
}

impl PipelineSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            unit_system: UnitSystem::default(),
            region: units::detect_region().unwrap_or_default(),
            location_timeout: Duration::from_secs(DEFAULT_LOCATION_TIMEOUT_SECS),
            display_offset: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    ServiceCheck,
    PermissionCheck,
}

#[derive(Default)]
struct ControllerState {
    state: PipelineState,
    in_flight: bool,
    view: WeatherViewModel,
    cancel: Option<CancellationToken>,
}

/// Clears the in-flight flag however the run ends, including when its
/// future is dropped mid-await.
struct RunGuard<'a> {
    controller: &'a PipelineController,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let was_loading = {
            let mut inner = self.controller.inner.lock();
            inner.in_flight = false;
            inner.cancel = None;
            let was_loading = inner.view.loading;
            if inner.state.shows_loading() {
                inner.state = PipelineState::Idle;
            }
            inner.view.loading = false;
            was_loading
        };

        if was_loading {
            self.controller.renderer.set_loading(false);
        }
    }
}

pub struct PipelineController {
    acquirer: LocationAcquirer,
    gate: PermissionGate,
    navigator: Arc<dyn SettingsNavigator>,
    connectivity: Arc<dyn Connectivity>,
    renderer: Arc<dyn Renderer>,
    client: WeatherClient,
    store: SnapshotStore,
    settings: PipelineSettings,
    inner: Mutex<ControllerState>,
}

impl PipelineController {
    pub fn new(
        platform: Platform,
        client: WeatherClient,
        store: SnapshotStore,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            acquirer: LocationAcquirer::new(platform.positioning),
            gate: PermissionGate::new(
                platform.permissions,
                platform.rationale,
                platform.settings.clone(),
            ),
            navigator: platform.settings,
            connectivity: platform.connectivity,
            renderer: platform.renderer,
            client,
            store,
            settings,
            inner: Mutex::new(ControllerState::default()),
        }
    }

    /// Initial load: render the cache, then run from the service check.
    pub async fn start(&self) -> Result<PipelineState, PipelineError> {
        let (guard, token) = self.begin()?;
        self.gate.rearm();
        Ok(self.execute(guard, token, Entry::ServiceCheck).await)
    }

    /// User-initiated refresh. Allows one more permission prompt and
    /// re-enters at the permission check.
    pub async fn refresh(&self) -> Result<PipelineState, PipelineError> {
        let (guard, token) = self.begin()?;
        self.gate.rearm();
        Ok(self.execute(guard, token, Entry::PermissionCheck).await)
    }

    /// Render from the store without touching the network.
    pub fn render_cached(&self) -> WeatherViewModel {
        let view = match self.store.load() {
            Some(snapshot) => self.apply(&snapshot),
            None => self.view(),
        };
        self.renderer.render(&view);
        view
    }

    pub fn state(&self) -> PipelineState {
        self.inner.lock().state.clone()
    }

    pub fn view(&self) -> WeatherViewModel {
        self.inner.lock().view.clone()
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().in_flight
    }

    /// Cancel the in-flight fetch. Returns false if nothing is running.
    pub fn cancel(&self) -> bool {
        match &self.inner.lock().cancel {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn begin(&self) -> Result<(RunGuard<'_>, CancellationToken), PipelineError> {
        let mut inner = self.inner.lock();
        if inner.in_flight {
            tracing::warn!("Ignoring trigger while a run is in flight ({:?})", inner.state);
            return Err(PipelineError::AlreadyRunning);
        }

        let token = CancellationToken::new();
        inner.in_flight = true;
        inner.cancel = Some(token.clone());
        Ok((RunGuard { controller: self }, token))
    }

    async fn execute(
        &self,
        _guard: RunGuard<'_>,
        token: CancellationToken,
        entry: Entry,
    ) -> PipelineState {
        self.render_cached();

        let outcome = self.advance(entry, &token).await;
        self.transition(outcome.clone());

        if let PipelineState::Failed(reason) = &outcome {
            if let Some(message) = reason.user_message() {
                self.renderer.show_message(message);
            }
        }
        outcome
    }

    async fn advance(&self, entry: Entry, token: &CancellationToken) -> PipelineState {
        if entry == Entry::ServiceCheck && !self.acquirer.is_positioning_enabled() {
            tracing::info!("Location services are off, opening location settings");
            self.navigator.open_location_settings();
            return PipelineState::AwaitingLocationService;
        }

        match self.gate.check_and_request(&LOCATION_CAPABILITIES).await {
            GateOutcome::Granted => {}
            GateOutcome::ShouldExplain => {
                let choice = self.gate.explain().await;
                tracing::debug!("Rationale answered: {:?}", choice);
                return PipelineState::AwaitingPermission;
            }
            GateOutcome::PermanentlyDenied => {
                tracing::warn!("Location permission permanently denied");
                return PipelineState::Failed(FailureReason::PermissionPermanentlyDenied);
            }
        }

        // Refresh skips the early check; never subscribe with positioning off.
        if !self.acquirer.is_positioning_enabled() {
            tracing::info!("Location services are off, opening location settings");
            self.navigator.open_location_settings();
            return PipelineState::AwaitingLocationService;
        }

        self.transition(PipelineState::AcquiringLocation);
        let coordinates = match self.acquire().await {
            Ok(coordinates) => coordinates,
            Err(e) => {
                tracing::error!("Failed to get location: {}", e);
                return PipelineState::Failed(FailureReason::LocationUnavailable(e));
            }
        };

        if !self.connectivity.is_network_available().await {
            tracing::warn!("No network connection, skipping weather request");
            return PipelineState::Failed(FailureReason::NetworkUnavailable);
        }

        self.transition(PipelineState::FetchingWeather);
        let query = WeatherQuery {
            coordinates,
            unit_system: self.settings.unit_system,
            api_key: self.settings.api_key.clone(),
        };

        match self.client.fetch_cancellable(&query, token).await {
            Ok(snapshot) => {
                self.store_and_render(&snapshot);
                PipelineState::Success
            }
            Err(e) => {
                tracing::error!("Weather fetch failed [{}]: {}", e.code(), e);
                PipelineState::Failed(FailureReason::Fetch(e))
            }
        }
    }

    async fn acquire(&self) -> Result<Coordinates, LocationError> {
        let fix = self.acquirer.request_one_shot_fix();
        match tokio::time::timeout(self.settings.location_timeout, fix).await {
            Ok(result) => result,
            Err(_) => Err(LocationError::Timeout),
        }
    }

    fn store_and_render(&self, snapshot: &WeatherSnapshot) {
        match self.store.save(snapshot) {
            Ok(()) => {
                tracing::info!("Cached weather for {}", snapshot.place.name);
                self.render_cached();
            }
            Err(e) => {
                tracing::warn!("Failed to cache weather snapshot: {}", e);
                let view = self.apply(snapshot);
                self.renderer.render(&view);
            }
        }
    }

    fn apply(&self, snapshot: &WeatherSnapshot) -> WeatherViewModel {
        let region = &self.settings.region;
        let mut inner = self.inner.lock();
        match &self.settings.display_offset {
            Some(offset) => inner.view.apply(snapshot, region, offset),
            None => inner.view.apply(snapshot, region, &chrono::Local),
        }
        inner.view.clone()
    }

    fn transition(&self, next: PipelineState) {
        let loading = next.shows_loading();
        let changed = {
            let mut inner = self.inner.lock();
            tracing::debug!("Pipeline {:?} -> {:?}", inner.state, next);
            inner.state = next;
            let changed = inner.view.loading != loading;
            inner.view.loading = loading;
            changed
        };

        if changed {
            self.renderer.set_loading(loading);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_loading_only_while_working() {
        assert!(PipelineState::AcquiringLocation.shows_loading());
        assert!(PipelineState::FetchingWeather.shows_loading());

        for state in [
            PipelineState::Idle,
            PipelineState::AwaitingLocationService,
            PipelineState::AwaitingPermission,
            PipelineState::Success,
            PipelineState::Failed(FailureReason::NetworkUnavailable),
        ] {
            assert!(!state.shows_loading(), "{:?}", state);
        }
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            FailureReason::PermissionPermanentlyDenied.user_message(),
            Some("You've denied location permission")
        );
        assert_eq!(
            FailureReason::NetworkUnavailable.user_message(),
            Some("No internet")
        );
        assert_eq!(
            FailureReason::Fetch(FetchError::NotFound).user_message(),
            None
        );
        assert_eq!(
            FailureReason::LocationUnavailable(LocationError::Timeout).user_message(),
            None
        );
    }

    #[test]
    fn test_fetch_failure_displays_inner_error() {
        let reason = FailureReason::Fetch(FetchError::Generic(503));
        assert_eq!(reason.to_string(), "Weather API returned status 503");
    }

    #[test]
    fn test_settings_default_to_local_zone() {
        let settings = PipelineSettings::new("key");
        assert_eq!(settings.display_offset, None);
        assert_eq!(settings.location_timeout, Duration::from_secs(30));
    }
}
