//! Location permission gating: check, prompt once, explain, redirect.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

/// OS-mediated capabilities the pipeline needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    FineLocation,
    CoarseLocation,
}

/// Both location capabilities, always requested together.
pub const LOCATION_CAPABILITIES: [Capability; 2] =
    [Capability::FineLocation, Capability::CoarseLocation];

/// Grant state reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    #[default]
    Unknown,
    Granted,
    Denied,
    PermanentlyDenied,
}

/// What the caller should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Granted,
    /// Denied, but the user can still be asked; show a rationale first.
    ShouldExplain,
    /// Denied for good; surface a message and stop.
    PermanentlyDenied,
}

/// The user's answer to the rationale dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RationaleChoice {
    OpenSettings,
    Cancel,
}

#[async_trait]
pub trait PermissionPlatform: Send + Sync {
    /// Current combined grant state for `capabilities`.
    fn status(&self, capabilities: &[Capability]) -> PermissionState;

    /// Show the native prompt and wait for the answer.
    async fn request(&self, capabilities: &[Capability]) -> PermissionState;
}

#[async_trait]
pub trait RationalePrompt: Send + Sync {
    async fn show_rationale(&self, message: &str) -> RationaleChoice;
}

/// Platform settings screens. Fire and forget.
pub trait SettingsNavigator: Send + Sync {
    fn open_location_settings(&self);
    fn open_app_settings(&self);
}

pub const RATIONALE_MESSAGE: &str = "Turn the permission on";

pub struct PermissionGate {
    platform: Arc<dyn PermissionPlatform>,
    prompt: Arc<dyn RationalePrompt>,
    navigator: Arc<dyn SettingsNavigator>,
    /// Set by a user trigger, cleared by the prompt it allows.
    armed: AtomicBool,
}

impl PermissionGate {
    pub fn new(
        platform: Arc<dyn PermissionPlatform>,
        prompt: Arc<dyn RationalePrompt>,
        navigator: Arc<dyn SettingsNavigator>,
    ) -> Self {
        Self {
            platform,
            prompt,
            navigator,
            armed: AtomicBool::new(true),
        }
    }

    /// Allow one more native prompt. Call only on an explicit user trigger.
    pub fn rearm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    /// Resolve the grant for `capabilities`, prompting at most once per arming.
    pub async fn check_and_request(&self, capabilities: &[Capability]) -> GateOutcome {
        match self.platform.status(capabilities) {
            PermissionState::Granted => return GateOutcome::Granted,
            PermissionState::PermanentlyDenied => return GateOutcome::PermanentlyDenied,
            PermissionState::Unknown | PermissionState::Denied => {}
        }

        if !self.armed.swap(false, Ordering::SeqCst) {
            tracing::debug!("Permission prompt already shown for this trigger");
            return GateOutcome::ShouldExplain;
        }

        let answer = self.platform.request(capabilities).await;
        tracing::info!("Location permission request answered: {:?}", answer);

        match answer {
            PermissionState::Granted => GateOutcome::Granted,
            PermissionState::PermanentlyDenied => GateOutcome::PermanentlyDenied,
            PermissionState::Unknown | PermissionState::Denied => GateOutcome::ShouldExplain,
        }
    }

    /// Show the rationale dialog; "open settings" goes to the app's settings page.
    pub async fn explain(&self) -> RationaleChoice {
        let choice = self.prompt.show_rationale(RATIONALE_MESSAGE).await;
        if choice == RationaleChoice::OpenSettings {
            self.navigator.open_app_settings();
        }
        choice
    }
}
