//! One-shot position fixes on top of a subscription-style positioning service.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::types::{Coordinates, LocationError};

/// Positioning sources the platform may have switched on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Satellite,
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    HighAccuracy,
    Balanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixRequest {
    pub priority: Priority,
}

impl FixRequest {
    pub fn high_accuracy() -> Self {
        Self {
            priority: Priority::HighAccuracy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Platform positioning service.
///
/// After `subscribe`, the platform pushes fixes into `sink` until
/// `unsubscribe` is called with the returned id.
pub trait PositioningProvider: Send + Sync {
    fn is_provider_enabled(&self, provider: Provider) -> bool;

    fn subscribe(
        &self,
        request: FixRequest,
        sink: mpsc::Sender<Coordinates>,
    ) -> Result<SubscriptionId, LocationError>;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// Releases the platform subscription when dropped, including when the
/// waiting future is cancelled by a timeout.
struct Subscription {
    provider: Arc<dyn PositioningProvider>,
    id: SubscriptionId,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.provider.unsubscribe(self.id);
        tracing::debug!("Released location subscription {:?}", self.id);
    }
}

#[derive(Clone)]
pub struct LocationAcquirer {
    provider: Arc<dyn PositioningProvider>,
}

impl LocationAcquirer {
    pub fn new(provider: Arc<dyn PositioningProvider>) -> Self {
        Self { provider }
    }

    /// True if satellite or network positioning is on.
    pub fn is_positioning_enabled(&self) -> bool {
        self.provider.is_provider_enabled(Provider::Satellite)
            || self.provider.is_provider_enabled(Provider::Network)
    }

    /// Wait for exactly one high-accuracy fix.
    ///
    /// Does not time out on its own; wrap it in `tokio::time::timeout`.
    pub async fn request_one_shot_fix(&self) -> Result<Coordinates, LocationError> {
        let (tx, mut rx) = mpsc::channel(1);
        let id = self.provider.subscribe(FixRequest::high_accuracy(), tx)?;
        let subscription = Subscription {
            provider: self.provider.clone(),
            id,
        };

        let fix = rx.recv().await;
        drop(subscription);

        let coordinates = fix.ok_or(LocationError::Unavailable)?;
        tracing::info!(
            "Got location: {}, {}",
            coordinates.latitude,
            coordinates.longitude
        );
        Ok(coordinates)
    }
}
