//! Single-slot cache of the last successful weather fetch.

use std::sync::Arc;

use crate::kv::KeyValueStore;
use crate::types::{StoreError, WeatherSnapshot};

/// The one key the snapshot lives under. Not keyed by location or time.
pub const SNAPSHOT_KEY: &str = "weather_response_data";

#[derive(Clone)]
pub struct SnapshotStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SnapshotStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Persist `snapshot`, replacing whatever was stored before.
    pub fn save(&self, snapshot: &WeatherSnapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string(snapshot)?;
        self.kv.put(SNAPSHOT_KEY, &json)?;
        tracing::debug!("Saved weather snapshot for {}", snapshot.place.name);
        Ok(())
    }

    /// Last saved snapshot. Read failures and undecodable data count as absent.
    pub fn load(&self) -> Option<WeatherSnapshot> {
        let json = match self.kv.get(SNAPSHOT_KEY) {
            Ok(Some(json)) if !json.is_empty() => json,
            Ok(_) => return None,
            Err(e) => {
                tracing::warn!("Failed to read weather cache: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&json) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("Discarding unreadable weather cache: {}", e);
                None
            }
        }
    }
}
