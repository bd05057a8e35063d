//! Weather pipeline for Skycast
//!
//! Acquires a one-shot position fix behind a permission gate, fetches current
//! conditions from OpenWeatherMap, caches the last good result in a single
//! slot and derives the fields a display surface renders.

pub mod cache;
pub mod client;
pub mod connectivity;
pub mod icons;
pub mod kv;
pub mod location;
pub mod permission;
pub mod pipeline;
pub mod types;
pub mod units;
pub mod view;

pub use cache::SnapshotStore;
pub use client::WeatherClient;
pub use connectivity::{Connectivity, DnsConnectivity};
pub use icons::IconAsset;
pub use kv::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
pub use location::{LocationAcquirer, PositioningProvider};
pub use permission::{PermissionGate, PermissionPlatform, RationalePrompt, SettingsNavigator};
pub use pipeline::{
    FailureReason, Platform, PipelineController, PipelineError, PipelineSettings, PipelineState,
    Renderer,
};
pub use types::*;
pub use view::WeatherViewModel;
