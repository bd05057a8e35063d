use serde::{Deserialize, Serialize};

/// Unit system requested from the weather API; the same type the config carries.
pub use skycast_core::UnitSystem;

/// A single resolved position fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Everything needed for one weather request. Built per request, never stored.
#[derive(Debug, Clone)]
pub struct WeatherQuery {
    pub coordinates: Coordinates,
    pub unit_system: UnitSystem,
    pub api_key: String,
}

/// Primary weather condition as reported by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub main: String,
    pub description: String,
    /// Provider icon code, e.g. "04n"
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
}

/// Sunrise and sunset as unix epoch seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise: i64,
    pub sunset: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    /// ISO 3166 country code
    pub country: String,
}

/// The most recent successful weather fetch.
///
/// Always fully populated; a provider payload missing any of these fields
/// never becomes a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub condition: Condition,
    pub measurements: Measurements,
    pub wind: Wind,
    pub sun: SunTimes,
    pub place: Place,
}

/// Location acquisition errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location request timed out")]
    Timeout,
    #[error("Location provider stopped without delivering a fix")]
    Unavailable,
    #[error("Location subscription failed: {0}")]
    Subscribe(String),
}

/// Weather API failures, one variant per response class
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Bad request (400)")]
    BadRequest,
    #[error("Not found (404)")]
    NotFound,
    #[error("Weather API returned status {0}")]
    Generic(u16),
    #[error("Weather API unreachable: {0}")]
    Unreachable(String),
    #[error("Malformed weather response: {0}")]
    MalformedResponse(String),
    #[error("Weather request cancelled")]
    Cancelled,
}

impl FetchError {
    /// Short code for log lines ("400", "404", "500", "unreachable", ...)
    pub fn code(&self) -> String {
        match self {
            Self::BadRequest => "400".to_string(),
            Self::NotFound => "404".to_string(),
            Self::Generic(status) => status.to_string(),
            Self::Unreachable(_) => "unreachable".to_string(),
            Self::MalformedResponse(_) => "malformed".to_string(),
            Self::Cancelled => "cancelled".to_string(),
        }
    }
}

/// Snapshot persistence errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Backend(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_unit_system_is_config_type() {
        let from_config: skycast_core::UnitSystem = skycast_core::WeatherConfig::default().unit_system;
        let query = WeatherQuery {
            coordinates: Coordinates::new(0.0, 0.0),
            unit_system: from_config,
            api_key: String::new(),
        };
        assert_eq!(query.unit_system.as_query(), "metric");

        let json = serde_json::to_string(&UnitSystem::Imperial).unwrap();
        assert_eq!(json, "\"imperial\"");
    }

    #[test]
    fn test_fetch_error_codes() {
        assert_eq!(FetchError::BadRequest.code(), "400");
        assert_eq!(FetchError::NotFound.code(), "404");
        assert_eq!(FetchError::Generic(503).code(), "503");
        assert_eq!(FetchError::Unreachable("refused".into()).code(), "unreachable");
    }
}
