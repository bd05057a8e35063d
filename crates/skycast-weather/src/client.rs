//! OpenWeatherMap current-weather client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::types::{
    Condition, FetchError, Measurements, Place, SunTimes, WeatherQuery, WeatherSnapshot, Wind,
};

pub const OPENWEATHER_API_BASE: &str = "https://api.openweathermap.org/data/2.5";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct ApiResponse {
    weather: Vec<ApiCondition>,
    main: ApiMain,
    wind: ApiWind,
    sys: ApiSys,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct ApiWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ApiSys {
    country: String,
    sunrise: i64,
    sunset: i64,
}

impl TryFrom<ApiResponse> for WeatherSnapshot {
    type Error = FetchError;

    fn try_from(api: ApiResponse) -> Result<Self, Self::Error> {
        let primary = api.weather.into_iter().next().ok_or_else(|| {
            FetchError::MalformedResponse("response has no weather conditions".to_string())
        })?;

        Ok(WeatherSnapshot {
            condition: Condition {
                main: primary.main,
                description: primary.description,
                icon: primary.icon,
            },
            measurements: Measurements {
                temperature: api.main.temp,
                temp_min: api.main.temp_min,
                temp_max: api.main.temp_max,
                humidity: api.main.humidity,
            },
            wind: Wind {
                speed: api.wind.speed,
            },
            sun: SunTimes {
                sunrise: api.sys.sunrise,
                sunset: api.sys.sunset,
            },
            place: Place {
                name: api.name,
                country: api.sys.country,
            },
        })
    }
}

/// Map an HTTP status to success or the matching `FetchError`.
///
/// Total over every status: 2xx passes, 400 and 404 get their own variants,
/// everything else is `Generic`.
pub fn classify_status(status: u16) -> Result<(), FetchError> {
    match status {
        200..=299 => Ok(()),
        400 => Err(FetchError::BadRequest),
        404 => Err(FetchError::NotFound),
        other => Err(FetchError::Generic(other)),
    }
}

/// Parse a 2xx body into a snapshot.
pub fn parse_snapshot(body: &str) -> Result<WeatherSnapshot, FetchError> {
    let api: ApiResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;
    WeatherSnapshot::try_from(api)
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Arc<Client>,
    base_url: String,
}

impl WeatherClient {
    /// Client for the public OpenWeatherMap endpoint.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_base_url(
            OPENWEATHER_API_BASE,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch current weather for the query's coordinates. One request, no retry.
    pub async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, FetchError> {
        self.fetch_cancellable(query, &CancellationToken::new())
            .await
    }

    /// Like [`fetch`](Self::fetch), but gives up with `FetchError::Cancelled`
    /// once `cancel` fires.
    pub async fn fetch_cancellable(
        &self,
        query: &WeatherQuery,
        cancel: &CancellationToken,
    ) -> Result<WeatherSnapshot, FetchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            result = self.request(query) => result,
        }
    }

    #[instrument(
        skip(self, query),
        fields(lat = query.coordinates.latitude, lon = query.coordinates.longitude),
        level = "info"
    )]
    async fn request(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, FetchError> {
        let url = format!("{}/weather", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", query.coordinates.latitude.to_string()),
                ("lon", query.coordinates.longitude.to_string()),
                ("units", query.unit_system.as_query().to_string()),
                ("appid", query.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;

        classify_status(response.status().as_u16())?;

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;

        let snapshot = parse_snapshot(&body)?;
        tracing::info!(
            "Fetched weather for {}, {}",
            snapshot.place.name,
            snapshot.place.country
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_classify_success_range() {
        assert_eq!(classify_status(200), Ok(()));
        assert_eq!(classify_status(204), Ok(()));
        assert_eq!(classify_status(299), Ok(()));
    }

    #[test]
    fn test_classify_client_errors() {
        assert_eq!(classify_status(400), Err(FetchError::BadRequest));
        assert_eq!(classify_status(404), Err(FetchError::NotFound));
        assert_eq!(classify_status(401), Err(FetchError::Generic(401)));
        assert_eq!(classify_status(429), Err(FetchError::Generic(429)));
    }

    #[test]
    fn test_classify_everything_else_is_generic() {
        for status in [100, 301, 304, 500, 502, 503, 599] {
            assert_eq!(classify_status(status), Err(FetchError::Generic(status)));
        }
    }

    #[test]
    fn test_parse_full_body() {
        let body = r#"{
            "coord": {"lon": 77.59, "lat": 12.97},
            "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
            "main": {"temp": 24.5, "feels_like": 24.8, "temp_min": 23.1, "temp_max": 25.9, "pressure": 1012, "humidity": 64},
            "wind": {"speed": 3.6, "deg": 250},
            "sys": {"country": "IN", "sunrise": 1700010000, "sunset": 1700052000},
            "name": "Bengaluru"
        }"#;

        let snapshot = parse_snapshot(body).unwrap();
        assert_eq!(snapshot.condition.main, "Clouds");
        assert_eq!(snapshot.condition.icon, "04d");
        assert_eq!(snapshot.measurements.temperature, 24.5);
        assert_eq!(snapshot.measurements.humidity, 64);
        assert_eq!(snapshot.wind.speed, 3.6);
        assert_eq!(snapshot.sun.sunset, 1_700_052_000);
        assert_eq!(snapshot.place.name, "Bengaluru");
        assert_eq!(snapshot.place.country, "IN");
    }

    #[test]
    fn test_parse_empty_weather_array_is_malformed() {
        let body = r#"{
            "weather": [],
            "main": {"temp": 1.0, "temp_min": 0.0, "temp_max": 2.0, "humidity": 80},
            "wind": {"speed": 1.0},
            "sys": {"country": "NO", "sunrise": 1, "sunset": 2},
            "name": "Oslo"
        }"#;

        assert!(matches!(
            parse_snapshot(body),
            Err(FetchError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_missing_field_is_malformed() {
        let body = r#"{"weather": [], "name": "Oslo"}"#;
        assert!(matches!(
            parse_snapshot(body),
            Err(FetchError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client =
            WeatherClient::with_base_url("http://localhost:9000/data/2.5/", Duration::from_secs(1))
                .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000/data/2.5");
    }
}
