//! Maps pipeline failures to skycast_core::AppError for consistent user-facing messages.
//! Both types live in other crates, so this is a function rather than a `From` impl.

use skycast_core::{AppError, ConfigError, LocationError, NetworkError, WeatherError};
use skycast_weather::{FailureReason, FetchError};

pub fn app_error(reason: FailureReason) -> AppError {
    match reason {
        FailureReason::PermissionPermanentlyDenied => {
            AppError::Location(LocationError::PermissionDenied)
        }
        FailureReason::LocationUnavailable(e) => {
            AppError::Location(LocationError::Unavailable(e.to_string()))
        }
        FailureReason::NetworkUnavailable => AppError::Network(NetworkError::Offline),
        FailureReason::Fetch(e) => fetch_error(e),
    }
}

/// A config file that failed to load or validate.
pub fn config_error(e: &anyhow::Error) -> AppError {
    AppError::Config(ConfigError::Invalid(format!("{:#}", e)))
}

fn fetch_error(e: FetchError) -> AppError {
    match e {
        FetchError::BadRequest => AppError::Weather(WeatherError::BadRequest),
        FetchError::NotFound => AppError::Weather(WeatherError::NotFound),
        FetchError::Generic(status) if status >= 500 => {
            AppError::Network(NetworkError::ServerError { status })
        }
        FetchError::Generic(status) => {
            AppError::Weather(WeatherError::ApiError(format!("status {}", status)))
        }
        FetchError::Unreachable(s) => AppError::Network(NetworkError::ConnectionFailed(s)),
        FetchError::MalformedResponse(s) => AppError::Network(NetworkError::InvalidResponse(s)),
        FetchError::Cancelled => AppError::Weather(WeatherError::Cancelled),
    }
}
