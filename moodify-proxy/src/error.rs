//! Error types for moodify-proxy
//!
//! Every failure is scoped to one request. The `code` field lets a client
//! tell "not configured" apart from "provider is down" even though both are
//! reported as HTTP 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::{SpotifyError, WeatherError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Provider credentials missing or placeholder (500)
    #[error("{message}")]
    NotConfigured { message: String, details: String },

    /// Provider rejected our credentials (500)
    #[error("{0}")]
    ProviderAuth(String),

    /// Provider query failed (500)
    #[error("{0}")]
    Provider(String),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// moodify-common error
    #[error(transparent)]
    Common(#[from] moodify_common::Error),
}

impl ApiError {
    pub fn spotify_not_configured() -> Self {
        ApiError::NotConfigured {
            message: "Spotify API credentials not configured. Please check your .env file."
                .to_string(),
            details: "Missing SPOTIFY_CLIENT_ID or SPOTIFY_CLIENT_SECRET".to_string(),
        }
    }

    pub fn weather_not_configured() -> Self {
        ApiError::NotConfigured {
            message: "Weather API key not configured. Please check your .env file.".to_string(),
            details: "Missing OPENWEATHER_API_KEY".to_string(),
        }
    }

    /// Machine-readable error code carried in the response body
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotConfigured { .. } => "NOT_CONFIGURED",
            ApiError::ProviderAuth(_) => "PROVIDER_AUTH_FAILED",
            ApiError::Provider(_) => "PROVIDER_ERROR",
            ApiError::Other(_) => "INTERNAL_ERROR",
            ApiError::Common(moodify_common::Error::InvalidInput(_)) => "BAD_REQUEST",
            ApiError::Common(moodify_common::Error::Config(_)) => "NOT_CONFIGURED",
            ApiError::Common(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code() {
            "BAD_REQUEST" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SpotifyError> for ApiError {
    fn from(err: SpotifyError) -> Self {
        match err {
            SpotifyError::NotConfigured => ApiError::spotify_not_configured(),
            SpotifyError::AuthenticationFailed(_) => {
                ApiError::ProviderAuth("Failed to authenticate with Spotify".to_string())
            }
            SpotifyError::Api { message, .. } => match message {
                Some(message) => ApiError::Provider(format!("Spotify API error: {}", message)),
                None => ApiError::Provider("Failed to search Spotify".to_string()),
            },
            SpotifyError::Network(_) | SpotifyError::Parse(_) => {
                ApiError::Provider("An error occurred with the Spotify API".to_string())
            }
        }
    }
}

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        match err {
            WeatherError::NotConfigured => ApiError::weather_not_configured(),
            WeatherError::Api { message, .. } => match message {
                Some(message) => ApiError::Provider(format!("Weather API error: {}", message)),
                None => ApiError::Provider("Failed to fetch weather data".to_string()),
            },
            WeatherError::Network(_) | WeatherError::Parse(_) => {
                ApiError::Provider("An error occurred with the Weather API".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match self {
            ApiError::NotConfigured { message, details } => json!({
                "error": {
                    "code": code,
                    "message": message,
                    "details": details,
                }
            }),
            ApiError::Common(moodify_common::Error::InvalidInput(message)) => json!({
                "error": {
                    "code": code,
                    "message": message,
                }
            }),
            other => json!({
                "error": {
                    "code": code,
                    "message": other.to_string(),
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_and_provider_errors_have_distinct_codes() {
        let missing = ApiError::spotify_not_configured();
        let down = ApiError::from(SpotifyError::Network("connection refused".to_string()));
        assert_eq!(missing.status(), down.status());
        assert_ne!(missing.code(), down.code());
    }

    #[test]
    fn test_auth_failure_message() {
        let err = ApiError::from(SpotifyError::AuthenticationFailed("invalid_client".to_string()));
        assert_eq!(err.code(), "PROVIDER_AUTH_FAILED");
        assert_eq!(err.to_string(), "Failed to authenticate with Spotify");
    }

    #[test]
    fn test_provider_message_is_forwarded_when_known() {
        let err = ApiError::from(SpotifyError::Api {
            status: 400,
            message: Some("Invalid limit".to_string()),
        });
        assert_eq!(err.to_string(), "Spotify API error: Invalid limit");

        let err = ApiError::from(SpotifyError::Api {
            status: 502,
            message: None,
        });
        assert_eq!(err.to_string(), "Failed to search Spotify");
    }

    #[test]
    fn test_common_invalid_input_is_bad_request() {
        let err = ApiError::from(moodify_common::Error::InvalidInput("lat".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
