//! Provider configuration status

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: String,
    pub services: ServiceStatus,
    pub configured: ConfiguredFlags,
    pub instructions: String,
    pub timestamp: DateTime<Utc>,
}

/// Human-readable state per provider
#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub spotify: String,
    pub weather: String,
}

#[derive(Debug, Serialize)]
pub struct ConfiguredFlags {
    pub spotify: bool,
    pub weather: bool,
}

impl StatusResponse {
    pub fn new(spotify: bool, weather: bool) -> Self {
        let instructions = if spotify && weather {
            "All APIs are configured correctly!"
        } else {
            "Set SPOTIFY_CLIENT_ID, SPOTIFY_CLIENT_SECRET and OPENWEATHER_API_KEY in the environment or the [proxy] section of the config file"
        };

        Self {
            message: "API Configuration Status".to_string(),
            services: ServiceStatus {
                spotify: if spotify { "configured" } else { "missing credentials" }.to_string(),
                weather: if weather { "configured" } else { "missing API key" }.to_string(),
            },
            configured: ConfiguredFlags { spotify, weather },
            instructions: instructions.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// GET /api/status
pub async fn api_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let response = StatusResponse::new(
        state.config.spotify_configured(),
        state.config.weather_configured(),
    );
    tracing::info!(
        spotify = response.configured.spotify,
        weather = response.configured.weather,
        "API status check"
    );
    Json(response)
}

pub fn status_routes() -> Router<AppState> {
    Router::new().route("/api/status", get(api_status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fully_configured() {
        let status = StatusResponse::new(true, true);
        assert_eq!(status.services.spotify, "configured");
        assert_eq!(status.instructions, "All APIs are configured correctly!");
    }

    #[test]
    fn test_missing_weather() {
        let status = StatusResponse::new(true, false);
        assert_eq!(status.services.weather, "missing API key");
        assert!(!status.configured.weather);
        assert!(status.instructions.contains("OPENWEATHER_API_KEY"));
    }
}
