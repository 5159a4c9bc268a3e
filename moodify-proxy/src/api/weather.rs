//! Current weather lookup

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use moodify_common::{Weather, WeatherQuery};
use serde::Deserialize;

use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct WeatherParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub city: Option<String>,
}

/// GET /api/weather?lat=&lon= or ?city=
pub async fn current_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherParams>,
) -> ApiResult<Json<Weather>> {
    let query = WeatherQuery::from_params(
        params.lat.as_deref(),
        params.lon.as_deref(),
        params.city.as_deref(),
    )?;

    if !state.weather.is_configured() {
        tracing::error!("Weather API key not configured");
        return Err(ApiError::weather_not_configured());
    }

    match state.weather.current(&query).await {
        Ok(weather) => {
            tracing::debug!(location = %weather.location, temperature = weather.temperature, "Weather fetched");
            Ok(Json(weather))
        }
        Err(e) => {
            tracing::error!(query = ?query, error = %e, "Weather lookup failed");
            state.record_error(format!("weather: {}", e)).await;
            Err(e.into())
        }
    }
}

pub fn weather_routes() -> Router<AppState> {
    Router::new().route("/api/weather", get(current_weather))
}
