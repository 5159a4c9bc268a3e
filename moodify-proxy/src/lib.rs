//! moodify-proxy library interface
//!
//! Stateless proxy in front of the music catalog and weather providers so
//! credentials never reach the browser. Exposed as a library for integration
//! testing.

pub mod api;
pub mod config;
pub mod error;
pub mod services;

pub use crate::config::ProxyConfig;
pub use crate::error::{ApiError, ApiResult};

use anyhow::Context;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::services::{Recommender, SpotifyClient, WeatherClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub spotify: Arc<SpotifyClient>,
    pub weather: Arc<WeatherClient>,
    pub recommender: Arc<Recommender>,
    pub startup_time: DateTime<Utc>,
    /// Last provider failure, surfaced on /health
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> anyhow::Result<Self> {
        let endpoints = &config.endpoints;

        let spotify = Arc::new(
            SpotifyClient::new(
                config.spotify.clone(),
                &endpoints.spotify_accounts_url,
                &endpoints.spotify_api_url,
            )
            .context("Failed to create Spotify client")?,
        );
        let weather = Arc::new(
            WeatherClient::new(config.openweather_api_key.clone(), &endpoints.openweather_url)
                .context("Failed to create weather client")?,
        );
        let recommender = Arc::new(Recommender::new(Arc::clone(&spotify), config.market.clone()));

        Ok(Self {
            config: Arc::new(config),
            spotify,
            weather,
            recommender,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        })
    }

    pub async fn record_error(&self, message: String) {
        *self.last_error.write().await = Some(message);
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::recommendation_routes())
        .merge(api::search_routes())
        .merge(api::weather_routes())
        .merge(api::status_routes())
        .merge(api::buildinfo_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
