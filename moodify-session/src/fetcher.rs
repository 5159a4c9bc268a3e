//! Recommendation and weather fetchers
//!
//! One request per firing, no automatic retry. Every failure collapses into
//! [`FetchError::Unavailable`] carrying a message fit for display.

use moodify_common::{Emotion, TrackResult, Weather, WeatherQuery};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("moodify-session/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{0}")]
    Unavailable(String),
}

#[async_trait::async_trait]
pub trait RecommendationFetcher: Send + Sync {
    async fn fetch(&self, emotion: Emotion) -> Result<Vec<TrackResult>, FetchError>;
}

#[async_trait::async_trait]
pub trait WeatherFetcher: Send + Sync {
    async fn current(&self, query: &WeatherQuery) -> Result<Weather, FetchError>;
}

/// Weather for the user's position, or for `fallback_city` when unknown
pub async fn ambient_weather(
    fetcher: &dyn WeatherFetcher,
    coordinates: Option<(f64, f64)>,
    fallback_city: &str,
) -> Result<Weather, FetchError> {
    let query = match coordinates {
        Some((lat, lon)) => WeatherQuery::Coordinates { lat, lon },
        None => {
            tracing::info!(city = %fallback_city, "Location unavailable, using default location for weather");
            WeatherQuery::city(fallback_city)
        }
    };
    fetcher.current(&query).await
}

/// Talks to a running moodify-proxy
pub struct ProxyFetcher {
    http_client: reqwest::Client,
    base_url: String,
}

impl ProxyFetcher {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| FetchError::Unavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Proxy request");

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, error = %e, "Proxy unreachable");
                FetchError::Unavailable(format!("Could not reach the recommendation service: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = proxy_error_message(&body)
                .unwrap_or_else(|| format!("Request failed with status {}", status));
            tracing::warn!(status = status.as_u16(), message = %message, "Proxy returned an error");
            return Err(FetchError::Unavailable(message));
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::Unavailable(format!("Unexpected response from proxy: {}", e)))
    }
}

#[async_trait::async_trait]
impl RecommendationFetcher for ProxyFetcher {
    async fn fetch(&self, emotion: Emotion) -> Result<Vec<TrackResult>, FetchError> {
        let path = format!("/api/spotify/recommendations/emotion/{}", emotion);
        self.get_json(&path, &[]).await
    }
}

#[async_trait::async_trait]
impl WeatherFetcher for ProxyFetcher {
    async fn current(&self, query: &WeatherQuery) -> Result<Weather, FetchError> {
        self.get_json("/api/weather", &query.query_pairs()).await
    }
}

/// `error.message` from the proxy's JSON error body
fn proxy_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
