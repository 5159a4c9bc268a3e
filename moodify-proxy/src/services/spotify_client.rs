//! Spotify Web API client
//!
//! Client-credentials flow: the access token is fetched from the accounts
//! service and reused until shortly before it expires.

use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::SpotifyCredentials;

const USER_AGENT: &str = concat!("Moodify/", env!("CARGO_PKG_VERSION"));
/// Refresh this long before the provider-reported expiry
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Spotify client errors
#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("Spotify credentials not configured")]
    NotConfigured,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Non-success search response; `message` is the provider's own text when parseable
    #[error("API error {status}: {}", .message.as_deref().unwrap_or("unknown"))]
    Api { status: u16, message: Option<String> },

    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Lifetime in seconds
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Track as returned by `/search?type=track`
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    pub album: Option<SpotifyAlbum>,
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyAlbum {
    pub name: String,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct TrackSearchResponse {
    tracks: TrackPage,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<SpotifyTrack>,
}

struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

/// Spotify API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    credentials: Option<SpotifyCredentials>,
    accounts_url: String,
    api_url: String,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyClient {
    pub fn new(
        credentials: Option<SpotifyCredentials>,
        accounts_url: &str,
        api_url: &str,
    ) -> Result<Self, SpotifyError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| SpotifyError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            credentials,
            accounts_url: accounts_url.trim_end_matches('/').to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Current access token, fetching a new one when absent or near expiry
    ///
    /// The cache lock is held across the fetch so concurrent requests share one token call.
    pub async fn access_token(&self) -> Result<String, SpotifyError> {
        let credentials = self.credentials.as_ref().ok_or(SpotifyError::NotConfigured)?;

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.access_token.clone());
            }
            tracing::debug!("Spotify access token near expiry, refreshing");
        }

        let url = format!("{}/api/token", self.accounts_url);
        let response = self
            .http_client
            .post(&url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| SpotifyError::AuthenticationFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "Spotify token error");
            return Err(SpotifyError::AuthenticationFailed(format!(
                "token endpoint returned {}",
                status
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SpotifyError::AuthenticationFailed(e.to_string()))?;

        let lifetime = Duration::from_secs(token.expires_in);
        let refresh_at = Instant::now() + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN);
        tracing::info!(expires_in = token.expires_in, "Obtained Spotify access token");

        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            refresh_at,
        });
        Ok(token.access_token)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    /// Raw catalog search, returned as provider-native JSON
    pub async fn search_raw(
        &self,
        query: &str,
        search_type: &str,
        limit: u32,
        market: Option<&str>,
    ) -> Result<serde_json::Value, SpotifyError> {
        let response = self.send_search(query, search_type, limit, market).await?;
        response
            .json()
            .await
            .map_err(|e| SpotifyError::Parse(e.to_string()))
    }

    /// Track search, decoded into [`SpotifyTrack`]s
    pub async fn search_tracks(
        &self,
        query: &str,
        limit: u32,
        market: Option<&str>,
    ) -> Result<Vec<SpotifyTrack>, SpotifyError> {
        let response = self.send_search(query, "track", limit, market).await?;
        let page: TrackSearchResponse = response
            .json()
            .await
            .map_err(|e| SpotifyError::Parse(e.to_string()))?;

        tracing::debug!(
            query = %query,
            count = page.tracks.items.len(),
            "Retrieved tracks from Spotify search"
        );
        Ok(page.tracks.items)
    }

    async fn send_search(
        &self,
        query: &str,
        search_type: &str,
        limit: u32,
        market: Option<&str>,
    ) -> Result<reqwest::Response, SpotifyError> {
        let token = self.access_token().await?;

        let limit = limit.to_string();
        let mut params = vec![("q", query), ("type", search_type), ("limit", limit.as_str())];
        if let Some(market) = market {
            params.push(("market", market));
        }

        let url = format!("{}/search", self.api_url);
        tracing::debug!(url = %url, query = %query, "Searching Spotify");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .query(&params)
            .send()
            .await
            .map_err(|e| SpotifyError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Revoked or rotated credentials; next request fetches a fresh token
            self.invalidate_token().await;
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = status.as_u16(), body = %body, "Spotify search error");
        Err(SpotifyError::Api {
            status: status.as_u16(),
            message: provider_error_message(&body),
        })
    }
}

/// Extract `error.message` from a provider error body, if it is JSON
pub fn provider_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        // OAuth endpoints use error_description with error as a string
        .or_else(|| value.get("error_description").and_then(|m| m.as_str()))?;
    Some(message.to_string())
}
