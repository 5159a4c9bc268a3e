//! Configuration resolution for moodify-proxy
//!
//! Provider credentials resolve ENV → TOML. A credential counts as configured
//! only when it is non-blank and not the placeholder value shipped in the
//! sample `.env` file.

use moodify_common::config::{resolve_setting, TomlConfig};
use tracing::{info, warn};

pub const SPOTIFY_CLIENT_ID_PLACEHOLDER: &str = "your_spotify_client_id_here";
pub const SPOTIFY_CLIENT_SECRET_PLACEHOLDER: &str = "your_spotify_client_secret_here";
pub const OPENWEATHER_API_KEY_PLACEHOLDER: &str = "your_openweather_api_key_here";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SPOTIFY_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_MARKET: &str = "IN";

/// Spotify client-credentials pair
#[derive(Clone, PartialEq, Eq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Base URLs of the upstream providers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub spotify_accounts_url: String,
    pub spotify_api_url: String,
    pub openweather_url: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            spotify_accounts_url: DEFAULT_SPOTIFY_ACCOUNTS_URL.to_string(),
            spotify_api_url: DEFAULT_SPOTIFY_API_URL.to_string(),
            openweather_url: DEFAULT_OPENWEATHER_URL.to_string(),
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ProxyOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Resolved proxy configuration
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    /// `None` when either half of the pair is missing or a placeholder
    pub spotify: Option<SpotifyCredentials>,
    /// `None` when missing or a placeholder
    pub openweather_api_key: Option<String>,
    pub endpoints: ProviderEndpoints,
    /// Catalog market for recommendation searches
    pub market: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            spotify: None,
            openweather_api_key: None,
            endpoints: ProviderEndpoints::default(),
            market: DEFAULT_MARKET.to_string(),
        }
    }
}

impl ProxyConfig {
    /// Resolve every setting through CLI → ENV → TOML → default
    pub fn resolve(overrides: ProxyOverrides, toml: &TomlConfig) -> Self {
        let section = &toml.proxy;

        let host = resolve_setting(
            overrides.host,
            "MOODIFY_HOST",
            section.host.clone(),
            DEFAULT_HOST.to_string(),
        );
        let port = resolve_setting(overrides.port, "MOODIFY_PORT", section.port, DEFAULT_PORT);

        let client_id = resolve_secret(
            "Spotify client id",
            "SPOTIFY_CLIENT_ID",
            section.spotify_client_id.as_deref(),
            SPOTIFY_CLIENT_ID_PLACEHOLDER,
        );
        let client_secret = resolve_secret(
            "Spotify client secret",
            "SPOTIFY_CLIENT_SECRET",
            section.spotify_client_secret.as_deref(),
            SPOTIFY_CLIENT_SECRET_PLACEHOLDER,
        );
        let spotify = match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Some(SpotifyCredentials {
                client_id,
                client_secret,
            }),
            (Some(_), None) | (None, Some(_)) => {
                warn!("Only half of the Spotify credential pair is configured - Spotify disabled");
                None
            }
            (None, None) => None,
        };

        let openweather_api_key = resolve_secret(
            "OpenWeather API key",
            "OPENWEATHER_API_KEY",
            section.openweather_api_key.as_deref(),
            OPENWEATHER_API_KEY_PLACEHOLDER,
        );

        let endpoints = ProviderEndpoints {
            spotify_accounts_url: section
                .spotify_accounts_url
                .clone()
                .unwrap_or_else(|| DEFAULT_SPOTIFY_ACCOUNTS_URL.to_string()),
            spotify_api_url: section
                .spotify_api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_SPOTIFY_API_URL.to_string()),
            openweather_url: section
                .openweather_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENWEATHER_URL.to_string()),
        };

        Self {
            host,
            port,
            spotify,
            openweather_api_key,
            endpoints,
            market: section
                .market
                .clone()
                .unwrap_or_else(|| DEFAULT_MARKET.to_string()),
        }
    }

    pub fn spotify_configured(&self) -> bool {
        self.spotify.is_some()
    }

    pub fn weather_configured(&self) -> bool {
        self.openweather_api_key.is_some()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Validate a credential: non-blank and not the shipped placeholder
pub fn is_valid_key(key: &str, placeholder: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != placeholder
}

/// Resolve a credential from ENV, then TOML
fn resolve_secret(
    label: &str,
    env_var: &str,
    toml_value: Option<&str>,
    placeholder: &str,
) -> Option<String> {
    let env_value = std::env::var(env_var)
        .ok()
        .filter(|v| is_valid_key(v, placeholder));
    let toml_value = toml_value.filter(|v| is_valid_key(v, placeholder));

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} found in both environment and TOML. Using environment (higher priority).",
            label
        );
    }

    if let Some(value) = env_value {
        info!("{} loaded from environment variable", label);
        return Some(value.trim().to_string());
    }
    if let Some(value) = toml_value {
        info!("{} loaded from TOML config", label);
        return Some(value.trim().to_string());
    }

    warn!("{} not configured (set {})", label, env_var);
    None
}
