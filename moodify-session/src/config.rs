//! Session configuration (CLI → ENV → TOML → default)

use moodify_common::config::{resolve_setting, TomlConfig};
use moodify_common::{Error, Result};
use std::time::Duration;

use crate::sampler::DEFAULT_CLASSIFY_TIMEOUT;
use crate::tracker::{
    StabilityConfig, DEFAULT_MAJORITY_THRESHOLD, DEFAULT_MIN_CONFIDENCE, DEFAULT_WINDOW_SIZE,
};

pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_FALLBACK_CITY: &str = "New York";

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub proxy_url: String,
    pub tick_interval: Duration,
    /// Longest a single classification may run before the tick is skipped
    pub classify_timeout: Duration,
    pub stability: StabilityConfig,
    /// Weather location used when the user's position is unknown
    pub fallback_city: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            classify_timeout: DEFAULT_CLASSIFY_TIMEOUT,
            stability: StabilityConfig::default(),
            fallback_city: DEFAULT_FALLBACK_CITY.to_string(),
        }
    }
}

impl SessionConfig {
    /// Resolve from the `[session]` TOML section; `proxy_url` also honors
    /// `MOODIFY_PROXY_URL`
    pub fn resolve(proxy_url: Option<String>, toml: &TomlConfig) -> Result<Self> {
        let section = &toml.session;

        let proxy_url = resolve_setting(
            proxy_url,
            "MOODIFY_PROXY_URL",
            section.proxy_url.clone(),
            DEFAULT_PROXY_URL.to_string(),
        );

        let tick_ms = section.tick_interval_ms.unwrap_or(DEFAULT_TICK_INTERVAL_MS);
        if tick_ms == 0 {
            return Err(Error::Config("tick_interval_ms must be positive".to_string()));
        }

        let classify_timeout = match section.classify_timeout_ms {
            Some(0) => {
                return Err(Error::Config(
                    "classify_timeout_ms must be positive".to_string(),
                ))
            }
            Some(ms) => Duration::from_millis(ms),
            None => DEFAULT_CLASSIFY_TIMEOUT,
        };

        let stability = StabilityConfig {
            window_size: section.window_size.unwrap_or(DEFAULT_WINDOW_SIZE),
            majority_threshold: section
                .majority_threshold
                .unwrap_or(DEFAULT_MAJORITY_THRESHOLD),
            min_confidence: section.min_confidence.unwrap_or(DEFAULT_MIN_CONFIDENCE),
        };
        stability.validate()?;

        let fallback_city = section
            .fallback_city
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FALLBACK_CITY.to_string());

        Ok(Self {
            proxy_url,
            tick_interval: Duration::from_millis(tick_ms),
            classify_timeout,
            stability,
            fallback_city,
        })
    }
}
