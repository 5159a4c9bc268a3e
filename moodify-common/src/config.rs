//! Configuration loading and setting resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: the module logs a warning and starts
//! with defaults. A TOML file that exists but does not parse is an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Top-level TOML configuration shared by all Moodify modules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub logging: LoggingConfig,
    pub proxy: ProxyToml,
    pub session: SessionToml,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `[proxy]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyToml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub openweather_api_key: Option<String>,
    pub spotify_accounts_url: Option<String>,
    pub spotify_api_url: Option<String>,
    pub openweather_url: Option<String>,
    pub market: Option<String>,
}

/// `[session]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionToml {
    pub proxy_url: Option<String>,
    pub tick_interval_ms: Option<u64>,
    pub classify_timeout_ms: Option<u64>,
    pub window_size: Option<usize>,
    pub majority_threshold: Option<f64>,
    pub min_confidence: Option<f32>,
    pub fallback_city: Option<String>,
}

/// Default TOML path for a module: `<config dir>/moodify/<module>.toml`
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("moodify").join(format!("{}.toml", module_name)))
}

/// Load a TOML config file, falling back to defaults when the file is absent
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {} - using defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Load the TOML config for a module from an explicit path or the default location
pub fn load_module_config(explicit_path: Option<&Path>, module_name: &str) -> Result<TomlConfig> {
    match explicit_path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            load_toml_config(path)
        }
        None => match default_config_path(module_name) {
            Some(path) => load_toml_config(&path),
            None => {
                warn!("Could not determine config directory - using defaults");
                Ok(TomlConfig::default())
            }
        },
    }
}

/// Resolve one setting through CLI → ENV → TOML → default
///
/// An environment value that fails to parse is logged and skipped.
pub fn resolve_setting<T>(cli: Option<T>, env_var: &str, toml_value: Option<T>, default: T) -> T
where
    T: FromStr,
{
    if let Some(value) = cli {
        debug!(setting = env_var, "Using command-line value");
        return value;
    }

    if let Ok(raw) = std::env::var(env_var) {
        match raw.trim().parse::<T>() {
            Ok(value) => {
                debug!(setting = env_var, "Using environment value");
                return value;
            }
            Err(_) => warn!("Ignoring unparseable value in {}: {:?}", env_var, raw),
        }
    }

    if let Some(value) = toml_value {
        debug!(setting = env_var, "Using TOML value");
        return value;
    }

    default
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path_is_namespaced() {
        if let Some(path) = default_config_path("moodify-proxy") {
            assert!(path.ends_with("moodify/moodify-proxy.toml"));
        }
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TomlConfig = toml::from_str("[proxy]\nport = 6001\n").unwrap();
        assert_eq!(config.proxy.port, Some(6001));
        assert_eq!(config.logging.level, "info");
        assert!(config.session.window_size.is_none());
    }
}
