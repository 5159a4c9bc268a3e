//! OpenWeather current-conditions client

use moodify_common::{Weather, WeatherQuery};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use super::spotify_client::provider_error_message;

const USER_AGENT: &str = concat!("Moodify/", env!("CARGO_PKG_VERSION"));

/// Weather client errors
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Weather API key not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {}", .message.as_deref().unwrap_or("unknown"))]
    Api { status: u16, message: Option<String> },

    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    main: MainReadings,
    #[serde(default)]
    weather: Vec<Condition>,
    name: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    main: String,
    icon: String,
}

/// OpenWeather API client
pub struct WeatherClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherClient {
    pub fn new(api_key: Option<String>, base_url: &str) -> Result<Self, WeatherError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Current conditions for a location, in metric units
    pub async fn current(&self, query: &WeatherQuery) -> Result<Weather, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::NotConfigured)?;

        let mut params: Vec<(&str, String)> = match query {
            WeatherQuery::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
            WeatherQuery::City { city } => vec![("q", city.clone())],
        };
        params.push(("units", "metric".to_string()));
        params.push(("appid", api_key.to_string()));

        let url = format!("{}/weather", self.base_url);
        tracing::debug!(url = %url, query = ?query, "Querying OpenWeather API");

        let response = self
            .http_client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "Weather API error");
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message: provider_error_message(&body).or_else(|| openweather_message(&body)),
            });
        }

        let raw: CurrentWeatherResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        to_weather(raw)
    }
}

fn to_weather(raw: CurrentWeatherResponse) -> Result<Weather, WeatherError> {
    let condition = raw
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::Parse("response has no weather conditions".to_string()))?;

    Ok(Weather {
        temperature: raw.main.temp.round() as i32,
        condition: condition.main,
        location: raw.name,
        icon: condition.icon,
    })
}

/// OpenWeather reports errors as `{"cod": "404", "message": "city not found"}`
fn openweather_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_is_rounded() {
        let raw: CurrentWeatherResponse = serde_json::from_str(
            r#"{"main":{"temp":28.6},"weather":[{"main":"Haze","icon":"50d"}],"name":"Mumbai"}"#,
        )
        .unwrap();
        let weather = to_weather(raw).unwrap();
        assert_eq!(weather.temperature, 29);
        assert_eq!(weather.condition, "Haze");
        assert_eq!(weather.location, "Mumbai");
        assert_eq!(weather.icon, "50d");
    }

    #[test]
    fn test_negative_temperature_rounds_half_away_from_zero() {
        let raw: CurrentWeatherResponse = serde_json::from_str(
            r#"{"main":{"temp":-2.5},"weather":[{"main":"Snow","icon":"13n"}],"name":"Oslo"}"#,
        )
        .unwrap();
        assert_eq!(to_weather(raw).unwrap().temperature, -3);
    }

    #[test]
    fn test_missing_conditions_is_parse_error() {
        let raw: CurrentWeatherResponse =
            serde_json::from_str(r#"{"main":{"temp":10.0},"weather":[],"name":"Nowhere"}"#)
                .unwrap();
        assert!(matches!(to_weather(raw), Err(WeatherError::Parse(_))));
    }

    #[test]
    fn test_openweather_error_message() {
        assert_eq!(
            openweather_message(r#"{"cod":"404","message":"city not found"}"#),
            Some("city not found".to_string())
        );
    }

    #[tokio::test]
    async fn test_current_requires_api_key() {
        let client = WeatherClient::new(None, "http://localhost").unwrap();
        let err = client.current(&WeatherQuery::city("Pune")).await.unwrap_err();
        assert!(matches!(err, WeatherError::NotConfigured));
    }
}
