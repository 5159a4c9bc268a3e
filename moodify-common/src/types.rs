//! Data model shared between the proxy and the session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Emotion, Error, Result};

/// One classifier observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionSample {
    pub label: Emotion,
    /// Classifier confidence, clamped to [0.0, 1.0]
    pub confidence: f32,
    pub observed_at: DateTime<Utc>,
}

impl EmotionSample {
    pub fn new(label: Emotion, confidence: f32) -> Self {
        Self::at(label, confidence, Utc::now())
    }

    pub fn at(label: Emotion, confidence: f32, observed_at: DateTime<Utc>) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            label,
            confidence,
            observed_at,
        }
    }
}

/// A recommended track, tagged with the emotion it was recommended for
///
/// Wire names follow the front end's schema (`name`, `imageUrl`, `previewUrl`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackResult {
    pub id: String,
    #[serde(rename = "name")]
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    pub emotion: Emotion,
}

impl TrackResult {
    pub fn has_preview(&self) -> bool {
        self.preview_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Current conditions at the user's location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weather {
    /// Degrees Celsius, rounded to the nearest integer
    pub temperature: i32,
    pub condition: String,
    pub location: String,
    /// Provider icon code (e.g. "01d"); a trailing `n` marks night
    pub icon: String,
}

/// Where to look up weather
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WeatherQuery {
    Coordinates { lat: f64, lon: f64 },
    City { city: String },
}

impl WeatherQuery {
    /// Build a query from raw request parameters
    ///
    /// Coordinates win when both forms are present. Blank values count as absent.
    pub fn from_params(
        lat: Option<&str>,
        lon: Option<&str>,
        city: Option<&str>,
    ) -> Result<Self> {
        let lat = lat.map(str::trim).filter(|s| !s.is_empty());
        let lon = lon.map(str::trim).filter(|s| !s.is_empty());
        let city = city.map(str::trim).filter(|s| !s.is_empty());

        match (lat, lon, city) {
            (Some(lat), Some(lon), _) => {
                let lat = parse_coordinate("lat", lat, 90.0)?;
                let lon = parse_coordinate("lon", lon, 180.0)?;
                Ok(WeatherQuery::Coordinates { lat, lon })
            }
            (_, _, Some(city)) => Ok(WeatherQuery::City {
                city: city.to_string(),
            }),
            _ => Err(Error::InvalidInput(
                "Either coordinates (lat, lon) or city name is required".to_string(),
            )),
        }
    }

    pub fn city(name: impl Into<String>) -> Self {
        WeatherQuery::City { city: name.into() }
    }

    /// Query-string pairs in the proxy's `/api/weather` form
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            WeatherQuery::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
            WeatherQuery::City { city } => vec![("city", city.clone())],
        }
    }
}

fn parse_coordinate(name: &str, raw: &str, bound: f64) -> Result<f64> {
    let value: f64 = raw
        .parse()
        .map_err(|_| Error::InvalidInput(format!("{} must be a number, got {:?}", name, raw)))?;
    if !value.is_finite() || value.abs() > bound {
        return Err(Error::InvalidInput(format!(
            "{} out of range: {}",
            name, value
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_confidence_is_clamped() {
        assert_eq!(EmotionSample::new(Emotion::Happy, 1.7).confidence, 1.0);
        assert_eq!(EmotionSample::new(Emotion::Happy, -0.2).confidence, 0.0);
        assert_eq!(EmotionSample::new(Emotion::Happy, f32::NAN).confidence, 0.0);
    }

    #[test]
    fn test_track_wire_format() {
        let track = TrackResult {
            id: "abc".to_string(),
            title: "Kesariya".to_string(),
            artist: "Arijit Singh".to_string(),
            album: Some("Brahmastra".to_string()),
            cover_url: None,
            preview_url: Some("https://p.scdn.co/mp3-preview/abc".to_string()),
            emotion: Emotion::Happy,
        };

        let json = serde_json::to_value(&track).unwrap();
        assert_eq!(json["name"], "Kesariya");
        assert_eq!(json["previewUrl"], "https://p.scdn.co/mp3-preview/abc");
        assert_eq!(json["emotion"], "happy");
        assert!(json.get("imageUrl").is_none());
    }

    #[test]
    fn test_track_empty_preview_is_not_playable() {
        let json = r#"{"id":"1","name":"x","artist":"y","previewUrl":"","emotion":"sad"}"#;
        let track: TrackResult = serde_json::from_str(json).unwrap();
        assert!(!track.has_preview());
    }

    #[test]
    fn test_weather_query_prefers_coordinates() {
        let query = WeatherQuery::from_params(Some("19.07"), Some("72.87"), Some("Pune")).unwrap();
        assert_eq!(query, WeatherQuery::Coordinates { lat: 19.07, lon: 72.87 });
    }

    #[test]
    fn test_weather_query_falls_back_to_city() {
        let query = WeatherQuery::from_params(Some("19.07"), None, Some("Pune")).unwrap();
        assert_eq!(query, WeatherQuery::city("Pune"));
    }

    #[test]
    fn test_weather_query_requires_location() {
        assert!(WeatherQuery::from_params(None, None, None).is_err());
        assert!(WeatherQuery::from_params(Some("1.0"), None, Some("  ")).is_err());
    }

    #[test]
    fn test_weather_query_rejects_bad_coordinates() {
        assert!(WeatherQuery::from_params(Some("north"), Some("0"), None).is_err());
        assert!(WeatherQuery::from_params(Some("91"), Some("0"), None).is_err());
    }
}
