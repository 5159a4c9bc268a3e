//! Integration tests for moodify-proxy endpoints

mod helpers;

use axum::http::StatusCode;
use helpers::{get_json, track_json, FakeProviders, SearchBehavior};
use moodify_proxy::{build_router, config::ProxyConfig, AppState};
use serde_json::json;

fn app_for(config: ProxyConfig) -> axum::Router {
    build_router(AppState::new(config).unwrap())
}

fn mixed_tracks(total: usize, with_preview: &[usize]) -> Vec<serde_json::Value> {
    (0..total)
        .map(|i| {
            let preview = with_preview
                .contains(&i)
                .then(|| format!("https://p.scdn.co/mp3-preview/{}", i));
            track_json(&i.to_string(), preview.as_deref())
        })
        .collect()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = get_json(app_for(ProxyConfig::default()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "moodify-proxy");
    assert!(body.get("last_error").is_none());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let (status, body) = get_json(app_for(ProxyConfig::default()), "/api/buildinfo").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["git_hash"].is_string());
}

#[tokio::test]
async fn test_status_reports_unconfigured_providers() {
    let (status, body) = get_json(app_for(ProxyConfig::default()), "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "API Configuration Status");
    assert_eq!(body["services"]["spotify"], "missing credentials");
    assert_eq!(body["services"]["weather"], "missing API key");
    assert_eq!(body["configured"], json!({"spotify": false, "weather": false}));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_status_reports_configured_providers() {
    let fake = FakeProviders::start(SearchBehavior::Tracks(vec![])).await;
    let (_, body) = get_json(app_for(fake.config()), "/api/status").await;
    assert_eq!(body["configured"], json!({"spotify": true, "weather": true}));
    assert_eq!(body["instructions"], "All APIs are configured correctly!");
}

#[tokio::test]
async fn test_recommendations_without_credentials() {
    let (status, body) = get_json(
        app_for(ProxyConfig::default()),
        "/api/spotify/recommendations/emotion/happy",
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "NOT_CONFIGURED");
    assert_eq!(
        body["error"]["details"],
        "Missing SPOTIFY_CLIENT_ID or SPOTIFY_CLIENT_SECRET"
    );
}

#[tokio::test]
async fn test_recommendations_prefer_previews() {
    let fake = FakeProviders::start(SearchBehavior::Tracks(mixed_tracks(40, &[2, 5, 9]))).await;
    let (status, body) = get_json(
        app_for(fake.config()),
        "/api/spotify/recommendations/emotion/happy",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let tracks = body.as_array().unwrap();
    assert_eq!(tracks.len(), 3);
    for track in tracks {
        assert!(track["previewUrl"].is_string());
        assert_eq!(track["emotion"], "happy");
        assert_eq!(track["artist"], "Arijit Singh");
    }
    assert_eq!(tracks[0]["id"], "2");
    assert_eq!(tracks[0]["imageUrl"], "https://i.scdn.co/image/2");

    let params = fake.last_search();
    assert_eq!(params.get("limit").map(String::as_str), Some("40"));
    assert_eq!(params.get("market").map(String::as_str), Some("IN"));
    assert_eq!(params.get("type").map(String::as_str), Some("track"));
    assert!(params["q"].contains("happy") || params["q"].contains("upbeat"));
}

#[tokio::test]
async fn test_recommendations_capped_at_eight() {
    let all: Vec<usize> = (0..40).collect();
    let fake = FakeProviders::start(SearchBehavior::Tracks(mixed_tracks(40, &all))).await;
    let (_, body) = get_json(
        app_for(fake.config()),
        "/api/spotify/recommendations/emotion/sad",
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_recommendations_fall_back_without_previews() {
    let fake = FakeProviders::start(SearchBehavior::Tracks(mixed_tracks(15, &[]))).await;
    let (status, body) = get_json(
        app_for(fake.config()),
        "/api/spotify/recommendations/emotion/angry",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let tracks = body.as_array().unwrap();
    assert_eq!(tracks.len(), 8);
    assert!(tracks.iter().all(|t| t["previewUrl"].is_null()));
}

#[tokio::test]
async fn test_unknown_emotion_is_tagged_neutral() {
    let fake = FakeProviders::start(SearchBehavior::Tracks(mixed_tracks(3, &[0]))).await;
    let (status, body) = get_json(
        app_for(fake.config()),
        "/api/spotify/recommendations/emotion/bored",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["emotion"], "neutral");
    let params = fake.last_search();
    let q = &params["q"];
    assert!(q.contains("bollywood") || q.contains("hindi"));
}

#[tokio::test]
async fn test_provider_error_message_is_forwarded() {
    let fake = FakeProviders::start(SearchBehavior::Fail {
        status: 400,
        body: r#"{"error":{"status":400,"message":"Invalid market code"}}"#.to_string(),
    })
    .await;
    let app = app_for(fake.config());
    let (status, body) = get_json(app.clone(), "/api/spotify/recommendations/emotion/happy").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "PROVIDER_ERROR");
    assert_eq!(body["error"]["message"], "Spotify API error: Invalid market code");

    // Failure is remembered for diagnostics
    let (_, health) = get_json(app, "/health").await;
    assert!(health["last_error"].as_str().unwrap().contains("recommendations"));
}

#[tokio::test]
async fn test_provider_plain_text_error_uses_generic_message() {
    let fake = FakeProviders::start(SearchBehavior::Fail {
        status: 503,
        body: "upstream unavailable".to_string(),
    })
    .await;
    let (_, body) = get_json(
        app_for(fake.config()),
        "/api/spotify/recommendations/emotion/neutral",
    )
    .await;
    assert_eq!(body["error"]["message"], "Failed to search Spotify");
}

#[tokio::test]
async fn test_token_rejection_is_auth_failure() {
    let fake = FakeProviders::start_with(SearchBehavior::Tracks(vec![]), true).await;
    let (status, body) = get_json(
        app_for(fake.config()),
        "/api/spotify/recommendations/emotion/happy",
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "PROVIDER_AUTH_FAILED");
    assert_eq!(body["error"]["message"], "Failed to authenticate with Spotify");
}

#[tokio::test]
async fn test_outage_is_distinguishable_from_missing_credentials() {
    // Nothing listens on port 9 of localhost
    let mut config = FakeProviders::start(SearchBehavior::Tracks(vec![])).await.config();
    config.endpoints.spotify_accounts_url = "http://127.0.0.1:9".to_string();
    let (outage_status, outage) = get_json(
        app_for(config),
        "/api/spotify/recommendations/emotion/happy",
    )
    .await;
    let (missing_status, missing) = get_json(
        app_for(ProxyConfig::default()),
        "/api/spotify/recommendations/emotion/happy",
    )
    .await;

    assert_eq!(outage_status, missing_status);
    assert_ne!(outage["error"]["code"], missing["error"]["code"]);
}

#[tokio::test]
async fn test_access_token_is_reused() {
    let fake = FakeProviders::start(SearchBehavior::Tracks(mixed_tracks(2, &[0]))).await;
    let app = app_for(fake.config());
    for emotion in ["happy", "sad", "fearful"] {
        let uri = format!("/api/spotify/recommendations/emotion/{}", emotion);
        let (status, _) = get_json(app.clone(), &uri).await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(fake.token_calls(), 1);
}

#[tokio::test]
async fn test_search_requires_query() {
    let fake = FakeProviders::start(SearchBehavior::Tracks(vec![])).await;
    let (status, body) = get_json(app_for(fake.config()), "/api/spotify/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Search query is required"));
}

#[tokio::test]
async fn test_search_passes_through_provider_json() {
    let fake = FakeProviders::start(SearchBehavior::Tracks(mixed_tracks(1, &[0]))).await;
    let (status, body) = get_json(app_for(fake.config()), "/api/spotify/search?q=kesariya").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tracks"]["total"], 1000);
    assert_eq!(body["tracks"]["items"][0]["preview_url"], "https://p.scdn.co/mp3-preview/0");

    let params = fake.last_search();
    assert_eq!(params["q"], "kesariya");
    assert_eq!(params["type"], "track");
    assert_eq!(params["limit"], "10");
    assert!(!params.contains_key("market"));
}

#[tokio::test]
async fn test_search_rejects_bad_limit() {
    let fake = FakeProviders::start(SearchBehavior::Tracks(vec![])).await;
    let (status, _) = get_json(
        app_for(fake.config()),
        "/api/spotify/search?q=rain&limit=500",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_weather_requires_location() {
    let fake = FakeProviders::start(SearchBehavior::Tracks(vec![])).await;
    let (status, body) = get_json(app_for(fake.config()), "/api/weather").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "Either coordinates (lat, lon) or city name is required"
    );
}

#[tokio::test]
async fn test_weather_location_checked_before_api_key() {
    let app = app_for(ProxyConfig::default());
    let (status, body) = get_json(app.clone(), "/api/weather").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, body) = get_json(app, "/api/weather?city=Pune").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "NOT_CONFIGURED");
}

#[tokio::test]
async fn test_weather_by_city_rounds_temperature() {
    let fake = FakeProviders::start(SearchBehavior::Tracks(vec![])).await;
    let (status, body) = get_json(app_for(fake.config()), "/api/weather?city=Mumbai").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"temperature": 28, "condition": "Clear", "location": "Mumbai", "icon": "01d"})
    );
    let params = fake.last_weather();
    assert_eq!(params["units"], "metric");
    assert_eq!(params["appid"], "test-weather-key");
}

#[tokio::test]
async fn test_weather_by_coordinates() {
    let fake = FakeProviders::start(SearchBehavior::Tracks(vec![])).await;
    let (status, _) = get_json(
        app_for(fake.config()),
        "/api/weather?lat=18.52&lon=73.85",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let params = fake.last_weather();
    assert_eq!(params["lat"], "18.52");
    assert_eq!(params["lon"], "73.85");
    assert!(!params.contains_key("q"));
}

#[tokio::test]
async fn test_weather_provider_error() {
    let fake = FakeProviders::start(SearchBehavior::Tracks(vec![])).await;
    let (status, body) = get_json(app_for(fake.config()), "/api/weather?city=Atlantis").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "PROVIDER_ERROR");
    assert_eq!(body["error"]["message"], "Weather API error: city not found");
}

#[tokio::test]
async fn test_weather_without_key() {
    let (status, body) = get_json(app_for(ProxyConfig::default()), "/api/weather?city=Pune").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "NOT_CONFIGURED");
}
