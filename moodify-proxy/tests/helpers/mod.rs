//! Fake upstream providers for proxy integration tests
//!
//! One axum server on an ephemeral port plays the Spotify accounts service,
//! the Spotify Web API (under `/v1`) and OpenWeather (under `/data/2.5`).

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use http_body_util::BodyExt;
use moodify_proxy::config::{ProviderEndpoints, ProxyConfig, SpotifyCredentials};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

/// How the fake search endpoint answers
#[derive(Clone)]
pub enum SearchBehavior {
    Tracks(Vec<Value>),
    Fail { status: u16, body: String },
}

#[derive(Clone)]
struct FakeState {
    search: SearchBehavior,
    reject_token: bool,
    token_calls: Arc<AtomicUsize>,
    last_search: Arc<Mutex<Option<HashMap<String, String>>>>,
    last_weather: Arc<Mutex<Option<HashMap<String, String>>>>,
}

pub struct FakeProviders {
    pub base_url: String,
    pub token_calls: Arc<AtomicUsize>,
    last_search: Arc<Mutex<Option<HashMap<String, String>>>>,
    last_weather: Arc<Mutex<Option<HashMap<String, String>>>>,
}

impl FakeProviders {
    pub async fn start(search: SearchBehavior) -> Self {
        Self::start_with(search, false).await
    }

    pub async fn start_with(search: SearchBehavior, reject_token: bool) -> Self {
        let state = FakeState {
            search,
            reject_token,
            token_calls: Arc::new(AtomicUsize::new(0)),
            last_search: Arc::new(Mutex::new(None)),
            last_weather: Arc::new(Mutex::new(None)),
        };

        let app = Router::new()
            .route("/api/token", post(token))
            .route("/v1/search", get(search_handler))
            .route("/data/2.5/weather", get(weather))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            token_calls: state.token_calls,
            last_search: state.last_search,
            last_weather: state.last_weather,
        }
    }

    pub fn endpoints(&self) -> ProviderEndpoints {
        ProviderEndpoints {
            spotify_accounts_url: self.base_url.clone(),
            spotify_api_url: format!("{}/v1", self.base_url),
            openweather_url: format!("{}/data/2.5", self.base_url),
        }
    }

    /// Fully configured proxy pointing at this fake
    pub fn config(&self) -> ProxyConfig {
        ProxyConfig {
            spotify: Some(SpotifyCredentials {
                client_id: "test-client".to_string(),
                client_secret: "test-secret".to_string(),
            }),
            openweather_api_key: Some("test-weather-key".to_string()),
            endpoints: self.endpoints(),
            ..ProxyConfig::default()
        }
    }

    pub fn last_search(&self) -> HashMap<String, String> {
        self.last_search.lock().unwrap().clone().unwrap_or_default()
    }

    pub fn last_weather(&self) -> HashMap<String, String> {
        self.last_weather.lock().unwrap().clone().unwrap_or_default()
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }
}

async fn token(State(state): State<FakeState>, request: Request<Body>) -> Response {
    state.token_calls.fetch_add(1, Ordering::SeqCst);
    let has_basic = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic "));

    if state.reject_token || !has_basic {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_client", "error_description": "Invalid client"})),
        )
            .into_response();
    }

    Json(json!({
        "access_token": "fake-token",
        "token_type": "Bearer",
        "expires_in": 3600
    }))
    .into_response()
}

async fn search_handler(
    State(state): State<FakeState>,
    Query(params): Query<HashMap<String, String>>,
    request: Request<Body>,
) -> Response {
    let bearer = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *state.last_search.lock().unwrap() = Some(params);

    if bearer.as_deref() != Some("Bearer fake-token") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"status": 401, "message": "No token provided"}})),
        )
            .into_response();
    }

    match state.search {
        SearchBehavior::Tracks(items) => Json(json!({
            "tracks": {"items": items, "total": 1000}
        }))
        .into_response(),
        SearchBehavior::Fail { status, body } => (
            StatusCode::from_u16(status).unwrap(),
            body,
        )
            .into_response(),
    }
}

async fn weather(
    State(state): State<FakeState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let location = params.get("q").cloned().unwrap_or_else(|| "Pune".to_string());
    *state.last_weather.lock().unwrap() = Some(params);

    if location == "Atlantis" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"cod": "404", "message": "city not found"})),
        )
            .into_response();
    }

    Json(json!({
        "main": {"temp": 27.6, "humidity": 60},
        "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
        "name": location
    }))
    .into_response()
}

/// Catalog track as the search endpoint returns it
pub fn track_json(id: &str, preview: Option<&str>) -> Value {
    json!({
        "id": id,
        "name": format!("Track {}", id),
        "artists": [{"name": "Arijit Singh"}, {"name": "Pritam"}],
        "album": {
            "name": "Album",
            "images": [{"url": format!("https://i.scdn.co/image/{}", id), "height": 640}]
        },
        "preview_url": preview
    })
}

/// Send a GET through the router and decode the JSON body
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
