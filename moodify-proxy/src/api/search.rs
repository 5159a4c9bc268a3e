//! Raw catalog search passthrough

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{ApiError, ApiResult, AppState};

const DEFAULT_SEARCH_TYPE: &str = "track";
const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 50;

/// Query parameters, kept as strings so bad values produce our own 400 body
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub search_type: Option<String>,
    pub limit: Option<String>,
}

/// Parse `limit`, accepting 1..=50
fn parse_limit(raw: Option<&str>) -> ApiResult<u32> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_LIMIT);
    };
    match raw.parse::<u32>() {
        Ok(limit) if (1..=MAX_LIMIT).contains(&limit) => Ok(limit),
        _ => Err(ApiError::BadRequest(format!(
            "limit must be an integer between 1 and {}",
            MAX_LIMIT
        ))),
    }
}

/// GET /api/spotify/search?q=&type=&limit=
///
/// Returns the provider's own JSON untouched.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<serde_json::Value>> {
    let query = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Search query is required".to_string()))?;
    let search_type = params
        .search_type
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(DEFAULT_SEARCH_TYPE);
    let limit = parse_limit(params.limit.as_deref())?;

    if !state.spotify.is_configured() {
        return Err(ApiError::spotify_not_configured());
    }

    match state.spotify.search_raw(query, search_type, limit, None).await {
        Ok(body) => Ok(Json(body)),
        Err(e) => {
            tracing::error!(query = %query, error = %e, "Spotify search failed");
            state.record_error(format!("search: {}", e)).await;
            Err(e.into())
        }
    }
}

pub fn search_routes() -> Router<AppState> {
    Router::new().route("/api/spotify/search", get(search))
}
