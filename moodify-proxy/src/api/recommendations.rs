//! Emotion-driven track recommendations

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use moodify_common::{Emotion, TrackResult};

use crate::{ApiError, ApiResult, AppState};

/// GET /api/spotify/recommendations/emotion/:emotion
///
/// Unrecognized labels are not rejected: they get the default query
/// phrasings and results tagged `neutral`.
pub async fn recommendations_for_emotion(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> ApiResult<Json<Vec<TrackResult>>> {
    if !state.spotify.is_configured() {
        tracing::error!("Spotify credentials not configured");
        return Err(ApiError::spotify_not_configured());
    }

    let emotion = match label.parse::<Emotion>() {
        Ok(emotion) => Some(emotion),
        Err(_) => {
            tracing::debug!(label = %label, "Unrecognized emotion label, using default queries");
            None
        }
    };

    match state.recommender.recommend(emotion).await {
        Ok(tracks) => Ok(Json(tracks)),
        Err(e) => {
            tracing::error!(label = %label, error = %e, "Recommendation search failed");
            state.record_error(format!("recommendations: {}", e)).await;
            Err(e.into())
        }
    }
}

pub fn recommendation_routes() -> Router<AppState> {
    Router::new().route(
        "/api/spotify/recommendations/emotion/:emotion",
        get(recommendations_for_emotion),
    )
}
