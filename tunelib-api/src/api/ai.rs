//! AI proxy endpoints
//!
//! Handlers validate the body and forward it; none of them touch the
//! database.

use axum::{extract::State, routing::post, Json, Router};
use serde_json::Value;

use crate::error::ApiResult;
use crate::services::ai_client::{
    AnalyzeMoodRequest, DescribePlaylistRequest, GeneratePlaylistNameRequest,
    RecommendSongsRequest, SemanticSearchRequest,
};
use crate::validation::ValidJson;
use crate::AppState;

/// POST /ai/describe-playlist
pub async fn describe_playlist(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<DescribePlaylistRequest>,
) -> ApiResult<Json<Value>> {
    Ok(Json(state.ai.describe_playlist(&body).await?))
}

/// POST /ai/recommend-songs
pub async fn recommend_songs(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<RecommendSongsRequest>,
) -> ApiResult<Json<Value>> {
    Ok(Json(state.ai.recommend_songs(&body).await?))
}

/// POST /ai/generate-playlist-name
pub async fn generate_playlist_name(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<GeneratePlaylistNameRequest>,
) -> ApiResult<Json<Value>> {
    Ok(Json(state.ai.generate_playlist_name(&body).await?))
}

/// POST /ai/analyze-mood
pub async fn analyze_mood(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<AnalyzeMoodRequest>,
) -> ApiResult<Json<Value>> {
    Ok(Json(state.ai.analyze_mood(&body).await?))
}

/// POST /ai/semantic-search
pub async fn semantic_search(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<SemanticSearchRequest>,
) -> ApiResult<Json<Value>> {
    Ok(Json(state.ai.semantic_search(&body).await?))
}

pub fn ai_routes() -> Router<AppState> {
    Router::new()
        .route("/describe-playlist", post(describe_playlist))
        .route("/recommend-songs", post(recommend_songs))
        .route("/generate-playlist-name", post(generate_playlist_name))
        .route("/analyze-mood", post(analyze_mood))
        .route("/semantic-search", post(semantic_search))
}
