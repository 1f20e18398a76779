//! Artist endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tunelib_common::db::{ArtistInfo, ArtistSongs};

use crate::error::ApiResult;
use crate::AppState;

/// GET /artists
pub async fn list_artists(State(state): State<AppState>) -> ApiResult<Json<Vec<ArtistInfo>>> {
    Ok(Json(state.artists.list_all().await?))
}

/// GET /artists/:name (percent-decoded by the extractor)
pub async fn get_artist(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<ArtistSongs>> {
    Ok(Json(state.artists.get_by_name(&name).await?))
}

pub fn artist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_artists))
        .route("/:name", get(get_artist))
}
