//! Song catalog endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tunelib_common::db::Song;

use super::MessageResponse;
use crate::error::ApiResult;
use crate::requests::{CreateSongRequest, SongListQuery, UpdateSongRequest};
use crate::validation::{ValidId, ValidJson, ValidQuery};
use crate::AppState;

/// GET /songs
pub async fn list_songs(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<SongListQuery>,
) -> ApiResult<Json<Vec<Song>>> {
    let filter = query.to_filter()?;
    Ok(Json(state.songs.list(&filter).await?))
}

/// GET /songs/:id
pub async fn get_song(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> ApiResult<Json<Song>> {
    Ok(Json(state.songs.get_by_id(id).await?))
}

/// POST /songs
pub async fn create_song(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CreateSongRequest>,
) -> ApiResult<(StatusCode, Json<Song>)> {
    let song = state.songs.create(body.into_new_song()).await?;
    Ok((StatusCode::CREATED, Json(song)))
}

/// PUT /songs/:id
pub async fn update_song(
    State(state): State<AppState>,
    ValidId(id): ValidId,
    ValidJson(body): ValidJson<UpdateSongRequest>,
) -> ApiResult<Json<Song>> {
    Ok(Json(state.songs.update(id, body.into_fields()).await?))
}

/// DELETE /songs/:id
pub async fn delete_song(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> ApiResult<Json<MessageResponse>> {
    state.songs.delete(id).await?;
    Ok(Json(MessageResponse::new("Song deleted successfully")))
}

pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_songs).post(create_song))
        .route("/:id", get(get_song).put(update_song).delete(delete_song))
}
