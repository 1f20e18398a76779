//! Playlist and membership endpoints
//!
//! Mounted under both `/playlists` and `/playlist`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tunelib_common::db::{Playlist, PlaylistWithSongs};

use super::MessageResponse;
use crate::error::ApiResult;
use crate::requests::{
    AddSongRequest, CreatePlaylistRequest, PlaylistListQuery, ReorderSongsRequest,
    UpdatePlaylistRequest,
};
use crate::services::PlaylistListing;
use crate::validation::{parse_id, ValidId, ValidJson, ValidQuery};
use crate::AppState;

/// GET /playlists?include_songs=
pub async fn list_playlists(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<PlaylistListQuery>,
) -> ApiResult<Json<PlaylistListing>> {
    Ok(Json(state.playlists.list(query.include_songs()).await?))
}

/// POST /playlists and POST /playlists/new
pub async fn create_playlist(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CreatePlaylistRequest>,
) -> ApiResult<(StatusCode, Json<Playlist>)> {
    let playlist = state.playlists.create(body.into_new_playlist()).await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

/// GET /playlists/:id
pub async fn get_playlist(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> ApiResult<Json<PlaylistWithSongs>> {
    Ok(Json(state.playlists.get_by_id(id).await?))
}

/// PUT /playlists/:id
pub async fn update_playlist(
    State(state): State<AppState>,
    ValidId(id): ValidId,
    ValidJson(body): ValidJson<UpdatePlaylistRequest>,
) -> ApiResult<Json<Playlist>> {
    Ok(Json(state.playlists.update(id, body.into_fields()).await?))
}

/// DELETE /playlists/:id
pub async fn delete_playlist(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> ApiResult<Json<MessageResponse>> {
    state.playlists.delete(id).await?;
    Ok(Json(MessageResponse::new("Playlist deleted successfully")))
}

/// POST /playlists/:id/songs
pub async fn add_song(
    State(state): State<AppState>,
    ValidId(id): ValidId,
    ValidJson(body): ValidJson<AddSongRequest>,
) -> ApiResult<Json<PlaylistWithSongs>> {
    let (song_id, position) = body.target()?;
    Ok(Json(state.playlists.add_song(id, song_id, position).await?))
}

/// DELETE /playlists/:id/songs/:song_id
pub async fn remove_song(
    State(state): State<AppState>,
    Path((id, song_id)): Path<(String, String)>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    let song_id = parse_id(&song_id)?;
    state.playlists.remove_song(id, song_id).await?;
    Ok(Json(MessageResponse::new(
        "Song removed from playlist successfully",
    )))
}

/// PUT /playlists/:id/songs/reorder
pub async fn reorder_songs(
    State(state): State<AppState>,
    ValidId(id): ValidId,
    ValidJson(body): ValidJson<ReorderSongsRequest>,
) -> ApiResult<Json<PlaylistWithSongs>> {
    let positions = body.positions()?;
    Ok(Json(state.playlists.reorder_songs(id, &positions).await?))
}

pub fn playlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_playlists).post(create_playlist))
        .route("/new", post(create_playlist))
        .route(
            "/:id",
            get(get_playlist).put(update_playlist).delete(delete_playlist),
        )
        .route("/:id/songs", post(add_song))
        .route("/:id/songs/reorder", put(reorder_songs))
        .route("/:id/songs/:song_id", delete(remove_song))
}
