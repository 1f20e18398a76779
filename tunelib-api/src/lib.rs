//! tunelib-api library
//!
//! REST surface of the music library: song catalog, artist aggregation,
//! playlists, dashboard statistics and the AI proxy.

pub mod api;
pub mod error;
pub mod requests;
pub mod services;
pub mod validation;

pub use crate::error::{ApiError, ApiResult};

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use tunelib_common::Database;

use crate::services::{AiClient, ArtistDirectory, PlaylistService, SongCatalog, StatsService};

/// Versioned prefix for every resource route
pub const API_PREFIX: &str = "/api/v1";

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub songs: SongCatalog,
    pub artists: ArtistDirectory,
    pub playlists: PlaylistService,
    pub stats: StatsService,
    pub ai: AiClient,
    /// Origins allowed to make credentialed cross-origin requests
    pub allowed_origins: Vec<String>,
}

impl AppState {
    /// Wire every component to the same data-access handle
    pub fn new(db: Database, ai: AiClient, allowed_origins: Vec<String>) -> Self {
        Self {
            songs: SongCatalog::new(db.clone()),
            artists: ArtistDirectory::new(db.clone()),
            playlists: PlaylistService::new(db.clone()),
            stats: StatsService::new(db),
            ai,
            allowed_origins,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let resources = Router::new()
        .nest("/songs", api::song_routes())
        .nest("/artists", api::artist_routes())
        .nest("/playlists", api::playlist_routes())
        .nest("/playlist", api::playlist_routes())
        .nest("/stats", api::stats_routes())
        .nest("/ai", api::ai_routes());

    let cors = cors_layer(&state.allowed_origins);

    Router::new()
        .nest(API_PREFIX, resources)
        .merge(api::health_routes())
        .fallback(api::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Credentialed CORS restricted to the configured origins
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
}
