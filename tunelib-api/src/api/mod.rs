//! HTTP API handlers
//!
//! Each module exposes a `*_routes()` builder; `build_router` nests them
//! under the versioned prefix.

pub mod ai;
pub mod artists;
pub mod health;
pub mod playlists;
pub mod songs;
pub mod stats;

pub use ai::ai_routes;
pub use artists::artist_routes;
pub use health::health_routes;
pub use playlists::playlist_routes;
pub use songs::song_routes;
pub use stats::stats_routes;

use serde::Serialize;

use crate::error::ApiError;

/// Body of successful deletes
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fallback for unmatched paths
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Route".to_string())
}
