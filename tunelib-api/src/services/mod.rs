//! Library components
//!
//! Each component is constructed with a clone of the injected `Database`
//! handle and holds no other state.

pub mod ai_client;
pub mod artist_directory;
pub mod playlist_service;
pub mod song_catalog;
pub mod stats_service;

pub use ai_client::{AiClient, AiError};
pub use artist_directory::ArtistDirectory;
pub use playlist_service::{PlaylistListing, PlaylistService};
pub use song_catalog::SongCatalog;
pub use stats_service::StatsService;
