//! # tunelib common library
//!
//! Shared code for the tunelib music library service:
//! - Persistence layer (schema bootstrap, pooled data-access handle)
//! - Domain models (songs, playlists, artists, dashboard statistics)
//! - Configuration loading
//! - Error type and small utilities

pub mod config;
pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use db::Database;
pub use error::{Error, Result};
