//! Read-only artist aggregation over songs

use tunelib_common::db::{ArtistInfo, ArtistSongs};
use tunelib_common::{Database, Error, Result};

#[derive(Debug, Clone)]
pub struct ArtistDirectory {
    db: Database,
}

impl ArtistDirectory {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list_all(&self) -> Result<Vec<ArtistInfo>> {
        self.db.list_artists().await
    }

    /// An artist exists only while some song names it
    pub async fn get_by_name(&self, name: &str) -> Result<ArtistSongs> {
        let songs = self.db.songs_by_artist(name).await?;
        if songs.is_empty() {
            return Err(Error::not_found("Artist"));
        }
        Ok(ArtistSongs {
            artist: name.to_string(),
            total_songs: songs.len() as i64,
            songs,
        })
    }
}
