//! Song catalog: CRUD and filtered listing

use tracing::{debug, info};
use tunelib_common::db::{NewSong, Song, SongField, SongFilter};
use tunelib_common::{Database, Error, Result};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SongCatalog {
    db: Database,
}

impl SongCatalog {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self, filter: &SongFilter) -> Result<Vec<Song>> {
        self.db.list_songs(filter).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Song> {
        self.db
            .get_song(id)
            .await?
            .ok_or_else(|| Error::not_found("Song"))
    }

    pub async fn create(&self, new: NewSong) -> Result<Song> {
        let song = self.db.insert_song(&new).await?;
        info!("Created song {} ({} - {})", song.id, song.artist, song.title);
        Ok(song)
    }

    /// Apply a partial update
    ///
    /// Existence is checked before the field list so a missing song is
    /// reported as such even for an empty update.
    pub async fn update(&self, id: Uuid, fields: Vec<SongField>) -> Result<Song> {
        if !self.db.song_exists(id).await? {
            return Err(Error::not_found("Song"));
        }
        if fields.is_empty() {
            return Err(Error::validation("No valid fields to update"));
        }
        self.db
            .update_song(id, &fields)
            .await?
            .ok_or_else(|| Error::not_found("Song"))
    }

    /// Idempotent: deleting an unknown id succeeds
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let removed = self.db.delete_song(id).await?;
        if removed == 0 {
            debug!("Delete of unknown song {} ignored", id);
        } else {
            info!("Deleted song {}", id);
        }
        Ok(())
    }
}
