//! Playlists and their ordered membership

use serde::Serialize;
use tracing::{debug, info};
use tunelib_common::db::{
    format_duration, NewPlaylist, Playlist, PlaylistField, PlaylistWithSongs, SongPosition,
    MAX_POSITION,
};
use tunelib_common::{Database, Error, Result};
use uuid::Uuid;

/// Result of listing playlists, with or without their songs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlaylistListing {
    Summaries(Vec<Playlist>),
    WithSongs(Vec<PlaylistWithSongs>),
}

#[derive(Debug, Clone)]
pub struct PlaylistService {
    db: Database,
}

impl PlaylistService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All playlists, newest first
    pub async fn list(&self, include_songs: bool) -> Result<PlaylistListing> {
        let playlists = self.db.list_playlists().await?;
        if !include_songs {
            return Ok(PlaylistListing::Summaries(playlists));
        }

        let mut detailed = Vec::with_capacity(playlists.len());
        for playlist in playlists {
            let songs = self.db.playlist_songs(playlist.id).await?;
            detailed.push(PlaylistWithSongs::new(playlist, songs));
        }
        Ok(PlaylistListing::WithSongs(detailed))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<PlaylistWithSongs> {
        let playlist = self
            .db
            .get_playlist(id)
            .await?
            .ok_or_else(|| Error::not_found("Playlist"))?;
        let songs = self.db.playlist_songs(id).await?;
        Ok(PlaylistWithSongs::new(playlist, songs))
    }

    pub async fn create(&self, new: NewPlaylist) -> Result<Playlist> {
        let playlist = self.db.insert_playlist(&new).await?;
        info!("Created playlist {} ({})", playlist.id, playlist.name);
        Ok(playlist)
    }

    pub async fn update(&self, id: Uuid, fields: Vec<PlaylistField>) -> Result<Playlist> {
        self.ensure_exists(id).await?;
        if fields.is_empty() {
            return Err(Error::validation("No valid fields to update"));
        }
        self.db
            .update_playlist(id, &fields)
            .await?
            .ok_or_else(|| Error::not_found("Playlist"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if self.db.delete_playlist(id).await? == 0 {
            return Err(Error::not_found("Playlist"));
        }
        info!("Deleted playlist {}", id);
        Ok(())
    }

    /// Add a song at `position`, or after the current last song
    pub async fn add_song(
        &self,
        playlist_id: Uuid,
        song_id: Uuid,
        position: Option<i64>,
    ) -> Result<PlaylistWithSongs> {
        self.ensure_exists(playlist_id).await?;
        if !self.db.song_exists(song_id).await? {
            return Err(Error::not_found("Song"));
        }
        if self.db.is_member(playlist_id, song_id).await? {
            return Err(already_member());
        }

        let position = match position {
            Some(position) if (0..=MAX_POSITION).contains(&position) => position,
            Some(_) => {
                return Err(Error::validation(format!(
                    "Position must be between 0 and {}",
                    MAX_POSITION
                )))
            }
            None => match self.db.max_position(playlist_id).await? {
                None => 0,
                Some(max) => max
                    .checked_add(1)
                    .filter(|next| *next <= MAX_POSITION)
                    .ok_or_else(|| {
                        Error::Conflict(format!("No position is free after {}", max))
                    })?,
            },
        };

        // A concurrent add of the same pair trips the primary key
        self.db
            .insert_membership(playlist_id, song_id, position)
            .await
            .map_err(|e| match e {
                Error::Database(sqlx::Error::Database(ref db_err))
                    if db_err.is_unique_violation() =>
                {
                    already_member()
                }
                other => other,
            })?;
        let view = self.get_by_id(playlist_id).await?;
        debug!(
            "Added song {} to playlist {} at position {} (playlist now {})",
            song_id,
            playlist_id,
            position,
            format_duration(view.total_duration)
        );
        Ok(view)
    }

    /// Remove a song; a song that is not a member is a silent no-op
    pub async fn remove_song(&self, playlist_id: Uuid, song_id: Uuid) -> Result<()> {
        self.ensure_exists(playlist_id).await?;
        let removed = self.db.delete_membership(playlist_id, song_id).await?;
        debug!(
            "Removed song {} from playlist {} ({} row(s))",
            song_id, playlist_id, removed
        );
        Ok(())
    }

    /// Apply every requested position atomically
    ///
    /// Each song must already be a member; the first one that is not is
    /// reported and nothing changes.
    pub async fn reorder_songs(
        &self,
        playlist_id: Uuid,
        orders: &[SongPosition],
    ) -> Result<PlaylistWithSongs> {
        self.ensure_exists(playlist_id).await?;

        let members = self.db.member_song_ids(playlist_id).await?;
        if let Some(missing) = orders.iter().find(|o| !members.contains(&o.song_id)) {
            return Err(Error::not_found(format!("Song {} in playlist", missing.song_id)));
        }

        self.db.apply_positions(playlist_id, orders).await?;
        debug!("Reordered {} song(s) in playlist {}", orders.len(), playlist_id);

        self.get_by_id(playlist_id).await
    }

    async fn ensure_exists(&self, id: Uuid) -> Result<()> {
        if self.db.playlist_exists(id).await? {
            Ok(())
        } else {
            Err(Error::not_found("Playlist"))
        }
    }
}

fn already_member() -> Error {
    Error::Conflict("Song is already in the playlist".to_string())
}
