//! Playlist and membership persistence

use std::collections::HashSet;

use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use super::{models::*, timestamp, Database};
use crate::{time, uuid_utils, Error, Result};

/// Playlist columns plus the live member count
const PLAYLIST_SELECT: &str = r#"
    SELECT p.id, p.name, p.description, p.tags, p.created_at, p.updated_at,
           (SELECT COUNT(*) FROM playlist_songs ps WHERE ps.playlist_id = p.id) AS total_songs
    FROM playlists p
"#;

impl Database {
    /// All playlists, newest first
    pub async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        let playlists = sqlx::query_as::<_, Playlist>(&format!(
            "{} ORDER BY p.created_at DESC, p.rowid DESC",
            PLAYLIST_SELECT
        ))
        .fetch_all(self.pool())
        .await?;
        Ok(playlists)
    }

    pub async fn get_playlist(&self, id: Uuid) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(&format!("{} WHERE p.id = ?", PLAYLIST_SELECT))
            .bind(id.to_string())
            .fetch_optional(self.pool())
            .await?;
        Ok(playlist)
    }

    pub async fn playlist_exists(&self, id: Uuid) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM playlists WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.pool())
            .await?;
        Ok(found.is_some())
    }

    pub async fn insert_playlist(&self, new: &NewPlaylist) -> Result<Playlist> {
        let id = uuid_utils::generate();
        let now = timestamp(time::now());
        sqlx::query(
            r#"
            INSERT INTO playlists (id, name, description, tags, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&new.name)
        .bind(&new.description)
        .bind(encode_tags(&new.tags)?)
        .bind(&now)
        .bind(&now)
        .execute(self.pool())
        .await?;

        self.get_playlist(id)
            .await?
            .ok_or_else(|| Error::Internal(format!("Playlist {} vanished after insert", id)))
    }

    /// Apply only the given fields; `None` if the playlist does not exist
    pub async fn update_playlist(
        &self,
        id: Uuid,
        fields: &[PlaylistField],
    ) -> Result<Option<Playlist>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE playlists SET ");
        {
            let mut set = query.separated(", ");
            for field in fields {
                set.push(format!("{} = ", field.column()));
                match field {
                    PlaylistField::Name(v) => set.push_bind_unseparated(v.clone()),
                    PlaylistField::Description(v) => set.push_bind_unseparated(v.clone()),
                    PlaylistField::Tags(v) => set.push_bind_unseparated(encode_tags(v)?),
                };
            }
            set.push("updated_at = ");
            set.push_bind_unseparated(timestamp(time::now()));
        }
        query.push(" WHERE id = ").push_bind(id.to_string());

        let result = query.build().execute(self.pool()).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_playlist(id).await
    }

    /// Delete a playlist; membership rows cascade. Returns rows removed.
    pub async fn delete_playlist(&self, id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }

    /// Member songs in display order: position, then time added
    pub async fn playlist_songs(&self, playlist_id: Uuid) -> Result<Vec<Song>> {
        let songs = sqlx::query_as::<_, Song>(
            r#"
            SELECT s.id, s.title, s.artist, s.album, s.genre, s.year, s.duration,
                   s.lyrics, s.image_url, s.created_at, s.updated_at
            FROM songs s
            INNER JOIN playlist_songs ps ON s.id = ps.song_id
            WHERE ps.playlist_id = ?
            ORDER BY ps.position ASC, ps.added_at ASC, ps.rowid ASC
            "#,
        )
        .bind(playlist_id.to_string())
        .fetch_all(self.pool())
        .await?;
        Ok(songs)
    }

    /// Raw membership rows in display order
    pub async fn memberships(&self, playlist_id: Uuid) -> Result<Vec<PlaylistSong>> {
        let rows = sqlx::query_as::<_, PlaylistSong>(
            r#"
            SELECT playlist_id, song_id, position, added_at
            FROM playlist_songs
            WHERE playlist_id = ?
            ORDER BY position ASC, added_at ASC, rowid ASC
            "#,
        )
        .bind(playlist_id.to_string())
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    pub async fn member_song_ids(&self, playlist_id: Uuid) -> Result<HashSet<Uuid>> {
        Ok(self
            .memberships(playlist_id)
            .await?
            .into_iter()
            .map(|m| m.song_id)
            .collect())
    }

    pub async fn is_member(&self, playlist_id: Uuid, song_id: Uuid) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM playlist_songs WHERE playlist_id = ? AND song_id = ?",
        )
        .bind(playlist_id.to_string())
        .bind(song_id.to_string())
        .fetch_optional(self.pool())
        .await?;
        Ok(found.is_some())
    }

    /// Highest position in use, `None` for an empty playlist
    pub async fn max_position(&self, playlist_id: Uuid) -> Result<Option<i64>> {
        let max: Option<i64> =
            sqlx::query_scalar("SELECT MAX(position) FROM playlist_songs WHERE playlist_id = ?")
                .bind(playlist_id.to_string())
                .fetch_one(self.pool())
                .await?;
        Ok(max)
    }

    pub async fn insert_membership(
        &self,
        playlist_id: Uuid,
        song_id: Uuid,
        position: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO playlist_songs (playlist_id, song_id, position, added_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(playlist_id.to_string())
        .bind(song_id.to_string())
        .bind(position)
        .bind(timestamp(time::now()))
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Remove a membership row; returns rows removed (0 for a non-member)
    pub async fn delete_membership(&self, playlist_id: Uuid, song_id: Uuid) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = ? AND song_id = ?")
                .bind(playlist_id.to_string())
                .bind(song_id.to_string())
                .execute(self.pool())
                .await?;
        Ok(result.rows_affected())
    }

    /// Set every requested position in one transaction
    ///
    /// If any song is no longer a member the transaction is dropped, which
    /// rolls back the updates already applied.
    pub async fn apply_positions(&self, playlist_id: Uuid, orders: &[SongPosition]) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        for order in orders {
            let result = sqlx::query(
                "UPDATE playlist_songs SET position = ? WHERE playlist_id = ? AND song_id = ?",
            )
            .bind(order.position)
            .bind(playlist_id.to_string())
            .bind(order.song_id.to_string())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(Error::not_found(format!("Song {} in playlist", order.song_id)));
            }
        }

        tx.commit().await?;
        Ok(())
    }
}

fn encode_tags(tags: &[String]) -> Result<String> {
    serde_json::to_string(tags).map_err(|e| Error::Internal(format!("Failed to encode tags: {}", e)))
}
