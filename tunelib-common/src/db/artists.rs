//! Artist aggregation queries
//!
//! Artists are not stored; they exist while at least one song names them.

use std::collections::HashMap;

use super::{models::*, Database};
use crate::Result;

impl Database {
    /// One entry per distinct artist, most prolific first, then by name
    pub async fn list_artists(&self) -> Result<Vec<ArtistInfo>> {
        let counts: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT artist, COUNT(*) AS total_songs
            FROM songs
            GROUP BY artist
            ORDER BY total_songs DESC, artist ASC
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        let pairs: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT DISTINCT artist, genre
            FROM songs
            WHERE genre IS NOT NULL
            ORDER BY artist ASC, genre ASC
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        let mut genres: HashMap<String, Vec<String>> = HashMap::new();
        for (artist, genre) in pairs {
            genres.entry(artist).or_default().push(genre);
        }

        Ok(counts
            .into_iter()
            .map(|(name, total_songs)| ArtistInfo {
                genres: genres.remove(&name).unwrap_or_default(),
                name,
                total_songs,
            })
            .collect())
    }

    /// Songs by an exact artist name, newest year first, then by title
    ///
    /// Songs without a year sort after dated ones.
    pub async fn songs_by_artist(&self, name: &str) -> Result<Vec<Song>> {
        let songs = sqlx::query_as::<_, Song>(
            r#"
            SELECT id, title, artist, album, genre, year, duration, lyrics, image_url,
                   created_at, updated_at
            FROM songs
            WHERE artist = ?
            ORDER BY year IS NULL ASC, year DESC, title ASC
            "#,
        )
        .bind(name)
        .fetch_all(self.pool())
        .await?;
        Ok(songs)
    }
}
