//! Aggregate counts for the dashboard

use super::{models::*, Database};
use crate::Result;

impl Database {
    /// Compute every dashboard aggregate from current state
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let total_songs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
            .fetch_one(self.pool())
            .await?;

        let total_playlists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM playlists")
            .fetch_one(self.pool())
            .await?;

        let unique_genres: i64 =
            sqlx::query_scalar("SELECT COUNT(DISTINCT genre) FROM songs WHERE genre IS NOT NULL")
                .fetch_one(self.pool())
                .await?;

        let unique_artists: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT artist) FROM songs")
            .fetch_one(self.pool())
            .await?;

        let songs_by_genre: Vec<GenreCount> = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT genre, COUNT(*) AS count
            FROM songs
            WHERE genre IS NOT NULL
            GROUP BY genre
            ORDER BY count DESC, genre ASC
            "#,
        )
        .fetch_all(self.pool())
        .await?
        .into_iter()
        .map(|(genre, count)| GenreCount { genre, count })
        .collect();

        let years: Vec<i32> = sqlx::query_scalar("SELECT year FROM songs WHERE year IS NOT NULL")
            .fetch_all(self.pool())
            .await?;

        Ok(DashboardStats {
            total_songs,
            total_playlists,
            unique_genres,
            unique_artists,
            songs_by_genre,
            songs_by_decade: decade_histogram(years),
        })
    }
}
