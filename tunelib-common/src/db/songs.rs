//! Song persistence

use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use super::{escape_like, models::*, timestamp, Database};
use crate::{time, uuid_utils, Result};

const SONG_COLUMNS: &str = "id, title, artist, album, genre, year, duration, lyrics, image_url, \
                            created_at, updated_at";

impl Database {
    /// Filtered, paginated listing in creation order
    pub async fn list_songs(&self, filter: &SongFilter) -> Result<Vec<Song>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM songs WHERE 1 = 1", SONG_COLUMNS));

        if let Some(genre) = &filter.genre {
            query.push(" AND genre = ").push_bind(genre.clone());
        }
        if let Some(artist) = &filter.artist {
            query.push(" AND artist = ").push_bind(artist.clone());
        }
        if let Some(year) = filter.year {
            query.push(" AND year = ").push_bind(year);
        }
        if let Some(search) = &filter.search {
            // SQLite LIKE is case-insensitive for ASCII
            let pattern = format!("%{}%", escape_like(search));
            query
                .push(" AND (title LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR artist LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR album LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }

        query
            .push(" ORDER BY created_at ASC, rowid ASC LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        let songs = query.build_query_as::<Song>().fetch_all(self.pool()).await?;
        Ok(songs)
    }

    pub async fn get_song(&self, id: Uuid) -> Result<Option<Song>> {
        let song = sqlx::query_as::<_, Song>(&format!(
            "SELECT {} FROM songs WHERE id = ?",
            SONG_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool())
        .await?;
        Ok(song)
    }

    pub async fn song_exists(&self, id: Uuid) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM songs WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.pool())
            .await?;
        Ok(found.is_some())
    }

    /// Insert and return the stored row with generated id and timestamps
    pub async fn insert_song(&self, new: &NewSong) -> Result<Song> {
        let now = timestamp(time::now());
        let song = sqlx::query_as::<_, Song>(&format!(
            r#"
            INSERT INTO songs (
                id, title, artist, album, genre, year, duration, lyrics, image_url,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            SONG_COLUMNS
        ))
        .bind(uuid_utils::generate().to_string())
        .bind(&new.title)
        .bind(&new.artist)
        .bind(&new.album)
        .bind(&new.genre)
        .bind(new.year)
        .bind(new.duration)
        .bind(&new.lyrics)
        .bind(&new.image_url)
        .bind(&now)
        .bind(&now)
        .fetch_one(self.pool())
        .await?;
        Ok(song)
    }

    /// Apply only the given fields; `None` if the song does not exist
    ///
    /// An empty field list only touches `updated_at`.
    pub async fn update_song(&self, id: Uuid, fields: &[SongField]) -> Result<Option<Song>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE songs SET ");
        {
            let mut set = query.separated(", ");
            for field in fields {
                set.push(format!("{} = ", field.column()));
                match field {
                    SongField::Title(v) | SongField::Artist(v) => set.push_bind_unseparated(v.clone()),
                    SongField::Album(v)
                    | SongField::Genre(v)
                    | SongField::Lyrics(v)
                    | SongField::ImageUrl(v) => set.push_bind_unseparated(v.clone()),
                    SongField::Year(v) => set.push_bind_unseparated(*v),
                    SongField::Duration(v) => set.push_bind_unseparated(*v),
                };
            }
            set.push("updated_at = ");
            set.push_bind_unseparated(timestamp(time::now()));
        }
        query
            .push(" WHERE id = ")
            .push_bind(id.to_string())
            .push(format!(" RETURNING {}", SONG_COLUMNS));

        let song = query
            .build_query_as::<Song>()
            .fetch_optional(self.pool())
            .await?;
        Ok(song)
    }

    /// Delete a song; membership rows cascade. Returns rows removed.
    pub async fn delete_song(&self, id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM songs WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }
}
