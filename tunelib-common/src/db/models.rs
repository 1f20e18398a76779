//! Database models
//!
//! Rows are mapped by hand because ids are stored as hyphenated text and
//! playlist tags as a JSON array.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A song in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: Uuid,
    pub title: String,
    /// Free text; artists are derived by grouping on this value
    pub artist: String,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    /// Whole seconds, always > 0
    pub duration: i64,
    pub lyrics: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for Song {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Song {
            id: decode_uuid(row, "id")?,
            title: row.try_get("title")?,
            artist: row.try_get("artist")?,
            album: row.try_get("album")?,
            genre: row.try_get("genre")?,
            year: row.try_get("year")?,
            duration: row.try_get("duration")?,
            lyrics: row.try_get("lyrics")?,
            image_url: row.try_get("image_url")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Fields for a new song, already validated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub duration: i64,
    pub lyrics: Option<String>,
    pub image_url: Option<String>,
}

/// One updatable song column with its typed value
///
/// Nullable columns carry `Option`; `None` clears the column.
#[derive(Debug, Clone, PartialEq)]
pub enum SongField {
    Title(String),
    Artist(String),
    Album(Option<String>),
    Genre(Option<String>),
    Year(Option<i32>),
    Duration(i64),
    Lyrics(Option<String>),
    ImageUrl(Option<String>),
}

impl SongField {
    /// Column name; fixed per variant so no identifier ever comes from input
    pub fn column(&self) -> &'static str {
        match self {
            SongField::Title(_) => "title",
            SongField::Artist(_) => "artist",
            SongField::Album(_) => "album",
            SongField::Genre(_) => "genre",
            SongField::Year(_) => "year",
            SongField::Duration(_) => "duration",
            SongField::Lyrics(_) => "lyrics",
            SongField::ImageUrl(_) => "image_url",
        }
    }
}

/// One updatable playlist column with its typed value
#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistField {
    Name(String),
    Description(Option<String>),
    Tags(Vec<String>),
}

impl PlaylistField {
    pub fn column(&self) -> &'static str {
        match self {
            PlaylistField::Name(_) => "name",
            PlaylistField::Description(_) => "description",
            PlaylistField::Tags(_) => "tags",
        }
    }
}

/// Song listing filters; all present filters are ANDed
#[derive(Debug, Clone, PartialEq)]
pub struct SongFilter {
    pub genre: Option<String>,
    pub artist: Option<String>,
    pub year: Option<i32>,
    /// Case-insensitive substring over title, artist and album
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for SongFilter {
    fn default() -> Self {
        Self {
            genre: None,
            artist: None,
            year: None,
            search: None,
            limit: crate::db::DEFAULT_PAGE_SIZE,
            offset: crate::db::DEFAULT_OFFSET,
        }
    }
}

/// A playlist with its derived song count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub total_songs: i64,
}

impl<'r> FromRow<'r, SqliteRow> for Playlist {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let tags_json: String = row.try_get("tags")?;
        let tags = serde_json::from_str(&tags_json).map_err(|e| sqlx::Error::ColumnDecode {
            index: "tags".to_string(),
            source: Box::new(e),
        })?;

        Ok(Playlist {
            id: decode_uuid(row, "id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            tags,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            total_songs: row.try_get("total_songs")?,
        })
    }
}

/// Fields for a new playlist, already validated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPlaylist {
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// Playlist plus its ordered songs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistWithSongs {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub songs: Vec<Song>,
    /// Sum of member song durations in seconds
    pub total_duration: i64,
}

impl PlaylistWithSongs {
    pub fn new(mut playlist: Playlist, songs: Vec<Song>) -> Self {
        playlist.total_songs = songs.len() as i64;
        let total_duration = total_duration(&songs);
        Self {
            playlist,
            songs,
            total_duration,
        }
    }
}

/// Membership row linking a playlist and a song
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistSong {
    pub playlist_id: Uuid,
    pub song_id: Uuid,
    pub position: i64,
    pub added_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for PlaylistSong {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(PlaylistSong {
            playlist_id: decode_uuid(row, "playlist_id")?,
            song_id: decode_uuid(row, "song_id")?,
            position: row.try_get("position")?,
            added_at: row.try_get("added_at")?,
        })
    }
}

/// Requested position for one member song
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongPosition {
    pub song_id: Uuid,
    pub position: i64,
}

/// Artist derived by grouping songs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistInfo {
    pub name: String,
    pub total_songs: i64,
    /// Distinct non-null genres, ascending
    pub genres: Vec<String>,
}

/// All songs by one artist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistSongs {
    pub artist: String,
    pub total_songs: i64,
    pub songs: Vec<Song>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecadeCount {
    pub decade: String,
    pub count: i64,
}

/// Dashboard aggregates; `Default` is the all-zero fallback
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_songs: i64,
    pub total_playlists: i64,
    pub unique_genres: i64,
    pub unique_artists: i64,
    pub songs_by_genre: Vec<GenreCount>,
    pub songs_by_decade: Vec<DecadeCount>,
}

/// Sum of song durations in seconds
pub fn total_duration(songs: &[Song]) -> i64 {
    songs.iter().map(|s| s.duration).sum()
}

/// Decade label for a year, e.g. 1987 -> "1980s"
pub fn decade_label(year: i32) -> String {
    format!("{}s", year.div_euclid(10) * 10)
}

/// Count years per decade, ordered by label ascending
pub fn decade_histogram(years: impl IntoIterator<Item = i32>) -> Vec<DecadeCount> {
    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for year in years {
        *counts.entry(decade_label(year)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(decade, count)| DecadeCount { decade, count })
        .collect()
}

/// Format seconds as M:SS
pub fn format_duration(seconds: i64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn decode_uuid(row: &SqliteRow, column: &str) -> Result<Uuid, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    Uuid::parse_str(&raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(duration: i64) -> Song {
        let now = Utc::now();
        Song {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            artist: "a".to_string(),
            album: None,
            genre: None,
            year: None,
            duration,
            lyrics: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_decade_label() {
        assert_eq!(decade_label(1987), "1980s");
        assert_eq!(decade_label(1990), "1990s");
        assert_eq!(decade_label(2009), "2000s");
    }

    #[test]
    fn test_decade_histogram_sorted_by_label() {
        let hist = decade_histogram([2001, 1975, 1979, 2005, 1990]);
        let labels: Vec<_> = hist.iter().map(|d| d.decade.as_str()).collect();
        assert_eq!(labels, vec!["1970s", "1990s", "2000s"]);
        assert_eq!(hist[0].count, 2);
        assert_eq!(hist[2].count, 2);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(185), "3:05");
        assert_eq!(format_duration(59), "0:59");
    }

    #[test]
    fn test_playlist_with_songs_totals() {
        let now = Utc::now();
        let playlist = Playlist {
            id: Uuid::new_v4(),
            name: "Road trip".to_string(),
            description: None,
            tags: vec![],
            created_at: now,
            updated_at: now,
            total_songs: 0,
        };
        let view = PlaylistWithSongs::new(playlist, vec![song(180), song(200)]);
        assert_eq!(view.total_duration, 380);
        assert_eq!(view.playlist.total_songs, 2);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["name"], "Road trip");
        assert_eq!(json["total_duration"], 380);
        assert!(json["songs"].is_array());
    }

    #[test]
    fn test_song_field_columns_are_fixed() {
        assert_eq!(SongField::ImageUrl(None).column(), "image_url");
        assert_eq!(SongField::Duration(1).column(), "duration");
        assert_eq!(PlaylistField::Tags(vec![]).column(), "tags");
    }
}
