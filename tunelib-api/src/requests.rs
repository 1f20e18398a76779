//! Request bodies and query strings for the catalog and playlist endpoints
//!
//! Each type validates itself and then converts into the typed inputs the
//! components accept (`NewSong`, `SongField`, `SongPosition`, ...).

use serde::Deserialize;
use tunelib_common::db::{
    NewPlaylist, NewSong, PlaylistField, SongField, SongFilter, SongPosition, DEFAULT_OFFSET,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MAX_POSITION,
};
use tunelib_common::uuid_utils;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::validation::*;

/// `GET /songs` query string
///
/// Numbers arrive as text so a bad value yields a field-level message.
#[derive(Debug, Default, Deserialize)]
pub struct SongListQuery {
    pub genre: Option<String>,
    pub artist: Option<String>,
    pub year: Option<String>,
    pub search: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl SongListQuery {
    pub fn to_filter(&self) -> ApiResult<SongFilter> {
        let mut v = Violations::new();

        let year = parse_int_param(self.year.as_deref(), "year", "Year", &mut v);
        let limit = parse_int_param(self.limit.as_deref(), "limit", "Limit", &mut v);
        let offset = parse_int_param(self.offset.as_deref(), "offset", "Offset", &mut v);

        if let Some(limit) = limit {
            v.check(limit > 0, "limit", "Limit must be a positive number");
            v.check(
                limit <= MAX_PAGE_SIZE,
                "limit",
                format!("Limit cannot exceed {}", MAX_PAGE_SIZE),
            );
        }
        if let Some(offset) = offset {
            v.check(offset >= 0, "offset", "Offset must be at least 0");
        }
        let year = match year.map(i32::try_from) {
            Some(Ok(year)) => Some(year),
            Some(Err(_)) => {
                v.push("year", "Year is out of range");
                None
            }
            None => None,
        };
        v.finish()?;

        Ok(SongFilter {
            genre: non_blank(&self.genre),
            artist: non_blank(&self.artist),
            year,
            search: non_blank(&self.search),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE),
            offset: offset.unwrap_or(DEFAULT_OFFSET),
        })
    }
}

impl Validate for SongListQuery {
    fn validate(&self) -> ApiResult<()> {
        self.to_filter().map(|_| ())
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

/// `POST /songs` body
#[derive(Debug, Default, Deserialize)]
pub struct CreateSongRequest {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i64>,
    pub duration: Option<i64>,
    pub lyrics: Option<String>,
    pub image_url: Option<String>,
}

impl Validate for CreateSongRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut v = Violations::new();

        match &self.title {
            None => v.push("title", "Title is required"),
            Some(title) => check_title(&mut v, title),
        }
        match &self.artist {
            None => v.push("artist", "Artist is required"),
            Some(artist) => check_artist(&mut v, artist),
        }
        if let Some(album) = &self.album {
            v.max_len(album, MAX_ALBUM_LEN, "album", "Album");
        }
        if let Some(genre) = &self.genre {
            v.max_len(genre, MAX_GENRE_LEN, "genre", "Genre");
        }
        if let Some(year) = self.year {
            check_year(&mut v, year);
        }
        match self.duration {
            None => v.push("duration", "Duration is required"),
            Some(duration) => check_duration(&mut v, duration),
        }
        if let Some(url) = &self.image_url {
            check_image_url(&mut v, url);
        }

        v.finish()
    }
}

impl CreateSongRequest {
    /// Convert a validated request; blank optional text becomes null
    pub fn into_new_song(self) -> NewSong {
        NewSong {
            title: self.title.unwrap_or_default(),
            artist: self.artist.unwrap_or_default(),
            album: blank_to_none(self.album),
            genre: blank_to_none(self.genre),
            year: self.year.and_then(|y| i32::try_from(y).ok()),
            duration: self.duration.unwrap_or_default(),
            lyrics: blank_to_none(self.lyrics),
            image_url: blank_to_none(self.image_url),
        }
    }
}

/// `PUT /songs/:id` body
///
/// Nullable columns distinguish an absent key from an explicit `null`.
/// Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSongRequest {
    pub title: Option<String>,
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub album: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub genre: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub year: Option<Option<i64>>,
    pub duration: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub lyrics: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
}

impl Validate for UpdateSongRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut v = Violations::new();

        if let Some(title) = &self.title {
            check_title(&mut v, title);
        }
        if let Some(artist) = &self.artist {
            check_artist(&mut v, artist);
        }
        if let Some(Some(album)) = &self.album {
            v.max_len(album, MAX_ALBUM_LEN, "album", "Album");
        }
        if let Some(Some(genre)) = &self.genre {
            v.max_len(genre, MAX_GENRE_LEN, "genre", "Genre");
        }
        if let Some(Some(year)) = self.year {
            check_year(&mut v, year);
        }
        if let Some(duration) = self.duration {
            check_duration(&mut v, duration);
        }
        if let Some(Some(url)) = &self.image_url {
            check_image_url(&mut v, url);
        }

        v.finish()
    }
}

impl UpdateSongRequest {
    /// Present fields only, in column order
    pub fn into_fields(self) -> Vec<SongField> {
        let mut fields = Vec::new();
        if let Some(title) = self.title {
            fields.push(SongField::Title(title));
        }
        if let Some(artist) = self.artist {
            fields.push(SongField::Artist(artist));
        }
        if let Some(album) = self.album {
            fields.push(SongField::Album(blank_to_none(album)));
        }
        if let Some(genre) = self.genre {
            fields.push(SongField::Genre(blank_to_none(genre)));
        }
        if let Some(year) = self.year {
            fields.push(SongField::Year(year.and_then(|y| i32::try_from(y).ok())));
        }
        if let Some(duration) = self.duration {
            fields.push(SongField::Duration(duration));
        }
        if let Some(lyrics) = self.lyrics {
            fields.push(SongField::Lyrics(blank_to_none(lyrics)));
        }
        if let Some(image_url) = self.image_url {
            fields.push(SongField::ImageUrl(blank_to_none(image_url)));
        }
        fields
    }
}

fn check_title(v: &mut Violations, title: &str) {
    v.check(!title.is_empty(), "title", "Title cannot be empty");
    v.max_len(title, MAX_TITLE_LEN, "title", "Title");
}

fn check_artist(v: &mut Violations, artist: &str) {
    v.check(!artist.is_empty(), "artist", "Artist cannot be empty");
    v.max_len(artist, MAX_ARTIST_LEN, "artist", "Artist");
}

fn check_year(v: &mut Violations, year: i64) {
    v.check(
        year >= i64::from(MIN_YEAR),
        "year",
        format!("Year must be at least {}", MIN_YEAR),
    );
    v.check(
        year <= i64::from(MAX_YEAR),
        "year",
        format!("Year must be at most {}", MAX_YEAR),
    );
}

fn check_duration(v: &mut Violations, duration: i64) {
    v.check(duration > 0, "duration", "Duration must be a positive number");
}

/// Empty string is accepted and later stored as null
fn check_image_url(v: &mut Violations, url: &str) {
    if url.is_empty() {
        return;
    }
    v.check(is_http_url(url), "image_url", "Image URL must be a valid URL");
    v.max_len(url, MAX_IMAGE_URL_LEN, "image_url", "Image URL");
}

/// `GET /playlists` query string
#[derive(Debug, Default, Deserialize)]
pub struct PlaylistListQuery {
    pub include_songs: Option<String>,
}

impl PlaylistListQuery {
    pub fn include_songs(&self) -> bool {
        matches!(parse_flag(self.include_songs.as_deref()), Some(true))
    }
}

impl Validate for PlaylistListQuery {
    fn validate(&self) -> ApiResult<()> {
        let mut v = Violations::new();
        if self.include_songs.is_some() {
            v.check(
                parse_flag(self.include_songs.as_deref()).is_some(),
                "include_songs",
                "include_songs must be a boolean",
            );
        }
        v.finish()
    }
}

fn parse_flag(raw: Option<&str>) -> Option<bool> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// `POST /playlists` body
#[derive(Debug, Default, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Validate for CreatePlaylistRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut v = Violations::new();
        match &self.name {
            None => v.push("name", "Name is required"),
            Some(name) => check_playlist_name(&mut v, name),
        }
        check_tags(&mut v, &self.tags);
        v.finish()
    }
}

impl CreatePlaylistRequest {
    pub fn into_new_playlist(self) -> NewPlaylist {
        NewPlaylist {
            name: self.name.unwrap_or_default(),
            description: blank_to_none(self.description),
            tags: self.tags,
        }
    }
}

/// `PUT /playlists/:id` body
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlaylistRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

impl Validate for UpdatePlaylistRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut v = Violations::new();
        if let Some(name) = &self.name {
            check_playlist_name(&mut v, name);
        }
        if let Some(tags) = &self.tags {
            check_tags(&mut v, tags);
        }
        v.finish()
    }
}

impl UpdatePlaylistRequest {
    pub fn into_fields(self) -> Vec<PlaylistField> {
        let mut fields = Vec::new();
        if let Some(name) = self.name {
            fields.push(PlaylistField::Name(name));
        }
        if let Some(description) = self.description {
            fields.push(PlaylistField::Description(blank_to_none(description)));
        }
        if let Some(tags) = self.tags {
            fields.push(PlaylistField::Tags(tags));
        }
        fields
    }
}

fn check_playlist_name(v: &mut Violations, name: &str) {
    v.check(!name.is_empty(), "name", "Name cannot be empty");
    v.max_len(name, MAX_PLAYLIST_NAME_LEN, "name", "Name");
}

fn check_tags(v: &mut Violations, tags: &[String]) {
    v.check(
        tags.len() <= MAX_TAGS,
        "tags",
        format!("Tags array cannot exceed {} items", MAX_TAGS),
    );
}

/// `POST /playlists/:id/songs` body
#[derive(Debug, Default, Deserialize)]
pub struct AddSongRequest {
    pub song_id: Option<String>,
    pub position: Option<i64>,
}

impl Validate for AddSongRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut v = Violations::new();
        match &self.song_id {
            None => v.push("song_id", "song_id is required"),
            Some(id) => check_uuid(&mut v, id, "song_id"),
        }
        if let Some(position) = self.position {
            check_position(&mut v, position, "position");
        }
        v.finish()
    }
}

impl AddSongRequest {
    /// Song id and requested position of a validated request
    pub fn target(&self) -> ApiResult<(Uuid, Option<i64>)> {
        let song_id = self.song_id.as_deref().unwrap_or_default();
        let song_id = uuid_utils::parse(song_id)
            .map_err(|_| ApiError::Validation("song_id: song_id must be a valid UUID".into()))?;
        Ok((song_id, self.position))
    }
}

/// One entry of a reorder request
#[derive(Debug, Clone, Deserialize)]
pub struct SongOrder {
    pub song_id: String,
    pub position: i64,
}

/// `PUT /playlists/:id/songs/reorder` body
#[derive(Debug, Default, Deserialize)]
pub struct ReorderSongsRequest {
    pub song_orders: Option<Vec<SongOrder>>,
}

impl Validate for ReorderSongsRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut v = Violations::new();
        match &self.song_orders {
            None => v.push("song_orders", "song_orders is required"),
            Some(orders) => {
                v.check(
                    !orders.is_empty(),
                    "song_orders",
                    "song_orders must contain at least one item",
                );
                v.check(
                    orders.len() <= MAX_SONG_ORDERS,
                    "song_orders",
                    format!("song_orders cannot exceed {} items", MAX_SONG_ORDERS),
                );
                for (i, order) in orders.iter().enumerate() {
                    check_uuid(&mut v, &order.song_id, &format!("song_orders.{}.song_id", i));
                    check_position(&mut v, order.position, &format!("song_orders.{}.position", i));
                }
            }
        }
        v.finish()
    }
}

impl ReorderSongsRequest {
    /// Typed positions of a validated request
    pub fn positions(&self) -> ApiResult<Vec<SongPosition>> {
        self.song_orders
            .iter()
            .flatten()
            .map(|order| {
                let song_id = uuid_utils::parse(&order.song_id).map_err(|_| {
                    ApiError::Validation("song_id must be a valid UUID".to_string())
                })?;
                Ok(SongPosition {
                    song_id,
                    position: order.position,
                })
            })
            .collect()
    }
}

fn check_position(v: &mut Violations, position: i64, path: &str) {
    v.check(position >= 0, path, "Position must be at least 0");
    v.check(
        position <= MAX_POSITION,
        path,
        format!("Position must be at most {}", MAX_POSITION),
    );
}

fn check_uuid(v: &mut Violations, value: &str, path: &str) {
    v.check(
        uuid_utils::is_valid(value),
        path,
        "song_id must be a valid UUID",
    );
}
