//! External AI service client
//!
//! Forwards playlist-level requests to the AI HTTP service and turns every
//! failure mode into one [`AiError`] that carries its own HTTP status.
//! Requests are typed and validated; replies are relayed as parsed JSON.

use std::time::Duration;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::validation::{
    Validate, Violations, DEFAULT_SEMANTIC_LIMIT, MAX_AI_SONGS, MAX_QUERY_LEN,
    MAX_RECOMMENDATIONS, MAX_SEMANTIC_LIMIT,
};

const USER_AGENT: &str = concat!("tunelib-api/", env!("CARGO_PKG_VERSION"));

/// AI client errors
#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI API request timeout. The service took too long to respond.")]
    Timeout,

    #[error("AI API service unavailable. Could not connect to {base_url}")]
    Unavailable { base_url: String },

    #[error("Failed to connect to AI API: {0}")]
    Transport(String),

    /// Non-2xx reply; `status` is already mapped (4xx kept, else 502)
    #[error("AI API error: {message}")]
    Upstream { status: u16, message: String },

    #[error("AI API returned invalid JSON response: {0}")]
    InvalidResponse(String),

    #[error("Failed to build AI HTTP client: {0}")]
    Client(String),
}

impl AiError {
    /// HTTP status the API surface should answer with
    pub fn status(&self) -> StatusCode {
        match self {
            AiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AiError::Unavailable { .. } | AiError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
            AiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AiError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            AiError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Song as exchanged with the AI service
///
/// Looser than a stored song: only identity, title, artist and duration are
/// required, and timestamps are passed through as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSong {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    pub duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn check_songs(v: &mut Violations, songs: &[AiSong], path: &str) {
    v.check(
        !songs.is_empty(),
        path,
        format!("{} array must contain at least one song", path),
    );
    v.check(
        songs.len() <= MAX_AI_SONGS,
        path,
        format!("{} array cannot exceed {} items", path, MAX_AI_SONGS),
    );
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescribePlaylistRequest {
    pub songs: Vec<AiSong>,
}

impl Validate for DescribePlaylistRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut v = Violations::new();
        check_songs(&mut v, &self.songs, "songs");
        v.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendSongsRequest {
    pub current_songs: Vec<AiSong>,
    pub number_of_recommendations: i64,
}

impl Validate for RecommendSongsRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut v = Violations::new();
        check_songs(&mut v, &self.current_songs, "current_songs");
        v.check(
            self.number_of_recommendations > 0,
            "number_of_recommendations",
            "number_of_recommendations must be a positive number",
        );
        v.check(
            self.number_of_recommendations <= MAX_RECOMMENDATIONS,
            "number_of_recommendations",
            format!("number_of_recommendations cannot exceed {}", MAX_RECOMMENDATIONS),
        );
        v.finish()
    }
}

/// Tone of generated playlist names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameStyle {
    Creative,
    Descriptive,
    Fun,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePlaylistNameRequest {
    pub songs: Vec<AiSong>,
    pub style: NameStyle,
}

impl Validate for GeneratePlaylistNameRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut v = Violations::new();
        check_songs(&mut v, &self.songs, "songs");
        v.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeMoodRequest {
    pub songs: Vec<AiSong>,
}

impl Validate for AnalyzeMoodRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut v = Violations::new();
        check_songs(&mut v, &self.songs, "songs");
        v.finish()
    }
}

fn default_semantic_limit() -> i64 {
    DEFAULT_SEMANTIC_LIMIT
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticSearchRequest {
    pub query: String,
    #[serde(default = "default_semantic_limit")]
    pub limit: i64,
}

impl Validate for SemanticSearchRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut v = Violations::new();
        v.check(!self.query.is_empty(), "query", "query cannot be empty");
        v.max_len(&self.query, MAX_QUERY_LEN, "query", "query");
        v.check(self.limit > 0, "limit", "limit must be a positive number");
        v.check(
            self.limit <= MAX_SEMANTIC_LIMIT,
            "limit",
            format!("limit cannot exceed {}", MAX_SEMANTIC_LIMIT),
        );
        v.finish()
    }
}

/// HTTP client for the AI service
#[derive(Debug, Clone)]
pub struct AiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl AiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AiError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn describe_playlist(
        &self,
        request: &DescribePlaylistRequest,
    ) -> Result<Value, AiError> {
        self.post("/describe-playlist", request).await
    }

    pub async fn recommend_songs(
        &self,
        request: &RecommendSongsRequest,
    ) -> Result<Value, AiError> {
        self.post("/recommend-songs", request).await
    }

    pub async fn generate_playlist_name(
        &self,
        request: &GeneratePlaylistNameRequest,
    ) -> Result<Value, AiError> {
        self.post("/generate-name", request).await
    }

    pub async fn analyze_mood(
        &self,
        request: &AnalyzeMoodRequest,
    ) -> Result<Value, AiError> {
        self.post("/analyze-mood", request).await
    }

    pub async fn semantic_search(
        &self,
        request: &SemanticSearchRequest,
    ) -> Result<Value, AiError> {
        self.post("/semantic-search", request).await
    }

    /// POST `body` and hand back whatever JSON the service answered with
    async fn post<B>(&self, path: &str, body: &B) -> Result<Value, AiError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("AI request: POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = upstream_message(status.as_u16(), &text);
            warn!("AI service returned {} for {}: {}", status, path, message);
            return Err(AiError::Upstream {
                status: mapped_status(status.as_u16()),
                message,
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                AiError::Timeout
            } else {
                AiError::InvalidResponse(e.to_string())
            }
        })?;
        serde_json::from_slice(&bytes).map_err(|e| AiError::InvalidResponse(e.to_string()))
    }

    fn transport_error(&self, e: reqwest::Error) -> AiError {
        if e.is_timeout() {
            AiError::Timeout
        } else if e.is_connect() {
            AiError::Unavailable {
                base_url: self.base_url.clone(),
            }
        } else {
            AiError::Transport(e.to_string())
        }
    }
}

/// Client errors pass through; everything else is a bad gateway
fn mapped_status(status: u16) -> u16 {
    if (400..500).contains(&status) {
        status
    } else {
        StatusCode::BAD_GATEWAY.as_u16()
    }
}

/// Prefer an embedded `error`/`message` field, then the raw text
fn upstream_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["error", "message"] {
            if let Some(message) = value.get(key).and_then(|m| m.as_str()) {
                if !message.is_empty() {
                    return message.to_string();
                }
            }
        }
    }
    if !body.trim().is_empty() {
        return body.to_string();
    }
    format!("AI API returned error status {}", status)
}
