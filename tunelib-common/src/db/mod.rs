//! Persistence layer
//!
//! `Database` is the injected data-access handle. It owns the bounded
//! connection pool and is cloned into every component at construction.

pub mod artists;
pub mod init;
pub mod models;
pub mod playlists;
pub mod songs;
pub mod stats;

pub use init::*;
pub use models::*;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::Result;

/// Page size when a listing does not ask for one
pub const DEFAULT_PAGE_SIZE: i64 = 100;
/// Upper bound on any requested page size
pub const MAX_PAGE_SIZE: i64 = 1000;
pub const DEFAULT_OFFSET: i64 = 0;
/// Highest playlist position a client may request or the service may assign
pub const MAX_POSITION: i64 = i32::MAX as i64;

/// Pooled handle to the relational store
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Wrap an already configured pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Single-connection in-memory store with the schema applied
    ///
    /// Each SQLite `:memory:` connection is its own database, so the pool is
    /// pinned to one connection that never expires.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true))
            .await?;
        init::create_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Cheap liveness probe
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Fixed-width UTC text so stored timestamps sort lexicographically
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Escape LIKE wildcards so a search term matches literally
///
/// Patterns built from the result must use `ESCAPE '\'`.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\dir"), "c:\\\\dir");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_timestamp_is_fixed_width() {
        let a = timestamp(DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().into());
        let b = timestamp(DateTime::parse_from_rfc3339("2024-01-01T00:00:00.5Z").unwrap().into());
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }

    #[tokio::test]
    async fn test_in_memory_ping() {
        let db = Database::in_memory().await.unwrap();
        db.ping().await.unwrap();
    }
}
