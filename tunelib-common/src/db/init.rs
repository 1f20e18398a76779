//! Database initialization
//!
//! Opens (or creates) the SQLite store, configures every pooled connection
//! and applies the schema. All statements are idempotent so this runs on
//! every startup.

use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use super::Database;

/// Initialize the pooled data-access handle and create tables if needed
pub async fn init_database(database_url: &str, max_connections: u32) -> Result<Database> {
    if max_connections == 0 {
        return Err(Error::Config(
            "Connection pool needs at least one connection".to_string(),
        ));
    }

    let in_memory = database_url.contains(":memory:");
    let mut options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    if !in_memory {
        let db_path = options.get_filename().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let newly_created = !db_path.exists();
        if newly_created {
            info!("Creating new database: {}", db_path.display());
        } else {
            info!("Opening existing database: {}", db_path.display());
        }
        // WAL lets readers proceed while a reorder transaction commits
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
    if in_memory {
        // Every `:memory:` connection is a separate database
        pool_options = pool_options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }
    let pool = pool_options.connect_with(options).await?;

    create_schema(&pool).await?;
    info!("Database schema ready (pool size {})", max_connections);

    Ok(Database::new(pool))
}

/// Apply the schema to an open pool
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_songs_table(pool).await?;
    create_playlists_table(pool).await?;
    create_playlist_songs_table(pool).await?;
    Ok(())
}

async fn create_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            artist TEXT NOT NULL,
            album TEXT,
            genre TEXT,
            year INTEGER,
            duration INTEGER NOT NULL CHECK (duration > 0),
            lyrics TEXT,
            image_url TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    for index in [
        "CREATE INDEX IF NOT EXISTS idx_songs_artist ON songs(artist)",
        "CREATE INDEX IF NOT EXISTS idx_songs_genre ON songs(genre)",
        "CREATE INDEX IF NOT EXISTS idx_songs_year ON songs(year)",
        "CREATE INDEX IF NOT EXISTS idx_songs_created_at ON songs(created_at)",
    ] {
        sqlx::query(index).execute(pool).await?;
    }

    Ok(())
}

async fn create_playlists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS playlists (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            tags TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Membership rows cascade away with either parent
async fn create_playlist_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS playlist_songs (
            playlist_id TEXT NOT NULL REFERENCES playlists(id) ON DELETE CASCADE,
            song_id TEXT NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
            position INTEGER NOT NULL CHECK (position >= 0),
            added_at TEXT NOT NULL,
            PRIMARY KEY (playlist_id, song_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_playlist_songs_order
         ON playlist_songs(playlist_id, position, added_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_playlist_songs_song ON playlist_songs(song_id)")
        .execute(pool)
        .await?;

    Ok(())
}
