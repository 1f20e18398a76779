//! tunelib-api - Music library REST service
//!
//! Serves the song catalog, artists, playlists, dashboard statistics and the
//! AI proxy over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tunelib_api::services::AiClient;
use tunelib_api::{build_router, AppState};
use tunelib_common::config::{self, ConfigOverrides, ServiceConfig};

/// Command-line arguments for tunelib-api
#[derive(Parser, Debug)]
#[command(name = "tunelib-api")]
#[command(about = "Music library REST API")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "TUNELIB_PORT")]
    port: Option<u16>,

    /// Database connection string (sqlite://path or sqlite::memory:)
    #[arg(long, env = "TUNELIB_DATABASE_URL")]
    database_url: Option<String>,

    /// Upper bound on pooled database connections
    #[arg(long, env = "TUNELIB_DB_MAX_CONNECTIONS")]
    db_max_connections: Option<u32>,

    /// Comma-separated CORS origins
    #[arg(long, env = "TUNELIB_ALLOWED_ORIGINS")]
    allowed_origins: Option<String>,

    /// Base URL of the AI service
    #[arg(long, env = "TUNELIB_AI_API_URL")]
    ai_api_url: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long, env = "TUNELIB_LOG_LEVEL")]
    log_level: Option<String>,

    /// TOML bootstrap file
    #[arg(short, long, env = "TUNELIB_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(config::default_config_path);
    let file = match &config_path {
        Some(path) => config::load_toml_config(path).context("Failed to load config file")?,
        None => None,
    };
    let loaded_file = file.is_some();

    let overrides = ConfigOverrides {
        port: args.port,
        database_url: args.database_url,
        db_max_connections: args.db_max_connections,
        allowed_origins: args.allowed_origins,
        ai_api_url: args.ai_api_url,
        log_level: args.log_level,
    };
    let config = ServiceConfig::resolve(overrides, file).context("Invalid configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting tunelib-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match (&config_path, loaded_file) {
        (Some(path), true) => info!("Config file: {}", path.display()),
        _ => info!("No config file, using arguments and defaults"),
    }

    let db = tunelib_common::db::init_database(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to initialize database")?;
    db.ping().await.context("Database is not responding")?;
    info!("Database ready: {}", config.database_url);

    let ai = AiClient::new(config.ai_api_url.clone(), config.ai_timeout)
        .context("Failed to build AI client")?;
    info!(
        "AI service: {} (timeout {}s)",
        ai.base_url(),
        config.ai_timeout.as_secs()
    );
    info!("CORS origins: {}", config.allowed_origins.join(", "));

    let state = AppState::new(db.clone(), ai, config.allowed_origins.clone());
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.pool().close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
