//! moodtune-gen - Mood to Music Generator
//!
//! Serves a web page where a user describes a mood. The mood is turned into a
//! music brief by a chat model, the brief into an MP3 by a music generation
//! service, and the track is stored per session and served back for playback.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use moodtune_common::config::{self, DEFAULT_HOST, DEFAULT_PORT};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moodtune_gen::services::{artifact_store, ArtifactStore, Pipeline};
use moodtune_gen::{build_router, AppState};

/// Command-line arguments for moodtune-gen
#[derive(Parser, Debug)]
#[command(name = "moodtune-gen")]
#[command(about = "Mood to music generation service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "MOODTUNE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "MOODTUNE_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Folder holding generated sessions
    #[arg(short, long)]
    sessions_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing init so its log level can apply;
    // a missing file is reported once the subscriber is up.
    let config_path = args.config.clone().or_else(config::default_config_path);
    let toml_config = match &config_path {
        Some(path) if path.exists() => config::load_toml_config(path)?,
        _ => config::TomlConfig::default(),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "moodtune_gen={level},moodtune_common={level},tower_http={level}",
                    level = toml_config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting moodtune-gen v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) if path.exists() => info!("Config file: {}", path.display()),
        Some(path) => info!("No config file at {}, using defaults", path.display()),
        None => info!("No config directory on this platform, using defaults"),
    }

    let sessions_dir = config::resolve_sessions_dir(
        args.sessions_dir.as_deref(),
        "MOODTUNE_SESSIONS_DIR",
        &toml_config,
    );
    let store = ArtifactStore::new(sessions_dir);
    store
        .ensure_root()
        .await
        .with_context(|| format!("Failed to create sessions folder {}", store.root().display()))?;
    info!("Sessions folder: {}", store.root().display());
    info!("Upstream API: {}", toml_config.upstream.api_base);

    // Session directories are kept until externally cleaned unless a TTL is configured
    match toml_config.session_ttl_secs {
        Some(ttl) => {
            info!("Pruning sessions older than {}s", ttl);
            artifact_store::spawn_session_sweeper(store.clone(), Duration::from_secs(ttl));
        }
        None => info!("Session pruning disabled"),
    }

    let pipeline = Pipeline::from_config(&toml_config.upstream, store.clone())
        .context("Failed to initialize generation pipeline")?;
    let app = build_router(AppState::new(pipeline, store));

    let host = args
        .host
        .or(toml_config.host)
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = args.port.or(toml_config.port).unwrap_or(DEFAULT_PORT);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
