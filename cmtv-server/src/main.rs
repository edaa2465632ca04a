//! cmtv-server - Country MTV web server
//!
//! Serves the player site and its API, counts live viewers and keeps the
//! playlist fresh with a daily auto-update.

use anyhow::{Context, Result};
use clap::Parser;
use cmtv_common::config::TomlConfig;
use cmtv_common::PlaylistStore;
use cmtv_scraper::ScrapeJob;
use cmtv_server::{build_router, AppState, AutoUpdateService, ViewerCounter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for cmtv-server
#[derive(Parser, Debug)]
#[command(name = "cmtv-server")]
#[command(about = "Country MTV web server")]
#[command(version)]
struct Args {
    /// Path to config file
    #[arg(short, long, env = "CMTV_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP port (overrides config)
    #[arg(short, long, env = "CMTV_PORT")]
    port: Option<u16>,

    /// Playlist JSON file (overrides config)
    #[arg(long)]
    playlist_file: Option<PathBuf>,

    /// Directory of static site files (overrides config)
    #[arg(long)]
    public_dir: Option<PathBuf>,

    /// Do not start the daily auto-update
    #[arg(long)]
    no_auto_update: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::load_resolved(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(path) = args.playlist_file {
        config.playlist_file = path;
    }
    if let Some(dir) = args.public_dir {
        config.public_dir = dir;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=info", config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Country MTV server (cmtv-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Playlist file: {}", config.playlist_file.display());
    info!("Public directory: {}", config.public_dir.display());

    let store = PlaylistStore::new(&config.playlist_file);

    let viewers = Arc::new(ViewerCounter::new(Duration::from_secs(
        config.server.viewer_ttl_secs,
    )));
    viewers
        .clone()
        .spawn_sweeper(Duration::from_secs(config.server.viewer_sweep_secs));

    let job = ScrapeJob::from_config(&config).context("Failed to initialize scraper")?;
    let updater = Arc::new(AutoUpdateService::new(
        Arc::new(job),
        store.clone(),
        config.schedule.clone(),
    ));
    if config.schedule.enabled && !args.no_auto_update {
        updater.clone().start();
    } else {
        info!("Auto-update disabled");
    }

    let state = AppState::new(store, &config.public_dir, viewers, updater);
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("cmtv-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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
