//! cmtv-scrape - one-shot playlist scraper
//!
//! Scrapes a single source, merges the result into the playlist file and
//! exits. Intended for manual runs and cron; the server runs the same job on
//! its own schedule.

use anyhow::{Context, Result};
use clap::Parser;
use cmtv_common::config::{SourceKind, TomlConfig};
use cmtv_scraper::{RunOptions, ScrapeJob};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for cmtv-scrape
#[derive(Parser, Debug)]
#[command(name = "cmtv-scrape")]
#[command(about = "Scrape a song source and merge it into the playlist")]
#[command(version)]
struct Args {
    /// Source to scrape (youtube, spotify, wikipedia, billboard, manual)
    source: SourceKind,

    /// Path to config file
    #[arg(short, long, env = "CMTV_CONFIG")]
    config: Option<PathBuf>,

    /// Playlist JSON file (overrides config)
    #[arg(short, long)]
    playlist_file: Option<PathBuf>,

    /// Extra video ids for the manual source (repeatable)
    #[arg(long = "video-id")]
    video_ids: Vec<String>,

    /// Extra playlist id for the manual source (overrides config)
    #[arg(long)]
    playlist_id: Option<String>,

    /// Merge and report, but do not write the playlist file
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::load_resolved(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(path) = args.playlist_file {
        config.playlist_file = path;
    }
    config.sources.manual_video_ids.extend(args.video_ids);
    if args.playlist_id.is_some() {
        config.sources.manual_playlist_id = args.playlist_id;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(
        "Starting cmtv-scrape v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Source: {}", args.source);
    info!("Playlist file: {}", config.playlist_file.display());

    let job = ScrapeJob::from_config(&config).context("Failed to initialize scraper")?;
    let report = job
        .run(args.source, RunOptions { dry_run: args.dry_run })
        .await
        .with_context(|| format!("Scrape of {} failed", args.source))?;

    info!("Total songs: {}", report.total_songs);
    info!("New songs added: {}", report.added);
    info!("Songs flagged new: {}", report.new_flagged);
    if report.dropped_missing_id > 0 {
        info!("Tracks without a YouTube match: {}", report.dropped_missing_id);
    }

    Ok(())
}
