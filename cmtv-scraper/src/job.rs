//! Scrape job: scrape → load → merge → save
//!
//! One job run handles one source. The caller guarantees that at most one
//! job writes the playlist file at a time.

use cmtv_common::config::{SourceKind, TomlConfig};
use cmtv_common::{time, PlaylistMerger, PlaylistStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{ScrapeError, ScrapeResult};
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::sources::SourceScraper;

/// Summary of one job run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub source: SourceKind,
    /// Candidates produced by the scraper
    pub scraped: usize,
    /// Songs in the playlist after the merge
    pub total_songs: usize,
    /// Songs appended by this run
    pub added: usize,
    pub skipped_duplicates: usize,
    pub dropped_missing_id: usize,
    /// Songs flagged `isNew` after the merge
    pub new_flagged: usize,
    /// False for dry runs and empty scrapes
    pub saved: bool,
}

/// Options for a single run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Merge but do not write the playlist file
    pub dry_run: bool,
}

/// Runs scrapes against a playlist file
#[derive(Clone)]
pub struct ScrapeJob {
    scraper: SourceScraper,
    store: PlaylistStore,
    merger: PlaylistMerger,
}

impl ScrapeJob {
    pub fn new(scraper: SourceScraper, store: PlaylistStore, merger: PlaylistMerger) -> Self {
        Self {
            scraper,
            store,
            merger,
        }
    }

    /// Build a job that fetches over HTTP, from configuration
    pub fn from_config(config: &TomlConfig) -> ScrapeResult<Self> {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&config.sources)?);
        Ok(Self::new(
            SourceScraper::new(fetcher, config.sources.clone()),
            PlaylistStore::new(&config.playlist_file),
            PlaylistMerger::new(config.freshness_days),
        ))
    }

    pub fn store(&self) -> &PlaylistStore {
        &self.store
    }

    /// Scrape `kind` and merge the result into the playlist file
    ///
    /// A scrape with no usable YouTube id (empty, or every lookup missed)
    /// leaves the file untouched. The manual source refuses
    /// to run without an existing playlist.
    pub async fn run(&self, kind: SourceKind, options: RunOptions) -> ScrapeResult<JobReport> {
        let existing = self.store.load();

        if kind == SourceKind::Manual && existing.is_none() {
            return Err(ScrapeError::MissingPlaylist(self.store.path().to_path_buf()));
        }
        match &existing {
            Some(playlist) => info!("Current playlist has {} songs", playlist.songs.len()),
            None => info!("No existing playlist, creating a new one"),
        }

        let candidates = self.scraper.scrape(kind).await?;
        let scraped = candidates.len();

        let dropped_missing_id = candidates.iter().filter(|c| c.identity().is_none()).count();

        if dropped_missing_id == scraped {
            warn!(source = %kind, "No songs found or matched on YouTube");
            let playlist = existing.unwrap_or_default();
            return Ok(JobReport {
                source: kind,
                scraped,
                total_songs: playlist.songs.len(),
                added: 0,
                skipped_duplicates: 0,
                dropped_missing_id,
                new_flagged: playlist.new_song_count(),
                saved: false,
            });
        }

        let label = match (kind, &existing) {
            (SourceKind::Manual, Some(playlist)) => format!("{} + Manual additions", playlist.source),
            _ => self.scraper.label(kind),
        };

        let outcome = self.merger.merge(existing, candidates, label, time::now());

        let saved = if options.dry_run {
            info!("Dry run, playlist not saved");
            false
        } else {
            self.store.save(&outcome.playlist)?;
            info!(path = %self.store.path().display(), "Playlist saved");
            true
        };

        let report = JobReport {
            source: kind,
            scraped,
            total_songs: outcome.playlist.songs.len(),
            added: outcome.added.len(),
            skipped_duplicates: outcome.skipped_duplicates,
            dropped_missing_id: outcome.dropped_missing_id,
            new_flagged: outcome.playlist.new_song_count(),
            saved,
        };

        info!(
            source = %kind,
            total = report.total_songs,
            added = report.added,
            new = report.new_flagged,
            "Scrape complete"
        );

        Ok(report)
    }
}
