//! Scrape sources
//!
//! Each submodule turns one site's HTML into plain data with synchronous
//! parsers. [`SourceScraper`] drives fetching, parsing and YouTube
//! resolution for a whole source and yields merge candidates.

pub mod billboard;
pub mod spotify;
pub mod wikipedia;
pub mod youtube;

use cmtv_common::config::{SourceKind, SourcesConfig};
use cmtv_common::Candidate;
use scraper::Selector;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{ScrapeError, ScrapeResult};
use crate::fetch::PageFetcher;
use crate::resolver::YouTubeResolver;

/// A title/artist pair that still needs a YouTube video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRef {
    pub title: String,
    pub artist: String,
}

pub(crate) fn selector(css: &str) -> ScrapeResult<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::Parse(format!("Invalid selector '{}': {:?}", css, e)))
}

/// Provenance label written to the playlist's `source` field
///
/// The manual source has no fixed label; it extends the existing one.
pub fn source_label(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Youtube => "YouTube Playlist - Country Music 24/7",
        SourceKind::Spotify => "Spotify Playlist + YouTube - Country Music Collection",
        SourceKind::Wikipedia => "Wikipedia - List of Billboard number-one country songs",
        SourceKind::Billboard => "Billboard Hot Country Songs + YouTube",
        SourceKind::Manual => "Manual additions",
    }
}

/// Year of a `..._of_2025` style list URL
fn chart_year(url: &str) -> Option<&str> {
    let (_, year) = url.trim_end_matches('/').rsplit_once("_of_")?;
    (year.len() == 4 && year.chars().all(|c| c.is_ascii_digit())).then_some(year)
}

/// Scrapes candidates from the configured sites
#[derive(Clone)]
pub struct SourceScraper {
    fetcher: Arc<dyn PageFetcher>,
    resolver: YouTubeResolver,
    config: SourcesConfig,
}

impl SourceScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: SourcesConfig) -> Self {
        Self {
            resolver: YouTubeResolver::new(fetcher.clone()),
            fetcher,
            config,
        }
    }

    /// Provenance label for `kind`
    ///
    /// The Wikipedia label names the chart year of the configured list page.
    pub fn label(&self, kind: SourceKind) -> String {
        match (kind, chart_year(&self.config.wikipedia_url)) {
            (SourceKind::Wikipedia, Some(year)) => format!("{} of {}", source_label(kind), year),
            _ => source_label(kind).to_string(),
        }
    }

    /// Scrape one source, in scrape order
    pub async fn scrape(&self, kind: SourceKind) -> ScrapeResult<Vec<Candidate>> {
        info!(source = %kind, "Scraping source");
        match kind {
            SourceKind::Youtube => self.youtube_playlist(&self.config.youtube_playlist_url).await,
            SourceKind::Spotify => self.spotify().await,
            SourceKind::Wikipedia => self.wikipedia().await,
            SourceKind::Billboard => self.billboard().await,
            SourceKind::Manual => self.manual().await,
        }
    }

    /// Videos of a YouTube playlist page
    pub async fn youtube_playlist(&self, url: &str) -> ScrapeResult<Vec<Candidate>> {
        let html = self.fetcher.fetch(url).await?;
        let videos = youtube::parse_playlist_page(&html)?;
        info!(url = %url, count = videos.len(), "Found videos in playlist");
        Ok(videos.into_iter().map(|v| v.into_candidate()).collect())
    }

    /// Look up individual watch pages; ids whose page fails are skipped
    pub async fn youtube_videos(&self, video_ids: &[String]) -> Vec<Candidate> {
        let mut candidates = Vec::with_capacity(video_ids.len());
        for video_id in video_ids {
            match self.youtube_video(video_id).await {
                Ok(Some(candidate)) => {
                    info!(youtube_id = %video_id, "Fetched: {} - {}", candidate.artist, candidate.title);
                    candidates.push(candidate);
                }
                Ok(None) => warn!(youtube_id = %video_id, "Could not get title"),
                Err(e) => warn!(youtube_id = %video_id, "Error fetching video: {}", e),
            }
        }
        candidates
    }

    async fn youtube_video(&self, video_id: &str) -> ScrapeResult<Option<Candidate>> {
        let html = self.fetcher.fetch(&youtube::watch_url(video_id)).await?;
        let Some(raw_title) = youtube::parse_video_page_title(&html)? else {
            return Ok(None);
        };
        let video = youtube::PlaylistVideo {
            video_id: video_id.to_string(),
            raw_title,
        };
        Ok(Some(video.into_candidate()))
    }

    async fn spotify(&self) -> ScrapeResult<Vec<Candidate>> {
        let html = self.fetcher.fetch(&self.config.spotify_playlist_url).await?;
        let tracks = spotify::parse_playlist_page(&html)?;
        if tracks.is_empty() {
            warn!("No tracks found; Spotify might have changed its layout");
        }
        Ok(self.resolve_tracks(tracks).await)
    }

    async fn wikipedia(&self) -> ScrapeResult<Vec<Candidate>> {
        let html = self.fetcher.fetch(&self.config.wikipedia_url).await?;
        let tracks = wikipedia::parse_chart_tables(&html, self.config.wikipedia_limit)?;
        Ok(self.resolve_tracks(tracks).await)
    }

    async fn billboard(&self) -> ScrapeResult<Vec<Candidate>> {
        let html = self.fetcher.fetch(&self.config.billboard_url).await?;
        let tracks = billboard::parse_chart_page(&html, self.config.billboard_limit)?;
        Ok(self.resolve_tracks(tracks).await)
    }

    async fn manual(&self) -> ScrapeResult<Vec<Candidate>> {
        let mut candidates = self.youtube_videos(&self.config.manual_video_ids).await;

        if let Some(playlist_id) = &self.config.manual_playlist_id {
            match self.youtube_playlist(&youtube::playlist_url(playlist_id)).await {
                Ok(found) => candidates.extend(found),
                Err(e) => warn!(playlist_id = %playlist_id, "Error scraping playlist: {}", e),
            }
        }

        Ok(candidates)
    }

    /// Find a video for every track; unresolved tracks stay in the batch
    /// without an id so the merge counts them
    async fn resolve_tracks(&self, tracks: Vec<TrackRef>) -> Vec<Candidate> {
        info!(count = tracks.len(), "Searching YouTube for tracks");
        let mut candidates = Vec::with_capacity(tracks.len());
        let mut found = 0;

        for track in tracks {
            match self.resolver.resolve(&track).await {
                Some(video_id) => {
                    found += 1;
                    candidates.push(Candidate::new(track.title, track.artist, video_id));
                }
                None => candidates.push(Candidate::unresolved(track.title, track.artist)),
            }
        }

        info!("Found {}/{} songs on YouTube", found, candidates.len());
        candidates
    }
}
