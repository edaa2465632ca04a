//! YouTube video resolution for title/artist pairs

use std::sync::Arc;
use tracing::{info, warn};

use crate::fetch::PageFetcher;
use crate::sources::{youtube, TrackRef};

/// Search query used to find a track's video
pub fn search_query(track: &TrackRef) -> String {
    format!("{} {} official", track.artist, track.title)
}

/// Finds the first YouTube search result for a track
#[derive(Clone)]
pub struct YouTubeResolver {
    fetcher: Arc<dyn PageFetcher>,
}

impl YouTubeResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Video id of the first search hit, `None` when nothing was found or the
    /// search failed
    pub async fn resolve(&self, track: &TrackRef) -> Option<String> {
        let url = youtube::search_url(&search_query(track));

        let html = match self.fetcher.fetch(&url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Error searching for {} - {}: {}", track.artist, track.title, e);
                return None;
            }
        };

        match youtube::parse_search_first_video(&html) {
            Ok(Some(video_id)) => {
                info!(youtube_id = %video_id, "Found: {} - {}", track.artist, track.title);
                Some(video_id)
            }
            Ok(None) => {
                warn!("Not found: {} - {}", track.artist, track.title);
                None
            }
            Err(e) => {
                warn!("Could not parse search results for {} - {}: {}", track.artist, track.title, e);
                None
            }
        }
    }
}
