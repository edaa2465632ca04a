//! Test helpers shared by the scraper integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use cmtv_common::config::SourcesConfig;
use cmtv_scraper::{PageFetcher, ScrapeError, ScrapeResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves canned pages by exact URL; unknown URLs answer 404
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> ScrapeResult<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| ScrapeError::Http {
            status: 404,
            url: url.to_string(),
        })
    }
}

/// Source URLs pointing at a fake host
pub fn test_sources_config() -> SourcesConfig {
    SourcesConfig {
        youtube_playlist_url: "https://yt.test/playlist".to_string(),
        spotify_playlist_url: "https://spotify.test/playlist".to_string(),
        wikipedia_url: "https://wiki.test/list".to_string(),
        billboard_url: "https://billboard.test/chart".to_string(),
        request_delay_ms: 0,
        ..SourcesConfig::default()
    }
}

/// A page embedding `ytInitialData`
pub fn initial_data_page(json: &str) -> String {
    format!(
        "<html><body><script>var ytInitialData = {};</script></body></html>",
        json
    )
}

/// Playlist page listing `(video_id, raw_title)` pairs
pub fn youtube_playlist_page(videos: &[(&str, &str)]) -> String {
    let items: Vec<String> = videos
        .iter()
        .map(|(id, title)| {
            format!(
                r#"{{"playlistVideoRenderer": {{"videoId": "{}", "title": {{"runs": [{{"text": "{}"}}]}}}}}}"#,
                id, title
            )
        })
        .collect();
    initial_data_page(&format!(r#"{{"contents": [{}]}}"#, items.join(",")))
}

/// Search results page whose first hit is `video_id`
pub fn youtube_search_page(video_id: &str) -> String {
    initial_data_page(&format!(
        r#"{{"contents": [{{"videoRenderer": {{"videoId": "{}"}}}}]}}"#,
        video_id
    ))
}
