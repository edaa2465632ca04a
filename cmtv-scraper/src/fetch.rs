//! Page fetching
//!
//! Scrapers only need "give me the HTML at this URL". [`PageFetcher`] is that
//! capability; [`HttpFetcher`] implements it over reqwest with a minimum
//! interval between requests so the scraped sites are not hammered.

use async_trait::async_trait;
use cmtv_common::config::SourcesConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::error::{ScrapeError, ScrapeResult};

/// Fetches a page body by URL
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> ScrapeResult<String>;
}

/// Rate limiter enforcing a minimum interval between requests
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait if necessary to comply with rate limit
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// HTTP page fetcher
pub struct HttpFetcher {
    http_client: reqwest::Client,
    rate_limiter: RateLimiter,
}

impl HttpFetcher {
    pub fn new(config: &SourcesConfig) -> ScrapeResult<Self> {
        let mut headers = HeaderMap::new();
        // Sites localize titles; keep them in English
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScrapeError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: RateLimiter::new(Duration::from_millis(config.request_delay_ms)),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> ScrapeResult<String> {
        self.rate_limiter.wait().await;

        tracing::debug!(url = %url, "Fetching page");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ScrapeError::Network(e.to_string()))
    }
}
