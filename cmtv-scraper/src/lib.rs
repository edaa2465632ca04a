//! cmtv-scraper library
//!
//! Fetches chart and playlist pages, turns them into merge candidates and
//! merges them into the playlist file. Used by the `cmtv-scrape` binary and
//! by the server's daily auto-update.

pub mod error;
pub mod fetch;
pub mod job;
pub mod resolver;
pub mod sources;

pub use crate::error::{ScrapeError, ScrapeResult};
pub use crate::fetch::{HttpFetcher, PageFetcher};
pub use crate::job::{JobReport, RunOptions, ScrapeJob};
pub use crate::sources::SourceScraper;
