//! Error types for cmtv-scraper

use std::path::PathBuf;
use thiserror::Error;

/// Scraper errors
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Request could not be sent or the body could not be read
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// Page did not have the expected structure
    #[error("Parse error: {0}")]
    Parse(String),

    /// The manual source only adds to an existing playlist
    #[error("No playlist at {0}; run a full scrape first")]
    MissingPlaylist(PathBuf),

    /// cmtv-common error
    #[error("Common error: {0}")]
    Common(#[from] cmtv_common::Error),
}

pub type ScrapeResult<T> = std::result::Result<T, ScrapeError>;
