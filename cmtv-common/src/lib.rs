//! # Country MTV Common Library
//!
//! Shared code for the scraper and the server including:
//! - Playlist model (Song, Playlist, Candidate)
//! - Playlist merging and freshness aging
//! - Title / table-cell parsing helpers
//! - Playlist file storage
//! - Configuration loading
//! - Utility functions

pub mod config;
pub mod error;
pub mod merge;
pub mod models;
pub mod parsing;
pub mod shuffle;
pub mod sse;
pub mod store;
pub mod time;

pub use error::{Error, Result};
pub use merge::{MergeOutcome, PlaylistMerger};
pub use models::{Candidate, Playlist, Song};
pub use store::PlaylistStore;
