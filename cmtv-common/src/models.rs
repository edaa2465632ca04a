//! Playlist data model
//!
//! Field names follow the persisted `playlist.json` layout consumed by the
//! browser player, so every struct serializes in camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time;

/// A song entry in the persisted playlist
///
/// `youtube_id` is the identity key: two songs with the same id are the
/// same song regardless of title/artist text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// 1-based rank, reassigned on every merge
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub youtube_id: String,
    /// Present (and `true`) only inside the freshness window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_new: Option<bool>,
    /// ISO-8601 timestamp of the first merge that persisted this song
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_date: Option<String>,
}

impl Song {
    /// True when the song carries the `isNew` flag
    pub fn is_flagged_new(&self) -> bool {
        self.is_new == Some(true)
    }

    /// Parsed `addedDate`, `None` when absent or unparseable
    pub fn added_at(&self) -> Option<DateTime<Utc>> {
        self.added_date.as_deref().and_then(time::parse_timestamp)
    }

    /// True when the song can be handed to the player
    pub fn is_playable(&self) -> bool {
        !self.youtube_id.trim().is_empty()
    }
}

/// The persisted playlist aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    /// ISO-8601 timestamp of the last successful merge-and-save
    #[serde(default)]
    pub last_updated: String,
    /// Free-text provenance label
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub songs: Vec<Song>,
}

impl Playlist {
    /// Parsed `lastUpdated`, `None` when absent or unparseable
    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        time::parse_timestamp(&self.last_updated)
    }

    /// Number of songs currently flagged `isNew`
    pub fn new_song_count(&self) -> usize {
        self.songs.iter().filter(|s| s.is_flagged_new()).count()
    }

    /// True when `song.position == index + 1` for every entry
    pub fn positions_are_contiguous(&self) -> bool {
        self.songs
            .iter()
            .enumerate()
            .all(|(i, s)| s.position as usize == i + 1)
    }
}

/// A song freshly produced by a scraper, not yet reconciled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub youtube_id: Option<String>,
}

impl Candidate {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        youtube_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            youtube_id: Some(youtube_id.into()),
        }
    }

    /// Candidate whose video could not be found
    pub fn unresolved(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            youtube_id: None,
        }
    }

    /// The usable identity of this candidate
    ///
    /// Blank ids are not usable. Non-blank ids are returned exactly as
    /// scraped; no case or whitespace normalization is applied.
    pub fn identity(&self) -> Option<&str> {
        self.youtube_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }
}
