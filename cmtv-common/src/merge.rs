//! Playlist merging
//!
//! Reconciles a freshly scraped candidate batch against the persisted
//! playlist. The merge is additive: existing songs keep their relative order
//! at the front, unseen candidates are appended in scrape order, nothing is
//! ever removed for being absent from a later scrape.
//!
//! Runs synchronously over already-fetched data and performs no I/O.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::models::{Candidate, Playlist, Song};
use crate::time;

/// Days a newly merged song stays flagged `isNew`
pub const DEFAULT_FRESHNESS_DAYS: u32 = 7;

/// Result of a merge, with bookkeeping for logging and reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The merged playlist, ready to save
    pub playlist: Playlist,
    /// Identities appended by this merge, in append order
    pub added: Vec<String>,
    /// Candidates dropped because their identity was already known
    pub skipped_duplicates: usize,
    /// Candidates dropped because they had no usable identity
    pub dropped_missing_id: usize,
    /// Existing entries dropped because they repeated an earlier identity
    /// or had no identity at all
    pub collapsed_existing: usize,
    /// Songs whose `isNew` flag was removed by the freshness sweep
    pub aged_out: usize,
}

/// Merges candidate batches into a playlist
#[derive(Debug, Clone, Copy)]
pub struct PlaylistMerger {
    freshness_window: Duration,
}

impl Default for PlaylistMerger {
    fn default() -> Self {
        Self::new(DEFAULT_FRESHNESS_DAYS)
    }
}

impl PlaylistMerger {
    /// Create a merger with the given freshness window in days
    pub fn new(freshness_days: u32) -> Self {
        Self {
            freshness_window: Duration::days(i64::from(freshness_days)),
        }
    }

    /// Merge `candidates` into `existing`
    ///
    /// **Algorithm:**
    /// 1. Seed the known-identity set and the result from `existing.songs`
    ///    (empty when `existing` is absent)
    /// 2. Walk candidates in order; drop those without a usable id or with
    ///    an already-known id, append the rest with `isNew = true` and
    ///    `addedDate = now`
    /// 3. Renumber positions from array order
    /// 4. Run the freshness sweep over the whole result
    pub fn merge<I>(
        &self,
        existing: Option<Playlist>,
        candidates: I,
        source: impl Into<String>,
        now: DateTime<Utc>,
    ) -> MergeOutcome
    where
        I: IntoIterator<Item = Candidate>,
    {
        let existing_songs = existing.map(|p| p.songs).unwrap_or_default();

        let mut known: HashSet<String> = HashSet::with_capacity(existing_songs.len());
        let mut songs: Vec<Song> = Vec::with_capacity(existing_songs.len());
        let mut collapsed_existing = 0;

        for song in existing_songs {
            if !song.is_playable() {
                warn!(title = %song.title, "Dropping persisted entry without a YouTube id");
                collapsed_existing += 1;
                continue;
            }
            if !known.insert(song.youtube_id.clone()) {
                warn!(youtube_id = %song.youtube_id, "Dropping repeated persisted entry");
                collapsed_existing += 1;
                continue;
            }
            songs.push(song);
        }

        let added_date = time::to_iso_string(now);
        let mut added = Vec::new();
        let mut skipped_duplicates = 0;
        let mut dropped_missing_id = 0;

        for candidate in candidates {
            let Some(id) = candidate.identity() else {
                debug!(title = %candidate.title, artist = %candidate.artist, "Dropping candidate without YouTube id");
                dropped_missing_id += 1;
                continue;
            };

            if known.contains(id) {
                info!(youtube_id = %id, "SKIP (duplicate): \"{}\" - {}", candidate.title, candidate.artist);
                skipped_duplicates += 1;
                continue;
            }

            let id = id.to_string();
            info!(youtube_id = %id, "NEW: \"{}\" - {}", candidate.title, candidate.artist);
            known.insert(id.clone());
            added.push(id.clone());
            songs.push(Song {
                position: 0,
                title: candidate.title,
                artist: candidate.artist,
                youtube_id: id,
                is_new: Some(true),
                added_date: Some(added_date.clone()),
            });
        }

        renumber(&mut songs);
        let aged_out = sweep_freshness(&mut songs, now, self.freshness_window);

        info!(
            total = songs.len(),
            added = added.len(),
            skipped = skipped_duplicates,
            "Merged playlist"
        );

        MergeOutcome {
            playlist: Playlist {
                last_updated: added_date,
                source: source.into(),
                songs,
            },
            added,
            skipped_duplicates,
            dropped_missing_id,
            collapsed_existing,
            aged_out,
        }
    }
}

/// Set every song's position to its 1-based index
pub fn renumber(songs: &mut [Song]) {
    for (index, song) in songs.iter_mut().enumerate() {
        song.position = (index + 1) as u32;
    }
}

/// Remove `isNew` from songs whose `addedDate` is at least `window` old
///
/// The field is removed, never set to `false`; a stray `isNew: false` is
/// removed as well. `addedDate` is left untouched. Songs flagged new with a
/// missing or unparseable `addedDate` are left as they are.
///
/// Returns the number of songs that aged out.
pub fn sweep_freshness(songs: &mut [Song], now: DateTime<Utc>, window: Duration) -> usize {
    let mut aged_out = 0;
    for song in songs.iter_mut() {
        match song.is_new {
            Some(true) => {}
            Some(false) => {
                song.is_new = None;
                continue;
            }
            None => continue,
        }

        let Some(added_at) = song.added_at() else {
            if song.added_date.is_some() {
                debug!(youtube_id = %song.youtube_id, "Unparseable addedDate, leaving isNew as is");
            }
            continue;
        };

        if now.signed_duration_since(added_at) >= window {
            song.is_new = None;
            aged_out += 1;
        }
    }
    aged_out
}
