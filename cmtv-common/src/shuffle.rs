//! Player-side ordering
//!
//! The merger never reorders songs. Consumers that want random playback
//! filter to playable entries and shuffle a copy, leaving the stored order
//! alone.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{Playlist, Song};

/// Songs that carry a non-empty YouTube id, in playlist order
pub fn playable_songs(playlist: &Playlist) -> Vec<Song> {
    playlist
        .songs
        .iter()
        .filter(|s| s.is_playable())
        .cloned()
        .collect()
}

/// Uniform Fisher-Yates shuffle of a copy of `songs`
pub fn shuffle_songs<R: Rng + ?Sized>(songs: &[Song], rng: &mut R) -> Vec<Song> {
    let mut shuffled = songs.to_vec();
    shuffled.shuffle(rng);
    shuffled
}
