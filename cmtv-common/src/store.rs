//! Playlist file storage
//!
//! The playlist lives in a single pretty-printed JSON file that the static
//! site serves directly. Writes go to a sibling temp file first and are then
//! renamed into place, so readers never observe a half-written playlist.
//!
//! The store does not serialize writers. Callers hold at most one writer at
//! a time (the auto-update service refuses to start overlapping cycles).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::models::Playlist;
use crate::{Error, Result};

/// JSON-file backed playlist storage
#[derive(Debug, Clone)]
pub struct PlaylistStore {
    path: PathBuf,
}

impl PlaylistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the playlist, degrading to `None` when it cannot be used
    ///
    /// A missing file is a normal first run. An unreadable or malformed file
    /// is logged and also treated as absent.
    pub fn load(&self) -> Option<Playlist> {
        match self.load_strict() {
            Ok(playlist) => playlist,
            Err(e) => {
                warn!(path = %self.path.display(), "Ignoring unusable playlist file: {}", e);
                None
            }
        }
    }

    /// Load the playlist, surfacing read and parse errors
    pub fn load_strict(&self) -> Result<Option<Playlist>> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No playlist file yet");
                return Ok(None);
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let playlist: Playlist = serde_json::from_str(&data)?;
        Ok(Some(playlist))
    }

    /// Write the playlist as 2-space indented JSON
    pub fn save(&self, playlist: &Playlist) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(playlist)?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, json)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(Error::Io(e));
        }

        debug!(path = %self.path.display(), songs = playlist.songs.len(), "Playlist saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "playlist.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Song;
    use tempfile::TempDir;

    fn sample() -> Playlist {
        Playlist {
            last_updated: "2025-10-16T03:00:00.000Z".into(),
            source: "test".into(),
            songs: vec![Song {
                position: 1,
                title: "A".into(),
                artist: "X".into(),
                youtube_id: "id1".into(),
                is_new: Some(true),
                added_date: Some("2025-10-16T03:00:00.000Z".into()),
            }],
        }
    }

    #[test]
    fn test_missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = PlaylistStore::new(dir.path().join("playlist.json"));
        assert!(store.load().is_none());
        assert!(store.load_strict().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = PlaylistStore::new(dir.path().join("nested/dir/playlist.json"));

        store.save(&sample()).unwrap();

        assert_eq!(store.load(), Some(sample()));
        assert!(!dir.path().join("nested/dir/playlist.json.tmp").exists());
    }

    #[test]
    fn test_saved_file_is_pretty_printed() {
        let dir = TempDir::new().unwrap();
        let store = PlaylistStore::new(dir.path().join("playlist.json"));
        store.save(&sample()).unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with("{\n  \"lastUpdated\""));
        assert!(text.contains("\"youtubeId\": \"id1\""));
    }

    #[test]
    fn test_malformed_file_degrades_to_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("playlist.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = PlaylistStore::new(&path);

        assert!(store.load().is_none());
        assert!(matches!(store.load_strict(), Err(Error::Json(_))));
    }
}
