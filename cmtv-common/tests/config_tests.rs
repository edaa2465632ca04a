//! Integration tests for configuration resolution and graceful degradation
//!
//! Tests that manipulate CMTV_CONFIG are marked with #[serial] so they do not
//! race each other.

use cmtv_common::config::{resolve_config_path, ConfigLocation, SourceKind, TomlConfig, CONFIG_ENV_VAR};
use cmtv_common::Error;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
#[serial]
fn test_env_var_used_when_no_cli_arg() {
    env::set_var(CONFIG_ENV_VAR, "/srv/cmtv/config.toml");

    let location = resolve_config_path(None);

    env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(location, ConfigLocation::Explicit(PathBuf::from("/srv/cmtv/config.toml")));
}

#[test]
#[serial]
fn test_cli_arg_beats_env_var() {
    env::set_var(CONFIG_ENV_VAR, "/srv/cmtv/config.toml");

    let location = resolve_config_path(Some(std::path::Path::new("./local.toml")));

    env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(location, ConfigLocation::Explicit(PathBuf::from("./local.toml")));
}

#[test]
#[serial]
fn test_blank_env_var_is_ignored() {
    env::set_var(CONFIG_ENV_VAR, "   ");

    let location = resolve_config_path(None);

    env::remove_var(CONFIG_ENV_VAR);
    assert!(!matches!(location, ConfigLocation::Explicit(_)));
}

#[test]
#[serial]
fn test_explicit_missing_file_is_an_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let result = TomlConfig::load_resolved(Some(&missing));

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_explicit_file_is_loaded() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
playlist_file = "/var/lib/cmtv/playlist.json"

[schedule]
hour = 5
minute = 30
sources = ["youtube"]

[sources]
manual_video_ids = ["JfXo8VYTfT4", "xnLwAiY7_PE"]
manual_playlist_id = "PLF-qYr2hPBv1_WLmZkV5EWtalulirESrz"
"#,
    )
    .unwrap();

    let config = TomlConfig::load_resolved(Some(&path)).unwrap();

    assert_eq!(config.playlist_file, PathBuf::from("/var/lib/cmtv/playlist.json"));
    assert_eq!((config.schedule.hour, config.schedule.minute), (5, 30));
    assert_eq!(config.schedule.sources, vec![SourceKind::Youtube]);
    assert_eq!(config.sources.manual_video_ids.len(), 2);
    assert_eq!(
        config.sources.manual_playlist_id.as_deref(),
        Some("PLF-qYr2hPBv1_WLmZkV5EWtalulirESrz")
    );
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is = = not toml").unwrap();

    assert!(matches!(TomlConfig::load_resolved(Some(&path)), Err(Error::Toml(_))));
}
