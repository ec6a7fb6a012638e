//! Unit tests for configuration loading and sessions folder resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate MOODTUNE_TEST_SESSIONS_DIR are marked with #[serial].

use moodtune_common::config::{
    load_toml_config, resolve_sessions_dir, TomlConfig, DEFAULT_API_BASE, DEFAULT_SESSIONS_DIR,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};

const ENV_VAR: &str = "MOODTUNE_TEST_SESSIONS_DIR";

#[test]
fn test_missing_config_file_yields_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let config = load_toml_config(&temp.path().join("absent.toml")).unwrap();

    assert!(config.port.is_none());
    assert!(config.session_ttl_secs.is_none());
    assert_eq!(config.upstream.api_base, DEFAULT_API_BASE);
    assert_eq!(config.upstream.chat_model, "MiniMax-Text-01");
    assert_eq!(config.upstream.music_model, "music-2.0");
    assert_eq!(config.upstream.max_tokens, 4096);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_partial_config_file_fills_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
port = 6000
session_ttl_secs = 3600

[upstream]
api_base = "http://127.0.0.1:9999"
"#,
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.port, Some(6000));
    assert_eq!(config.session_ttl_secs, Some(3600));
    assert_eq!(config.upstream.api_base, "http://127.0.0.1:9999");
    assert_eq!(config.upstream.timeout_secs, 300);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_malformed_config_file_is_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "port = \"not a number\"").unwrap();

    let err = load_toml_config(&path).unwrap_err();
    assert!(err.to_string().contains("Configuration error"));
}

#[test]
#[serial]
fn test_cli_argument_wins() {
    env::set_var(ENV_VAR, "/from/env");
    let toml = TomlConfig {
        sessions_dir: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    let resolved = resolve_sessions_dir(Some(Path::new("/from/cli")), ENV_VAR, &toml);
    assert_eq!(resolved, PathBuf::from("/from/cli"));

    env::remove_var(ENV_VAR);
}

#[test]
#[serial]
fn test_env_beats_toml() {
    env::set_var(ENV_VAR, "/from/env");
    let toml = TomlConfig {
        sessions_dir: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    let resolved = resolve_sessions_dir(None, ENV_VAR, &toml);
    assert_eq!(resolved, PathBuf::from("/from/env"));

    env::remove_var(ENV_VAR);
}

#[test]
#[serial]
fn test_toml_then_default() {
    env::remove_var(ENV_VAR);
    let toml = TomlConfig {
        sessions_dir: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };
    assert_eq!(
        resolve_sessions_dir(None, ENV_VAR, &toml),
        PathBuf::from("/from/toml")
    );

    assert_eq!(
        resolve_sessions_dir(None, ENV_VAR, &TomlConfig::default()),
        PathBuf::from(DEFAULT_SESSIONS_DIR)
    );
}
