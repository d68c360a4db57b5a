//! Unit tests for configuration loading and graceful degradation
//!
//! Tests cover:
//! - Compiled defaults
//! - Partial TOML files filling in defaults
//! - Validation failures
//! - Priority order for config file resolution (CLI > env > platform default)
//! - Missing config files falling back to defaults
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate TOY_CONFIG are marked with #[serial].

use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use toy_common::config::{
    resolve_config_path, TomlConfig, CONFIG_ENV_VAR, DEFAULT_APP_STORE_URL, DEFAULT_PUBLIC_URL,
    DEFAULT_LOADING_TIMEOUT_MS, DEFAULT_PORT, DEFAULT_SESSION_IDLE_TIMEOUT_SECS,
};
use toy_common::Error;

#[test]
fn test_compiled_defaults() {
    let config = TomlConfig::default();

    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.player.loading_timeout_ms, DEFAULT_LOADING_TIMEOUT_MS);
    assert_eq!(config.player.loading_timeout(), Duration::from_secs(3));
    assert!(config.player.autoplay);
    assert!(config.player.start_muted);
    assert_eq!(config.app_store_url, DEFAULT_APP_STORE_URL);
    assert_eq!(config.public_url, DEFAULT_PUBLIC_URL);
    assert!(config.catalog_path.is_none());
}

#[test]
fn test_partial_toml_uses_defaults_for_missing_keys() {
    let config = TomlConfig::from_toml_str(
        r#"
        port = 9000

        [player]
        loading_timeout_ms = 1500
        "#,
    )
    .unwrap();

    assert_eq!(config.port, 9000);
    assert_eq!(config.player.loading_timeout_ms, 1500);
    // Untouched keys keep their defaults
    assert!(config.player.autoplay);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_full_toml() {
    let config = TomlConfig::from_toml_str(
        r#"
        port = 8080
        catalog_path = "/srv/toy/catalog.toml"
        app_store_url = "https://example.com/app"
        public_url = "https://watch.example.com"

        [logging]
        level = "debug"

        [player]
        loading_timeout_ms = 500
        autoplay = false
        start_muted = false
        "#,
    )
    .unwrap();

    assert_eq!(config.catalog_path.as_deref(), Some(Path::new("/srv/toy/catalog.toml")));
    assert_eq!(config.app_store_url, "https://example.com/app");
    assert_eq!(config.public_url, "https://watch.example.com");
    assert_eq!(config.logging.level, "debug");
    assert!(!config.player.autoplay);
    assert!(!config.player.start_muted);
}

#[test]
fn test_zero_timeout_rejected() {
    let result = TomlConfig::from_toml_str(
        r#"
        [player]
        loading_timeout_ms = 0
        "#,
    );

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_session_lifetime_config() {
    let config = TomlConfig::default();
    assert_eq!(config.sessions.idle_timeout_secs, DEFAULT_SESSION_IDLE_TIMEOUT_SECS);
    assert_eq!(config.sessions.idle_timeout(), Duration::from_secs(1800));

    let config = TomlConfig::from_toml_str(
        r#"
        [sessions]
        idle_timeout_secs = 120
        sweep_interval_secs = 5
        "#,
    )
    .unwrap();
    assert_eq!(config.sessions.idle_timeout(), Duration::from_secs(120));
    assert_eq!(config.sessions.sweep_interval(), Duration::from_secs(5));

    let result = TomlConfig::from_toml_str(
        r#"
        [sessions]
        sweep_interval_secs = 0
        "#,
    );
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_malformed_toml_rejected() {
    let result = TomlConfig::from_toml_str("port = \"not a number\"");
    assert!(matches!(result, Err(Error::Toml(_))));
}

#[test]
#[serial]
fn test_cli_path_beats_env_var() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/toy-env-config.toml");

    let resolved = resolve_config_path(Some(Path::new("/tmp/toy-cli-config.toml")), CONFIG_ENV_VAR);
    assert_eq!(resolved.as_deref(), Some(Path::new("/tmp/toy-cli-config.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_cli_path() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/toy-env-config.toml");

    let resolved = resolve_config_path(None, CONFIG_ENV_VAR);
    assert_eq!(resolved.as_deref(), Some(Path::new("/tmp/toy-env-config.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_config_file_falls_back_to_defaults() {
    env::remove_var(CONFIG_ENV_VAR);

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist.toml");

    let config = TomlConfig::load_or_default(Some(&missing));
    assert_eq!(config, TomlConfig::default());
}

#[test]
#[serial]
fn test_invalid_config_file_falls_back_to_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[player]\nloading_timeout_ms = 0").unwrap();

    let config = TomlConfig::load_or_default(Some(file.path()));
    assert_eq!(config.player.loading_timeout_ms, DEFAULT_LOADING_TIMEOUT_MS);
}

#[test]
#[serial]
fn test_config_file_loaded_from_env_var() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 6001").unwrap();
    env::set_var(CONFIG_ENV_VAR, file.path());

    let config = TomlConfig::load_or_default(None);
    assert_eq!(config.port, 6001);

    env::remove_var(CONFIG_ENV_VAR);
}
