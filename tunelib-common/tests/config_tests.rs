//! Integration tests for configuration loading
//!
//! Tests that change XDG_CONFIG_HOME are marked #[serial] so they do not race
//! with each other on the process environment.

use serial_test::serial;
use std::fs;
use std::time::Duration;
use tunelib_common::config::{
    default_config_path, load_toml_config, ConfigOverrides, ServiceConfig,
};
use tunelib_common::Error;

#[test]
fn test_missing_file_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_toml_config(&dir.path().join("absent.toml")).unwrap();
    assert!(result.is_none());
}

#[test]
fn test_full_file_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
port = 8080
database_url = "sqlite://./lib.db"
db_max_connections = 4
allowed_origins = ["http://a.test", "http://b.test"]
ai_api_url = "https://ai.test"
ai_timeout_secs = 5

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let file = load_toml_config(&path).unwrap();
    let config = ServiceConfig::resolve(ConfigOverrides::default(), file).unwrap();

    assert_eq!(config.port, 8080);
    assert_eq!(config.database_url, "sqlite://./lib.db");
    assert_eq!(config.db_max_connections, 4);
    assert_eq!(config.allowed_origins, vec!["http://a.test", "http://b.test"]);
    assert_eq!(config.ai_api_url, "https://ai.test");
    assert_eq!(config.ai_timeout, Duration::from_secs(5));
    assert_eq!(config.log_level, "debug");
}

#[test]
fn test_comma_separated_origins_in_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "allowed_origins = \"http://a.test, http://b.test\"\n").unwrap();

    let file = load_toml_config(&path).unwrap();
    let config = ServiceConfig::resolve(ConfigOverrides::default(), file).unwrap();
    assert_eq!(config.allowed_origins, vec!["http://a.test", "http://b.test"]);
}

#[test]
fn test_cli_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "port = 8080\nallowed_origins = \"http://file.test\"\n").unwrap();

    let overrides = ConfigOverrides {
        port: Some(9090),
        allowed_origins: Some("http://cli.test".to_string()),
        log_level: Some("warn".to_string()),
        ..Default::default()
    };
    let config = ServiceConfig::resolve(overrides, load_toml_config(&path).unwrap()).unwrap();

    assert_eq!(config.port, 9090);
    assert_eq!(config.allowed_origins, vec!["http://cli.test"]);
    assert_eq!(config.log_level, "warn");
}

#[test]
fn test_malformed_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "port = \"not a number\"\n").unwrap();

    let result = load_toml_config(&path);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_default_config_path_follows_xdg_config_home() {
    let dir = tempfile::tempdir().unwrap();
    let previous = std::env::var_os("XDG_CONFIG_HOME");
    std::env::set_var("XDG_CONFIG_HOME", dir.path());

    let path = default_config_path();

    match previous {
        Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }

    assert_eq!(path, Some(dir.path().join("tunelib").join("config.toml")));
}
