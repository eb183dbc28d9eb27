use super::data::{Appearance, Config};
use super::defaults::{DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT_SECS};
use super::io::ConfigError;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
    assert_eq!(config.endpoint_or_default(), DEFAULT_ENDPOINT);
    assert!(config.syntax_enabled());
    assert_eq!(config.appearance_or_default(), Appearance::Dark);
    assert_eq!(
        config.request_timeout(),
        Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
    );
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let config = Config {
        endpoint: Some("https://mint.example".to_string()),
        data_dir: Some(PathBuf::from("/tmp/mint-data")),
        syntax: Some(false),
        appearance: Some(Appearance::Light),
        request_timeout_secs: Some(5),
    };
    config
        .save_to_path(&config_path)
        .expect("Failed to save config");

    let loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded, config);
    assert!(!loaded.syntax_enabled());
    assert_eq!(loaded.request_timeout(), Duration::from_secs(5));

    let mut loaded = loaded;
    loaded.endpoint = None;
    loaded.save_to_path(&config_path).expect("Failed to save config");
    let reloaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(reloaded.endpoint_or_default(), DEFAULT_ENDPOINT);
}

#[test]
fn test_parse_error_reports_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "syntax = \"maybe\"\n").unwrap();

    let err = Config::load_from_path(&config_path).expect_err("should fail to parse");
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("Failed to parse config"));
}

#[test]
fn test_appearance_parsing() {
    let config: Config = toml::from_str("appearance = \"light\"\n").unwrap();
    assert_eq!(config.appearance, Some(Appearance::Light));
    assert_eq!(Appearance::parse(" DARK "), Some(Appearance::Dark));
    assert_eq!(Appearance::parse("sepia"), None);
}

#[test]
fn test_blank_endpoint_and_zero_timeout_fall_back() {
    let config = Config {
        endpoint: Some("  ".into()),
        request_timeout_secs: Some(0),
        ..Default::default()
    };
    assert_eq!(config.endpoint_or_default(), DEFAULT_ENDPOINT);
    assert_eq!(
        config.request_timeout(),
        Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
    );
}

#[test]
fn test_set_and_unset_values() {
    let mut config = Config::default();
    config.set_value("endpoint", " http://mint:9000 ").unwrap();
    config.set_value("syntax", "off").unwrap();
    config.set_value("appearance", "Light").unwrap();
    config.set_value("request-timeout", "15").unwrap();
    config.set_value("data-dir", "/srv/mint").unwrap();

    assert_eq!(config.endpoint_or_default(), "http://mint:9000");
    assert!(!config.syntax_enabled());
    assert_eq!(config.appearance_or_default(), Appearance::Light);
    assert_eq!(config.request_timeout(), Duration::from_secs(15));
    assert_eq!(config.data_dir_or_default(), PathBuf::from("/srv/mint"));

    for key in super::CONFIG_KEYS {
        config.unset_value(key).unwrap();
    }
    assert_eq!(config, Config::default());
}

#[test]
fn test_set_rejects_bad_input() {
    let mut config = Config::default();
    assert!(config.set_value("syntax", "maybe").is_err());
    assert!(config.set_value("appearance", "sepia").is_err());
    assert!(config.set_value("request-timeout", "0").is_err());
    assert!(config.set_value("endpoint", "  ").is_err());
    let err = config.set_value("model", "x").unwrap_err();
    assert!(err.contains("Unknown config key: model"));
    assert!(config.unset_value("model").is_err());
    assert_eq!(config, Config::default());
}
