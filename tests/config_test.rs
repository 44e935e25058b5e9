//! Integration tests for configuration loading

use std::io::Write;

use mta_alerts::{ConfigError, FeedConfig, FeedSource};
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();

    let config_content = r#"
endpoint = "http://localhost:8080/alerts?type=json"
api_key = "test-key"
agency_id = "MTASBWY"
timezone = "America/New_York"
lines = ["N", "Q", "R", "W"]
timeout_secs = 10
"#;

    temp_file.write_all(config_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = FeedConfig::from_file(temp_file.path()).unwrap();

    assert_eq!(config.endpoint, "http://localhost:8080/alerts?type=json");
    assert_eq!(config.api_key.as_deref(), Some("test-key"));
    assert_eq!(config.tz().unwrap(), chrono_tz::America::New_York);

    let feed = FeedSource::new(config).unwrap();
    let lines: Vec<&str> = feed.valid_lines().iter().map(String::as_str).collect();
    assert_eq!(lines, vec!["N", "Q", "R", "W"]);
}

#[test]
fn test_missing_file() {
    let result = FeedConfig::from_file("/nonexistent/mta-alerts.toml");
    assert!(matches!(result, Err(ConfigError::Read { .. })));
}

#[test]
fn test_invalid_toml() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"lines = \"N\"").unwrap();
    temp_file.flush().unwrap();

    let result = FeedConfig::from_file(temp_file.path());
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}
