use std::fs;
use std::time::Duration;

use tempfile::TempDir;
use yamlset::config::Config;

#[test]
fn test_config_defaults() {
    let config = Config::default();

    assert_eq!(config.timeout_secs, 30);
    assert_eq!(config.timeout(), Duration::from_secs(30));
    assert!(config.author_username.is_none());
    assert!(config.commit_message.is_none());
    assert!(!config.warn_missing);
    assert!(!config.show_diff);
}

#[test]
fn test_default_commit_message_names_file() {
    let config = Config::default();
    assert_eq!(
        config.commit_message_for("charts/web/values.yaml"),
        "Update charts/web/values.yaml"
    );
}

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "timeout_secs = 5\nauthor_username = \"deploy-bot\"\ncommit_message = \"Bump image\"\nwarn_missing = true\nshow_diff = true\n",
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();

    assert_eq!(config.timeout_secs, 5);
    assert_eq!(config.author_username.as_deref(), Some("deploy-bot"));
    assert_eq!(config.commit_message_for("values.yaml"), "Bump image");
    assert!(config.warn_missing);
    assert!(config.show_diff);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "warn_missing = true\n").unwrap();

    let config = Config::load_from(&path).unwrap();

    assert!(config.warn_missing);
    assert_eq!(config.timeout_secs, 30);
    assert!(config.author_username.is_none());
}

#[test]
fn test_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    let err = Config::load_from(&dir.path().join("nope.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_malformed_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "timeout_secs = \"soon\"\n").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_config_serializes_to_toml() {
    let config = Config {
        timeout_secs: 12,
        author_username: Some("octocat".to_string()),
        ..Default::default()
    };
    let text = toml::to_string(&config).unwrap();
    let back: Config = toml::from_str(&text).unwrap();
    assert_eq!(back, config);
}
