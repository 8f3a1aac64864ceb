//! Configuration system for yamlset.
//!
//! Settings are read from `~/.config/yamlset/config.toml` (or a file given
//! with `--config`). Every field is optional; command-line flags override
//! whatever the file sets.
//!
//! # Example
//!
//! ```
//! use yamlset::config::Config;
//!
//! let config: Config = toml::from_str("timeout_secs = 10\nwarn_missing = true\n").unwrap();
//! assert_eq!(config.timeout_secs, 10);
//! assert!(config.warn_missing);
//! assert_eq!(config.commit_message_for("values.yaml"), "Update values.yaml");
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Configuration for the yamlset command.
///
/// # Fields
///
/// * `timeout_secs` - Upper bound on the whole fetch and commit run (default: 30)
/// * `author_username` - GitHub login recorded as commit author (default: none)
/// * `commit_message` - Commit message (default: "Update <file>")
/// * `warn_missing` - Warn about locations that do not resolve (default: false)
/// * `show_diff` - Print a diff instead of the file on dry runs (default: false)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Seconds to wait for GitHub before giving up
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// GitHub login of the commit author
    #[serde(default)]
    pub author_username: Option<String>,

    /// Commit message to use instead of the generated one
    #[serde(default)]
    pub commit_message: Option<String>,

    /// Log a warning for each location that is not found
    #[serde(default)]
    pub warn_missing: bool,

    /// Show a unified diff on dry runs
    #[serde(default)]
    pub show_diff: bool,
}

/// Returns the default timeout in seconds.
fn default_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            author_username: None,
            commit_message: None,
            warn_missing: false,
            show_diff: false,
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/yamlset/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("yamlset");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// Returns the default configuration if there is no such file.
    pub fn load() -> anyhow::Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads configuration from `path`, which must exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The configured commit message, or `Update <file>`.
    pub fn commit_message_for(&self, file: &str) -> String {
        self.commit_message
            .clone()
            .unwrap_or_else(|| format!("Update {}", file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_timeout() {
        let config = Config {
            timeout_secs: 5,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_configured_commit_message_wins() {
        let config = Config {
            commit_message: Some("Bump image".to_string()),
            ..Default::default()
        };
        assert_eq!(config.commit_message_for("values.yaml"), "Bump image");
    }
}
