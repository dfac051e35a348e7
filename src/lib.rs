//! downtrack - Reddit downvoted-comment tracker
//!
//! This crate implements a small polling bot: a list of tracked usernames in
//! SQLite, a scanner that fetches each user's newest comments through the
//! Reddit API, and a poll loop that records downvoted (or all visible)
//! comments back into the store.

pub mod bot;
pub mod database;
pub mod logging;
pub mod reddit;
pub mod scanner;

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Re-export commonly used types
pub use bot::Bot;
pub use database::Database;
pub use reddit::RedditClient;
pub use scanner::{FilterMode, Scanner};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Application configuration, loaded from a TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub client: ClientConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
}

/// Reddit API credentials
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub user_agent: String,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub mode: FilterMode,
    /// Sleep between checks while the tracked set is empty
    pub idle_interval_secs: u64,
    /// Sleep between full passes over the tracked set
    pub cycle_interval_secs: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            mode: FilterMode::Downvoted,
            idle_interval_secs: 10,
            cycle_interval_secs: 60,
        }
    }
}

impl Config {
    /// Load and parse a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parses_with_scanner_defaults() {
        let raw = r#"
            [client]
            user_agent = "downtrack test"
            client_id = "abc"
            client_secret = "def"

            [database]
            path = "./downtrack.db"
        "#;

        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.client.client_id, "abc");
        assert_eq!(config.database.path, "./downtrack.db");
        assert_eq!(config.scanner.mode, FilterMode::Downvoted);
        assert_eq!(config.scanner.idle_interval_secs, 10);
        assert_eq!(config.scanner.cycle_interval_secs, 60);
    }

    #[test]
    fn config_accepts_all_mode() {
        let raw = r#"
            [client]
            user_agent = "downtrack test"
            client_id = "abc"
            client_secret = "def"

            [database]
            path = ":memory:"

            [scanner]
            mode = "all"
            cycle_interval_secs = 5
        "#;

        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.scanner.mode, FilterMode::All);
        assert_eq!(config.scanner.cycle_interval_secs, 5);
        assert_eq!(config.scanner.idle_interval_secs, 10);
    }

    #[test]
    fn missing_client_section_is_an_error() {
        let raw = r#"
            [database]
            path = ":memory:"
        "#;
        assert!(toml::from_str::<Config>(raw).is_err());
    }
}
