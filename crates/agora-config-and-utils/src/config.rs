//! Configuration management for the client.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use url::Url;

/// Default REST API base URL (can be overridden at compile time via AGORA_API_URL env var).
pub const DEFAULT_API_URL: &str = match option_env!("AGORA_API_URL") {
    Some(url) => url,
    None => "https://api.agora.social",
};

/// Default Socket.IO server URL (can be overridden at compile time via AGORA_REALTIME_URL env var).
pub const DEFAULT_REALTIME_URL: &str = match option_env!("AGORA_REALTIME_URL") {
    Some(url) => url,
    None => "https://realtime.agora.social",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_HISTORY_PAGE_SIZE: u32 = 50;

/// Main client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// REST API base URL, without the `/v1` suffix.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Socket.IO server URL (http(s) or ws(s)).
    #[serde(default = "default_realtime_url")]
    pub realtime_url: String,
    /// Per-request timeout for REST calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Messages fetched per chat history page.
    #[serde(default = "default_history_page_size")]
    pub history_page_size: u32,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_realtime_url() -> String {
    DEFAULT_REALTIME_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_history_page_size() -> u32 {
    DEFAULT_HISTORY_PAGE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api_url: default_api_url(),
            realtime_url: default_realtime_url(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            history_page_size: DEFAULT_HISTORY_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from the config file, falling back to defaults,
    /// then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            debug!(path = %config_path.display(), "No config file, using defaults");
            Self::default()
        };

        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    fn load_from_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply `AGORA_*` overrides from a variable lookup.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(log_level) = non_empty("AGORA_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Some(api_url) = non_empty("AGORA_API_URL") {
            self.api_url = api_url;
        }
        if let Some(realtime_url) = non_empty("AGORA_REALTIME_URL") {
            self.realtime_url = realtime_url;
        }
    }

    /// Reject configurations the clients cannot start with.
    pub fn validate(&self) -> CoreResult<()> {
        self.api_url()?;
        self.realtime_url()?;
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.history_page_size == 0 {
            return Err(CoreError::Config(
                "history_page_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the API URL as a parsed URL.
    pub fn api_url(&self) -> CoreResult<Url> {
        Url::parse(&self.api_url).map_err(CoreError::from)
    }

    /// Get the realtime URL as a parsed URL.
    pub fn realtime_url(&self) -> CoreResult<Url> {
        Url::parse(&self.realtime_url).map_err(CoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.realtime_url, DEFAULT_REALTIME_URL);
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.history_page_size, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_from_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");

        std::fs::write(&config_path, r#"{ "log_level": "debug" }"#).unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.history_page_size, 50);
    }

    #[test]
    fn test_config_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let mut config = Config::default();
        config.log_level = "trace".to_string();
        config.api_url = "http://localhost:8080".to_string();
        config.save(&paths).unwrap();

        let loaded = Config::load_from_file(&paths.config_file()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_nonexistent_uses_defaults() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let config = Config::load(&paths).unwrap();
        assert_eq!(config.request_timeout_secs, 15);
    }

    #[test]
    fn test_overrides_ignore_blank_values() {
        let vars: HashMap<&str, &str> = [
            ("AGORA_LOG_LEVEL", "warn"),
            ("AGORA_API_URL", "  "),
            ("AGORA_REALTIME_URL", "ws://127.0.0.1:3000"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.log_level, "warn");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.realtime_url, "ws://127.0.0.1:3000");
    }

    #[test]
    fn test_config_invalid_url() {
        let mut config = Config::default();
        config.api_url = "not a valid url".to_string();

        assert!(config.api_url().is_err());
        assert!(matches!(config.validate(), Err(CoreError::InvalidUrl(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.request_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }
}
