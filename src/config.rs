//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the backend base URL and the last used username.
//!
//! Configuration is stored at `~/.config/cardbinder/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/session directory paths
const APP_NAME: &str = "cardbinder";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend to talk to when nothing else is configured
const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Environment variable overriding the backend base URL
const API_URL_ENV: &str = "CARDBINDER_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Backend base URL: environment variable, then config file, then the
    /// local development default.
    pub fn base_url(&self) -> String {
        std::env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the persisted session record
    pub fn session_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_falls_back_to_default() {
        let config = Config::default();
        // Only meaningful when the env override is not set in the test
        // environment
        if std::env::var(API_URL_ENV).is_err() {
            assert_eq!(config.base_url(), DEFAULT_API_BASE_URL);
        }
    }

    #[test]
    fn test_base_url_prefers_config_value() {
        if std::env::var(API_URL_ENV).is_err() {
            let config = Config {
                api_base_url: Some("https://cards.example.com".to_string()),
                last_username: None,
            };
            assert_eq!(config.base_url(), "https://cards.example.com");
        }
    }
}
