//! Configuration file loading.
//!
//! Reads `~/.geobot/config.ini`. A missing file is not an error; every key
//! falls back to its default.

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::defaults::{ENV_ACCESS_TOKEN, ENV_TILE_URL};
use super::settings::ConfigFile;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigFile {
    /// Load configuration from the default path (~/.geobot/config.ini).
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Applies `GEOBOT_TILE_URL` and `GEOBOT_ACCESS_TOKEN` from the environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(ENV_TILE_URL).ok(),
            std::env::var(ENV_ACCESS_TOKEN).ok(),
        )
    }

    /// Replaces the server URL and token where a non-blank value is given.
    pub fn with_overrides(mut self, url: Option<String>, access_token: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.tile_server.url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(token) = access_token.filter(|t| !t.trim().is_empty()) {
            self.tile_server.access_token = Some(token.trim().to_string());
        }
        self
    }
}

/// Get the config directory path (~/.geobot).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".geobot")
}

/// Get the path to the config file (~/.geobot/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&temp.path().join("absent.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(
            &path,
            "[tile_server]\nurl = https://tiles.example.com\n\n[render]\nvisible_tiles = 6\n",
        )
        .unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.tile_server.url, "https://tiles.example.com");
        assert_eq!(config.render.visible_tiles, 6);
        assert_eq!(config.download.concurrency, DEFAULT_DOWNLOAD_CONCURRENCY);
    }

    #[test]
    fn test_invalid_file_value_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(&path, "[render]\nwidth = -1\n").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("render.width"));
    }

    #[test]
    fn test_overrides() {
        let config = ConfigFile::default().with_overrides(
            Some("https://override.example.com/".to_string()),
            Some("token-123".to_string()),
        );
        assert_eq!(config.tile_server.url, "https://override.example.com");
        assert_eq!(config.tile_server.access_token.as_deref(), Some("token-123"));
    }

    #[test]
    fn test_blank_overrides_are_ignored() {
        let config = ConfigFile::default().with_overrides(Some("  ".to_string()), None);
        assert_eq!(config.tile_server.url, DEFAULT_TILE_URL);
        assert!(config.tile_server.access_token.is_none());
    }

    #[test]
    fn test_config_paths() {
        assert!(config_directory().ends_with(".geobot"));
        assert!(config_file_path().ends_with(".geobot/config.ini"));
    }
}
