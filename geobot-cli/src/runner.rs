//! CLI runner for common setup.
//!
//! Loads configuration and initializes logging for commands that talk to a
//! tile server.

use std::path::Path;

use geobot::config::ConfigFile;
use geobot::logging::{default_log_dir, default_log_file, init_logging, LoggingGuard};
use tracing::info;

use crate::error::CliError;

/// Runner that manages CLI lifecycle.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
}

impl CliRunner {
    /// Loads `config_path` (or the default config file), applies environment
    /// overrides and starts logging.
    pub fn new(config_path: Option<&Path>) -> Result<Self, CliError> {
        let config = match config_path {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        }
        .with_env_overrides();

        let logging_guard = init_logging(default_log_dir(), default_log_file())
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("geobot v{}", geobot::VERSION);
        info!(
            command,
            tile_server = %self.config.tile_server.url,
            "geobot CLI command started"
        );
    }
}
