//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use geobot::config::{config_file_path, ConfigFileError};
use geobot::coord::CoordError;
use geobot::orchestrator::FetchError;
use geobot::service::ServiceError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be loaded
    Config(ConfigFileError),
    /// A command-line value was rejected
    InvalidArgument(CoordError),
    /// Failed to create the map service
    ServiceCreation(ServiceError),
    /// Rendering failed
    Render(ServiceError),
    /// Failed to read an input file
    FileRead { path: PathBuf, error: std::io::Error },
    /// Failed to write the output file
    FileWrite { path: PathBuf, error: std::io::Error },
    /// Failed to serialize output
    Json(serde_json::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Check the configuration file at {}", config_file_path().display());
            }
            CliError::Render(ServiceError::Fetch(FetchError::AllTilesFailed { .. })) => {
                eprintln!();
                eprintln!("No tile could be downloaded. Common issues:");
                eprintln!("  1. The tile server URL is wrong ([tile_server] url or GEOBOT_TILE_URL)");
                eprintln!("  2. The server needs an access token (GEOBOT_ACCESS_TOKEN)");
                eprintln!("  3. The tile extension does not match the server ([tile_server] extension)");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::InvalidArgument(e) => write!(f, "Invalid argument: {}", e),
            CliError::ServiceCreation(e) => write!(f, "Failed to create map service: {}", e),
            CliError::Render(e) => write!(f, "Failed to render map: {}", e),
            CliError::FileRead { path, error } => {
                write!(f, "Failed to read file '{}': {}", path.display(), error)
            }
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path.display(), error)
            }
            CliError::Json(e) => write!(f, "Failed to serialize output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::InvalidArgument(e) => Some(e),
            CliError::ServiceCreation(e) => Some(e),
            CliError::Render(e) => Some(e),
            CliError::FileRead { error, .. } => Some(error),
            CliError::FileWrite { error, .. } => Some(error),
            CliError::Json(e) => Some(e),
            CliError::LoggingInit(_) => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::InvalidArgument(e)
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        CliError::Render(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}
