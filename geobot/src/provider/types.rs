//! Provider types and traits

use std::fmt;
use std::future::Future;

use crate::coord::Tile;

/// Errors reported by a tile fetch.
///
/// The core treats any of these as a failed tile and substitutes a
/// placeholder; see [`crate::orchestrator`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Transport-level failure (connect, timeout, body read)
    HttpError(String),
    /// Server answered with a non-success status
    HttpStatus { status: u16, url: String },
    /// Response body was not usable
    InvalidResponse(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::HttpStatus { status, url } => {
                write!(f, "HTTP {} from {}", status, url)
            }
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Everything a tile server needs to address one tile image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRequest {
    pub tile: Tile,
    /// Image extension without the dot, e.g. "png"
    pub extension: String,
    /// Request the high-DPI variant of the tile
    pub retina: bool,
}

impl TileRequest {
    pub fn new(tile: Tile, extension: impl Into<String>, retina: bool) -> Self {
        let extension = extension.into();
        Self {
            tile,
            extension: extension.trim_start_matches('.').to_string(),
            retina,
        }
    }
}

/// Async tile fetch capability.
///
/// Implementations own transport concerns (connection pooling, timeouts,
/// credentials). Each call is independent and keyed by the tile, so callers
/// may run many of them concurrently.
pub trait AsyncTileProvider: Send + Sync {
    /// Fetches the raw encoded image bytes for one tile.
    fn fetch_tile(
        &self,
        request: &TileRequest,
    ) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;

    /// Returns the provider's name for logging and identification.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_request_strips_leading_dot() {
        let request = TileRequest::new(Tile::new(3, 1, 2), ".png", false);
        assert_eq!(request.extension, "png");
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::HttpStatus {
            status: 404,
            url: "https://tiles.example.com/1/0/0.png".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 404 from https://tiles.example.com/1/0/0.png"
        );
    }
}
