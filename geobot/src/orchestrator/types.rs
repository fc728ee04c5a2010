//! Orchestrator types and errors

use thiserror::Error;

use crate::coord::Tile;
use crate::mosaic::TileGrid;
use crate::provider::ProviderError;

/// Errors that can occur while fetching a tile set.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    /// No tile in the set could be fetched and decoded
    #[error("All {attempted} tile fetches failed (last error: {last_error})")]
    AllTilesFailed {
        attempted: usize,
        last_error: ProviderError,
    },
}

/// Per-request fetch parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Tile image extension, e.g. "png" or "jpg"
    pub extension: String,
    /// Request high-DPI tiles
    pub retina: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            extension: "png".to_string(),
            retina: false,
        }
    }
}

/// Outcome of fetching a tile set.
///
/// Every tile of the set is present in the grid; tiles listed in `failed`
/// hold placeholders.
#[derive(Debug, Clone)]
pub struct FetchedTiles {
    pub grid: TileGrid,
    pub failed: Vec<Tile>,
}

impl FetchedTiles {
    /// Number of tiles that were fetched successfully.
    pub fn success_count(&self) -> usize {
        self.grid.len() - self.failed.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tiles_failed_message() {
        let err = FetchError::AllTilesFailed {
            attempted: 4,
            last_error: ProviderError::HttpStatus {
                status: 503,
                url: "https://tiles.example/1/0/0.png".to_string(),
            },
        };
        let message = err.to_string();
        assert!(message.starts_with("All 4 tile fetches failed (last error: "));
        assert!(message.contains("503"));
    }
}
