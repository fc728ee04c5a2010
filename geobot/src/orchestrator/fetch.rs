//! Concurrent tile fetching with placeholder substitution.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use image::RgbaImage;
use tracing::{debug, warn};

use super::types::{FetchError, FetchOptions, FetchedTiles};
use crate::coord::Tile;
use crate::mosaic::{placeholder_tile, TileGrid};
use crate::provider::{AsyncTileProvider, ProviderError, TileRequest};
use crate::tileset::TileSet;

/// Default number of in-flight tile requests.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Upper bound for configurable concurrency.
pub const MAX_CONCURRENCY: usize = 64;

/// Fetches and decodes every tile of a tile set.
///
/// Requests run concurrently, bounded by the configured limit. A tile that
/// fails to fetch or decode is replaced by a grey placeholder sized like the
/// successful tiles, so one bad tile never sinks the whole image. Only when
/// every tile fails does the fetch fail.
pub struct TileOrchestrator<P: AsyncTileProvider> {
    provider: Arc<P>,
    concurrency: usize,
}

impl<P: AsyncTileProvider> TileOrchestrator<P> {
    pub fn new(provider: P) -> Self {
        Self::with_shared_provider(Arc::new(provider))
    }

    pub fn with_shared_provider(provider: Arc<P>) -> Self {
        Self {
            provider,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Sets the in-flight request limit, clamped to `1..=MAX_CONCURRENCY`.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetches every tile in `tileset`.
    pub async fn fetch(
        &self,
        tileset: &TileSet,
        options: &FetchOptions,
    ) -> Result<FetchedTiles, FetchError> {
        let started = Instant::now();
        let provider = &self.provider;

        let mut results: Vec<(Tile, Result<RgbaImage, ProviderError>)> =
            stream::iter(tileset.iter().copied())
                .map(|tile| {
                    let request = TileRequest::new(tile, options.extension.as_str(), options.retina);
                    async move {
                        let result = match provider.fetch_tile(&request).await {
                            Ok(bytes) => decode_tile(&bytes),
                            Err(e) => Err(e),
                        };
                        (tile, result)
                    }
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        // Completion order is arbitrary; keep placeholder sizing deterministic.
        results.sort_by_key(|(tile, _)| *tile);

        let attempted = results.len();
        let mut grid = TileGrid::new();
        let mut failed = Vec::new();
        let mut last_error = None;
        let mut tile_size = None;

        for (tile, result) in results {
            match result {
                Ok(image) => {
                    tile_size.get_or_insert(image.dimensions());
                    grid.insert(tile.x, tile.y, image);
                }
                Err(e) => {
                    warn!(
                        tile = %tile,
                        provider = self.provider.name(),
                        error = %e,
                        "Tile fetch failed, using placeholder"
                    );
                    failed.push(tile);
                    last_error = Some(e);
                }
            }
        }

        let Some((width, height)) = tile_size else {
            if let Some(last_error) = last_error {
                return Err(FetchError::AllTilesFailed {
                    attempted,
                    last_error,
                });
            }
            return Ok(FetchedTiles { grid, failed });
        };

        for tile in &failed {
            grid.insert(tile.x, tile.y, placeholder_tile(width, height));
        }

        debug!(
            zoom = tileset.zoom(),
            tiles = attempted,
            failed = failed.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Tile set fetched"
        );

        Ok(FetchedTiles { grid, failed })
    }
}

fn decode_tile(bytes: &[u8]) -> Result<RgbaImage, ProviderError> {
    image::load_from_memory(bytes)
        .map(|image| image.to_rgba8())
        .map_err(|e| ProviderError::InvalidResponse(format!("Undecodable tile image: {}", e)))
}
