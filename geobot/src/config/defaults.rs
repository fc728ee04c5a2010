//! Default configuration values.

use crate::orchestrator::{DEFAULT_CONCURRENCY, MAX_CONCURRENCY};

pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org";
pub const DEFAULT_TOKEN_PARAM: &str = "access_token";
pub const DEFAULT_EXTENSION: &str = "png";

pub const DEFAULT_VISIBLE_TILES: usize = 4;
pub const DEFAULT_OUTPUT_WIDTH: u32 = 600;
pub const DEFAULT_OUTPUT_HEIGHT: u32 = 600;

pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = crate::provider::DEFAULT_TIMEOUT_SECS;
pub const DEFAULT_DOWNLOAD_CONCURRENCY: usize = DEFAULT_CONCURRENCY;

/// Environment variable overriding `[tile_server] url`.
pub const ENV_TILE_URL: &str = "GEOBOT_TILE_URL";
/// Environment variable overriding `[tile_server] access_token`.
pub const ENV_ACCESS_TOKEN: &str = "GEOBOT_ACCESS_TOKEN";

/// Clamps a requested download concurrency to `1..=MAX_CONCURRENCY`.
pub fn clamp_concurrency(requested: usize) -> usize {
    requested.clamp(1, MAX_CONCURRENCY)
}
