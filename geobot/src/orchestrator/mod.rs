//! Tile download orchestration
//!
//! Fetches every tile of a [`TileSet`](crate::tileset::TileSet) through an
//! injected provider and hands back decoded images ready for assembly.

mod fetch;
mod types;

pub use fetch::{TileOrchestrator, DEFAULT_CONCURRENCY, MAX_CONCURRENCY};
pub use types::{FetchError, FetchOptions, FetchedTiles};
