//! geobot - map images from web map tiles
//!
//! Turns a geographic bounding box into a single map image: it picks a zoom
//! level that covers the box with about the requested number of tiles,
//! downloads those tiles concurrently, stitches them into one raster, draws
//! GeoJSON features on top and finishes the image with crop, resize,
//! watermark and encode stages.
//!
//! The main entry point is [`service::MapService`]. The lower layers
//! ([`coord`], [`tileset`], [`mosaic`], [`overlay`], [`pipeline`]) are usable
//! on their own.

pub mod config;
pub mod coord;
pub mod font;
pub mod logging;
pub mod mosaic;
pub mod orchestrator;
pub mod overlay;
pub mod pipeline;
pub mod provider;
pub mod service;
pub mod tileset;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
