//! CLI command implementations.
//!
//! - [`render`] - Render a bounding box to an image file
//! - [`tiles`] - List the tiles covering a bounding box
//! - [`quadkey`] - Decode a quadkey

pub mod quadkey;
pub mod render;
pub mod tiles;
