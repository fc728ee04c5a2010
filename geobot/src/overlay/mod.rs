//! Vector overlay rendering
//!
//! Maps GeoJSON features onto the pixel grid of a [`Mosaic`](crate::mosaic::Mosaic)
//! and draws them with `tiny-skia`.
//!
//! Faults are contained per feature: a feature with a malformed geometry is
//! logged and skipped, malformed styling falls back to defaults, and geometry
//! types other than Point, LineString and Polygon are ignored. Only a
//! document that is not GeoJSON at all is an error.
//!
//! Polygon holes are not clipped. Every ring is filled with the same color
//! and drawn on top of the previous one, while the outline color is
//! complemented from ring to ring.
//!
//! Features are positioned linearly across the mosaic extent. A mosaic
//! assembled from a tile set that wraps the antimeridian (see
//! [`TileSet::has_column_gap`](crate::tileset::TileSet::has_column_gap))
//! is not linear in longitude, so features drawn on it land in the wrong
//! place.

mod canvas;
mod feature;
mod renderer;
mod style;

pub use feature::{features_from_value, parse_features, FeatureError, Shape};
pub use renderer::OverlayRenderer;
pub use style::{
    complement, parse_color, LineStyle, PointStyle, PolygonStyle, DEFAULT_COLOR,
    DEFAULT_LINE_WIDTH, DEFAULT_POINT_RADIUS,
};

use thiserror::Error;

/// Errors that fail an overlay as a whole.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OverlayError {
    #[error("Feature document is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Unsupported feature document: {0}")]
    InvalidDocument(String),

    #[error("Cannot draw on a {width}x{height} canvas")]
    EmptyCanvas { width: u32, height: u32 },
}
