//! Image pipeline
//!
//! Finishes an assembled [`Mosaic`] in a fixed order:
//!
//! ```text
//! overlay -> crop -> resize -> watermark -> encode
//! ```
//!
//! Overlays are drawn in geographic space, so they precede crop and resize.
//! The watermark is placed in pixel space on the final canvas. Every stage
//! is optional and each one consumes a mosaic and returns a new one.

mod crop;
mod output;
mod resize;
mod watermark;

pub use crop::crop_to_bbox;
pub use output::{encode, OutputFormat, RenderedImage, JPEG_QUALITY};
pub use resize::{resize, ResizeMode};
pub use watermark::{apply_watermark, WatermarkStyle};

use geojson::Feature;
use thiserror::Error;
use tracing::debug;

use crate::coord::Bbox;
use crate::mosaic::Mosaic;
use crate::overlay::{OverlayError, OverlayRenderer};

/// Errors that can occur in the image pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Crop box {requested} does not overlap mosaic extent {extent}")]
    InvalidCrop { requested: Bbox, extent: Bbox },

    #[error("Invalid image size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("Overlay failed: {0}")]
    Overlay(#[from] OverlayError),

    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Which optional stages to run for one image.
#[derive(Debug, Clone, Default)]
pub struct PipelineRequest<'a> {
    pub features: &'a [Feature],
    pub crop: Option<Bbox>,
    pub resize: Option<ResizeMode>,
    pub watermark: Option<String>,
}

/// Runs the finishing stages with a fixed renderer and watermark style.
#[derive(Debug, Clone, Default)]
pub struct ImagePipeline {
    renderer: OverlayRenderer,
    watermark_style: WatermarkStyle,
}

impl ImagePipeline {
    pub fn new(renderer: OverlayRenderer, watermark_style: WatermarkStyle) -> Self {
        Self {
            renderer,
            watermark_style,
        }
    }

    pub fn renderer(&self) -> &OverlayRenderer {
        &self.renderer
    }

    pub fn watermark_style(&self) -> &WatermarkStyle {
        &self.watermark_style
    }

    /// Applies the requested stages to `mosaic`.
    pub fn run(&self, mosaic: Mosaic, request: &PipelineRequest<'_>) -> Result<Mosaic, PipelineError> {
        let mut mosaic = self.renderer.render(mosaic, request.features)?;

        if let Some(bbox) = &request.crop {
            mosaic = crop_to_bbox(mosaic, bbox)?;
        }
        if let Some(mode) = request.resize {
            mosaic = resize(mosaic, mode)?;
        }
        if let Some(text) = request.watermark.as_deref().filter(|t| !t.trim().is_empty()) {
            mosaic = apply_watermark(mosaic, text, &self.watermark_style);
        }

        debug!(
            width = mosaic.width(),
            height = mosaic.height(),
            extent = %mosaic.extent(),
            "Pipeline finished"
        );
        Ok(mosaic)
    }

    /// Runs the stages and encodes the result.
    pub fn render(
        &self,
        mosaic: Mosaic,
        request: &PipelineRequest<'_>,
        format: OutputFormat,
    ) -> Result<RenderedImage, PipelineError> {
        let mosaic = self.run(mosaic, request)?;
        encode(mosaic.image(), format)
    }
}
