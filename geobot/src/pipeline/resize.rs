//! Exact and aspect-preserving resize.

use image::imageops::{self, FilterType};

use super::PipelineError;
use crate::mosaic::Mosaic;

/// How to reach a target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    /// Stretch to exactly `width` x `height`
    Exact { width: u32, height: u32 },
    /// Scale uniformly to fit inside `width` x `height`
    Harmonious { width: u32, height: u32 },
}

impl ResizeMode {
    /// Output dimensions for a source of `width` x `height`.
    pub fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
        match *self {
            ResizeMode::Exact { width, height } => (width, height),
            ResizeMode::Harmonious {
                width: target_w,
                height: target_h,
            } => {
                let scale = (target_w as f64 / width as f64).min(target_h as f64 / height as f64);
                let w = (width as f64 * scale).round().max(1.0) as u32;
                let h = (height as f64 * scale).round().max(1.0) as u32;
                (w, h)
            }
        }
    }

    fn target(&self) -> (u32, u32) {
        match *self {
            ResizeMode::Exact { width, height } | ResizeMode::Harmonious { width, height } => {
                (width, height)
            }
        }
    }
}

/// Resizes the mosaic with a Lanczos filter. The extent is unchanged and
/// the ratio follows the new dimensions.
pub fn resize(mosaic: Mosaic, mode: ResizeMode) -> Result<Mosaic, PipelineError> {
    let (target_w, target_h) = mode.target();
    if target_w == 0 || target_h == 0 {
        return Err(PipelineError::InvalidSize {
            width: target_w,
            height: target_h,
        });
    }
    if mosaic.width() == 0 || mosaic.height() == 0 {
        return Err(PipelineError::InvalidSize {
            width: mosaic.width(),
            height: mosaic.height(),
        });
    }

    let (width, height) = mode.output_size(mosaic.width(), mosaic.height());
    if (width, height) == mosaic.image().dimensions() {
        return Ok(mosaic);
    }

    let image = imageops::resize(mosaic.image(), width, height, FilterType::Lanczos3);
    Ok(mosaic.with_image(image))
}
