//! Crop a mosaic to a geographic bounding box.

use image::imageops;
use tracing::debug;

use super::PipelineError;
use crate::coord::{Bbox, LonLat};
use crate::mosaic::Mosaic;

/// Crops `mosaic` to `bbox`.
///
/// The box is first clipped to the mosaic's extent. Its corners are mapped
/// to pixels with the pre-crop ratio and rounded; the returned mosaic
/// carries the clipped box as its new extent.
pub fn crop_to_bbox(mosaic: Mosaic, bbox: &Bbox) -> Result<Mosaic, PipelineError> {
    let extent = *mosaic.extent();
    let invalid = || PipelineError::InvalidCrop {
        requested: *bbox,
        extent,
    };

    if bbox.straddles_antimeridian() {
        return Err(invalid());
    }

    let west = bbox.west.max(extent.west);
    let east = bbox.east.min(extent.east);
    let north = bbox.north.max(bbox.south).min(extent.north);
    let south = bbox.north.min(bbox.south).max(extent.south);
    if !(west < east && south < north) {
        return Err(invalid());
    }

    let (width, height) = (mosaic.width() as f64, mosaic.height() as f64);
    let (left, top) = mosaic.to_pixel(LonLat::new(west, north));
    let (right, bottom) = mosaic.to_pixel(LonLat::new(east, south));

    let left = left.round().clamp(0.0, width) as u32;
    let right = right.round().clamp(0.0, width) as u32;
    let top = top.round().clamp(0.0, height) as u32;
    let bottom = bottom.round().clamp(0.0, height) as u32;
    if right <= left || bottom <= top {
        return Err(invalid());
    }

    let image = imageops::crop_imm(mosaic.image(), left, top, right - left, bottom - top).to_image();
    debug!(
        left,
        top,
        width = image.width(),
        height = image.height(),
        "Cropped mosaic"
    );

    Ok(Mosaic::new(image, Bbox::new(west, north, east, south)))
}
