//! Mosaic assembly
//!
//! A [`Mosaic`] is a raster image paired with the geographic extent it
//! covers. The pixel/geo ratio is derived from the two and recomputed on
//! every transformation that changes either, so downstream stages can
//! always map a longitude/latitude onto the current pixel grid.

mod assembler;
mod placeholder;

pub use assembler::{assemble, AssemblyError};
pub use placeholder::{placeholder_tile, PLACEHOLDER_COLOR};

use std::collections::HashMap;

use image::RgbaImage;

use crate::coord::{Bbox, LonLat};

/// Degrees per pixel along each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRatio {
    pub x: f64,
    pub y: f64,
}

impl PixelRatio {
    /// Computes `(|w-e| / width, |n-s| / height)`.
    ///
    /// A zero dimension yields an infinite ratio on that axis.
    pub fn for_extent(extent: &Bbox, width: u32, height: u32) -> Self {
        Self {
            x: (extent.west - extent.east).abs() / width as f64,
            y: (extent.north - extent.south).abs() / height as f64,
        }
    }
}

/// Raster image with its geographic extent.
#[derive(Debug, Clone)]
pub struct Mosaic {
    image: RgbaImage,
    extent: Bbox,
    ratio: PixelRatio,
}

impl Mosaic {
    pub fn new(image: RgbaImage, extent: Bbox) -> Self {
        let ratio = PixelRatio::for_extent(&extent, image.width(), image.height());
        Self {
            image,
            extent,
            ratio,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn extent(&self) -> &Bbox {
        &self.extent
    }

    pub fn ratio(&self) -> PixelRatio {
        self.ratio
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Replaces the pixels while keeping the extent. The ratio follows the
    /// new dimensions.
    pub fn with_image(self, image: RgbaImage) -> Self {
        Self::new(image, self.extent)
    }

    /// Maps a geographic position to fractional pixel coordinates.
    ///
    /// Pixel y grows downward, so latitude is measured up from the south
    /// edge and flipped against the image height.
    pub fn to_pixel(&self, lonlat: LonLat) -> (f64, f64) {
        let x = (lonlat.lon - self.extent.west) / self.ratio.x;
        let y = self.image.height() as f64 - (lonlat.lat - self.extent.south) / self.ratio.y;
        (x, y)
    }
}

/// Decoded tile images keyed by `(x, y)` at a single zoom.
#[derive(Debug, Clone, Default)]
pub struct TileGrid {
    tiles: HashMap<(u32, u32), RgbaImage>,
}

impl TileGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, x: u32, y: u32, image: RgbaImage) {
        self.tiles.insert((x, y), image);
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&RgbaImage> {
        self.tiles.get(&(x, y))
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_and_pixel_mapping() {
        let mosaic = Mosaic::new(RgbaImage::new(200, 100), Bbox::new(-10.0, 5.0, 10.0, -5.0));

        assert_eq!(mosaic.ratio(), PixelRatio { x: 0.1, y: 0.1 });

        let (x, y) = mosaic.to_pixel(LonLat::new(-10.0, 5.0));
        assert!(x.abs() < 1e-9 && y.abs() < 1e-9);

        let (x, y) = mosaic.to_pixel(LonLat::new(0.0, 0.0));
        assert!((x - 100.0).abs() < 1e-9);
        assert!((y - 50.0).abs() < 1e-9);

        let (x, y) = mosaic.to_pixel(LonLat::new(10.0, -5.0));
        assert!((x - 200.0).abs() < 1e-9);
        assert!((y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_with_image_recomputes_ratio() {
        let mosaic = Mosaic::new(RgbaImage::new(200, 100), Bbox::new(0.0, 10.0, 20.0, 0.0));
        let resized = mosaic.with_image(RgbaImage::new(100, 100));

        assert_eq!(resized.ratio(), PixelRatio { x: 0.2, y: 0.1 });
        assert_eq!(resized.extent(), &Bbox::new(0.0, 10.0, 20.0, 0.0));
    }
}
