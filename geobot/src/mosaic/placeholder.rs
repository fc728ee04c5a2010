//! Stand-in images for tiles that could not be fetched.

use image::{Rgba, RgbaImage};

/// Neutral light grey, so gaps read as "no data" rather than as map content.
pub const PLACEHOLDER_COLOR: Rgba<u8> = Rgba([204, 204, 204, 255]);

/// Builds a solid placeholder tile of the given size.
pub fn placeholder_tile(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, PLACEHOLDER_COLOR)
}
