//! Conversions between `image` buffers and `tiny-skia` pixmaps.
//!
//! `RgbaImage` stores straight alpha, `Pixmap` stores premultiplied alpha.

use image::{Rgba, RgbaImage};
use tiny_skia::{ColorU8, Pixmap};

/// Copies an image into a new pixmap. `None` for zero-sized images.
pub fn to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Some(pixmap)
}

/// Copies a pixmap back into a straight-alpha image.
pub fn to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}
