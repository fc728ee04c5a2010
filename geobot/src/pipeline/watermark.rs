//! Bottom-right text watermark on a translucent plate.

use image::{imageops, Rgba, RgbaImage};
use tracing::warn;

use crate::font::LoadedFont;
use crate::mosaic::Mosaic;

/// Appearance of the watermark.
///
/// The default style uses the bundled font. With `font` cleared the
/// watermark stage is a no-op.
#[derive(Debug, Clone)]
pub struct WatermarkStyle {
    pub font: Option<LoadedFont>,
    /// Text height in pixels
    pub text_size: f32,
    pub text_color: Rgba<u8>,
    pub plate_color: Rgba<u8>,
    /// Padding around the text, inside the plate
    pub text_padding: u32,
    /// Distance from the plate to the image's right and bottom edges
    pub padding: u32,
    /// Opacity applied to the whole plate, text included
    pub alpha: u8,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            font: builtin_font(),
            text_size: 11.0,
            text_color: Rgba([255, 255, 255, 255]),
            plate_color: Rgba([0, 0, 0, 255]),
            text_padding: 5,
            padding: 10,
            alpha: 100,
        }
    }
}

fn builtin_font() -> Option<LoadedFont> {
    LoadedFont::builtin()
        .map_err(|e| warn!(error = %e, "Bundled watermark font unusable"))
        .ok()
}

impl WatermarkStyle {
    pub fn without_font(mut self) -> Self {
        self.font = None;
        self
    }

    pub fn with_font(mut self, font: LoadedFont) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_text_size(mut self, size: f32) -> Self {
        self.text_size = size;
        self
    }

    pub fn with_colors(mut self, text: Rgba<u8>, plate: Rgba<u8>) -> Self {
        self.text_color = text;
        self.plate_color = plate;
        self
    }

    pub fn with_alpha(mut self, alpha: u8) -> Self {
        self.alpha = alpha;
        self
    }
}

/// Composites `text` at the bottom-right corner of the mosaic.
pub fn apply_watermark(mosaic: Mosaic, text: &str, style: &WatermarkStyle) -> Mosaic {
    let Some(font) = &style.font else {
        warn!("No watermark font loaded, skipping watermark");
        return mosaic;
    };
    let Some(plate) = build_plate(font, text, style) else {
        return mosaic;
    };

    let x = mosaic.width() as i64 - plate.width() as i64 - style.padding as i64;
    let y = mosaic.height() as i64 - plate.height() as i64 - style.padding as i64;

    let mut image = mosaic.image().clone();
    imageops::overlay(&mut image, &plate, x, y);
    mosaic.with_image(image)
}

fn build_plate(font: &LoadedFont, text: &str, style: &WatermarkStyle) -> Option<RgbaImage> {
    let sprite = font.render_text(text, style.text_size, style.text_color)?;

    let mut plate = RgbaImage::from_pixel(
        sprite.width() + style.text_padding,
        sprite.height() + style.text_padding,
        style.plate_color,
    );
    let inset = (style.text_padding / 2) as i64;
    imageops::overlay(&mut plate, &sprite, inset, inset);

    for pixel in plate.pixels_mut() {
        pixel[3] = style.alpha;
    }
    Some(plate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Bbox;

    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

    fn mosaic() -> Mosaic {
        Mosaic::new(
            RgbaImage::from_pixel(200, 100, GREEN),
            Bbox::new(0.0, 1.0, 2.0, 0.0),
        )
    }

    #[test]
    fn test_default_style_has_font() {
        assert!(WatermarkStyle::default().font.is_some());
    }

    #[test]
    fn test_without_font_is_noop() {
        let style = WatermarkStyle::default().without_font();
        let out = apply_watermark(mosaic(), "(c) geobot", &style);
        assert!(out.image().pixels().all(|p| *p == GREEN));
    }

    #[test]
    fn test_plate_darkens_bottom_right_only() {
        let style = WatermarkStyle::default();
        let out = apply_watermark(mosaic(), "(c) geobot", &style);

        assert_eq!(out.image().dimensions(), (200, 100));
        assert_eq!(out.extent(), &Bbox::new(0.0, 1.0, 2.0, 0.0));

        // Top-left corner untouched, edge padding untouched.
        assert_eq!(*out.image().get_pixel(0, 0), GREEN);
        assert_eq!(*out.image().get_pixel(195, 95), GREEN);

        // Just inside the plate's bottom-right corner is plate, blended.
        let plate_pixel = *out.image().get_pixel(189, 89);
        assert!(plate_pixel[1] < 255);
        assert!(plate_pixel[1] > 0);
        assert_eq!(plate_pixel[3], 255);
    }

    #[test]
    fn test_plate_has_uniform_alpha() {
        let font = LoadedFont::builtin().unwrap();
        let style = WatermarkStyle::default();
        let plate = build_plate(&font, "abc", &style).unwrap();
        assert!(plate.pixels().all(|p| p[3] == 100));
    }
}
