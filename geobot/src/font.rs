//! TrueType font loading and text rasterization.
//!
//! Used for marker icons (an icon font such as Font Awesome) and for the
//! watermark text. Rendering produces a tightly cropped straight-alpha
//! sprite that callers composite wherever they need it.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use rusttype::{point, Font, GlyphId, Scale};
use thiserror::Error;

/// Map-marker glyph in Font Awesome's solid set.
pub const MARKER_GLYPH: char = '\u{f3c5}';

/// Default marker icon size in pixels.
pub const DEFAULT_ICON_SIZE: f32 = 20.0;

/// DejaVu Sans, used for watermark text when no font is configured.
static BUILTIN_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Errors that can occur while loading a font.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("Failed to read font {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a usable TrueType/OpenType font: {0}")]
    Invalid(String),
}

/// A parsed font ready for rasterization.
#[derive(Clone)]
pub struct LoadedFont {
    font: Font<'static>,
    name: String,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont").field("name", &self.name).finish()
    }
}

impl LoadedFont {
    /// Parses a font from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>, name: impl Into<String>) -> Result<Self, FontError> {
        let name = name.into();
        let font = Font::try_from_vec(bytes).ok_or_else(|| FontError::Invalid(name.clone()))?;
        Ok(Self { font, name })
    }

    /// The bundled DejaVu Sans.
    pub fn builtin() -> Result<Self, FontError> {
        let name = "DejaVu Sans (builtin)".to_string();
        let font =
            Font::try_from_bytes(BUILTIN_FONT).ok_or_else(|| FontError::Invalid(name.clone()))?;
        Ok(Self { font, name })
    }

    /// Reads and parses a font file.
    pub fn from_file(path: &Path) -> Result<Self, FontError> {
        let bytes = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(bytes, path.display().to_string())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the font maps `ch` to a real glyph rather than `.notdef`.
    pub fn has_glyph(&self, ch: char) -> bool {
        self.font.glyph(ch).id() != GlyphId(0)
    }

    /// Rasterizes `text` at `size` pixels in `color`.
    ///
    /// The sprite is cropped to the inked pixels. Returns `None` when
    /// nothing would be drawn (empty or whitespace-only text).
    pub fn render_text(&self, text: &str, size: f32, color: Rgba<u8>) -> Option<RgbaImage> {
        let scale = Scale::uniform(size);
        let ascent = self.font.v_metrics(scale).ascent;
        let glyphs: Vec<_> = self.font.layout(text, scale, point(0.0, ascent)).collect();

        let boxes: Vec<_> = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).collect();
        let min_x = boxes.iter().map(|b| b.min.x).min()?;
        let min_y = boxes.iter().map(|b| b.min.y).min()?;
        let max_x = boxes.iter().map(|b| b.max.x).max()?;
        let max_y = boxes.iter().map(|b| b.max.y).max()?;

        let width = (max_x - min_x).max(1) as u32;
        let height = (max_y - min_y).max(1) as u32;
        let mut sprite = RgbaImage::from_pixel(width, height, Rgba([color[0], color[1], color[2], 0]));

        for glyph in &glyphs {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let x = (bb.min.x - min_x) as u32 + gx;
                let y = (bb.min.y - min_y) as u32 + gy;
                if x < width && y < height {
                    let alpha = (color[3] as f32 * coverage).round().clamp(0.0, 255.0) as u8;
                    let pixel = sprite.get_pixel_mut(x, y);
                    pixel[3] = pixel[3].max(alpha);
                }
            });
        }

        Some(sprite)
    }
}
