//! Draws features onto a mosaic.

use geojson::Feature;
use image::Rgba;
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Shader,
    Stroke, Transform,
};
use tracing::{debug, warn};

use super::canvas::{to_pixmap, to_rgba_image};
use super::feature::Shape;
use super::style::{LineStyle, PointStyle, PolygonStyle, POLYGON_STROKE_WIDTH};
use super::OverlayError;
use crate::coord::LonLat;
use crate::font::{LoadedFont, DEFAULT_ICON_SIZE};
use crate::mosaic::Mosaic;

/// Renders points, lines and polygons in the mosaic's pixel space.
///
/// Points with a marker are drawn as icon glyphs when an icon font is
/// loaded and carries every requested glyph; otherwise they fall back to
/// filled circles.
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    icons: Option<LoadedFont>,
    icon_size: f32,
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self {
            icons: None,
            icon_size: DEFAULT_ICON_SIZE,
        }
    }

    pub fn with_icons(mut self, font: LoadedFont) -> Self {
        self.icons = Some(font);
        self
    }

    pub fn with_icon_size(mut self, size: f32) -> Self {
        self.icon_size = size;
        self
    }

    pub fn has_icons(&self) -> bool {
        self.icons.is_some()
    }

    /// Draws `features` and returns the updated mosaic.
    ///
    /// Features that cannot be resolved are logged and skipped.
    pub fn render(&self, mosaic: Mosaic, features: &[Feature]) -> Result<Mosaic, OverlayError> {
        if features.is_empty() {
            return Ok(mosaic);
        }

        let mut pixmap = to_pixmap(mosaic.image()).ok_or(OverlayError::EmptyCanvas {
            width: mosaic.width(),
            height: mosaic.height(),
        })?;

        let mut drawn = 0usize;
        for (index, feature) in features.iter().enumerate() {
            match Shape::from_feature(feature) {
                Ok(Some(shape)) => {
                    self.draw_shape(&mut pixmap, &mosaic, &shape);
                    drawn += 1;
                }
                Ok(None) => debug!(index, "Skipping unsupported geometry type"),
                Err(e) => warn!(index, error = %e, "Skipping malformed feature"),
            }
        }

        debug!(features = features.len(), drawn, "Overlay rendered");
        Ok(mosaic.with_image(to_rgba_image(&pixmap)))
    }

    fn draw_shape(&self, pixmap: &mut Pixmap, mosaic: &Mosaic, shape: &Shape) {
        match shape {
            Shape::Point { at, style } => self.draw_point(pixmap, mosaic, *at, style),
            Shape::Line { path, style } => draw_line(pixmap, mosaic, path, style),
            Shape::Polygon { rings, style } => draw_polygon(pixmap, mosaic, rings, style),
        }
    }

    fn draw_point(&self, pixmap: &mut Pixmap, mosaic: &Mosaic, at: LonLat, style: &PointStyle) {
        let (x, y) = mosaic.to_pixel(at);

        if let Some(text) = &style.marker {
            if self.draw_marker(pixmap, x, y, text, style.color) {
                return;
            }
        }

        if let Some(circle) = PathBuilder::from_circle(x as f32, y as f32, style.radius) {
            pixmap.fill_path(
                &circle,
                &solid(style.color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    /// Draws `text` centered on `(x, y)`. Returns false when it could not.
    fn draw_marker(&self, pixmap: &mut Pixmap, x: f64, y: f64, text: &str, color: Rgba<u8>) -> bool {
        let Some(font) = &self.icons else {
            return false;
        };
        if !text.chars().all(|c| font.has_glyph(c)) {
            debug!(font = font.name(), marker = text, "Icon font lacks marker glyph");
            return false;
        }
        let Some(sprite) = font
            .render_text(text, self.icon_size, color)
            .and_then(|s| to_pixmap(&s))
        else {
            return false;
        };

        let left = (x - sprite.width() as f64 / 2.0).round() as i32;
        let top = (y - sprite.height() as f64 / 2.0).round() as i32;
        pixmap.draw_pixmap(
            left,
            top,
            sprite.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        true
    }
}

fn draw_line(pixmap: &mut Pixmap, mosaic: &Mosaic, path: &[LonLat], style: &LineStyle) {
    let Some(path) = build_path(mosaic, path, false) else {
        return;
    };
    let stroke = Stroke {
        width: style.width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    };
    pixmap.stroke_path(&path, &solid(style.color), &stroke, Transform::identity(), None);
}

/// Draws the rings in order. Each ring keeps the fill and flips the stroke.
fn draw_polygon(pixmap: &mut Pixmap, mosaic: &Mosaic, rings: &[Vec<LonLat>], style: &PolygonStyle) {
    let stroke = Stroke {
        width: POLYGON_STROKE_WIDTH,
        line_join: LineJoin::Round,
        ..Default::default()
    };

    for (index, ring) in rings.iter().enumerate() {
        let Some(path) = build_path(mosaic, ring, true) else {
            continue;
        };

        if let Some(fill) = style.fill {
            pixmap.fill_path(
                &path,
                &solid(fill),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
        pixmap.stroke_path(
            &path,
            &solid(style.ring_color(index)),
            &stroke,
            Transform::identity(),
            None,
        );
    }
}

fn build_path(mosaic: &Mosaic, points: &[LonLat], close: bool) -> Option<Path> {
    let mut builder = PathBuilder::new();
    for (index, point) in points.iter().enumerate() {
        let (x, y) = mosaic.to_pixel(*point);
        if index == 0 {
            builder.move_to(x as f32, y as f32);
        } else {
            builder.line_to(x as f32, y as f32);
        }
    }
    if close {
        builder.close();
    }
    builder.finish()
}

fn solid(color: Rgba<u8>) -> Paint<'static> {
    Paint {
        shader: Shader::SolidColor(Color::from_rgba8(color[0], color[1], color[2], color[3])),
        anti_alias: true,
        ..Default::default()
    }
}
