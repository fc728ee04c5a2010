//! Per-kind feature styling.
//!
//! Styles are read from a feature's property bag. Missing or malformed keys
//! fall back to the defaults below; styling never fails a feature.

use geojson::JsonObject;
use image::Rgba;
use serde_json::Value;

use crate::font::MARKER_GLYPH;

pub const DEFAULT_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const DEFAULT_POINT_RADIUS: f32 = 3.0;
pub const DEFAULT_LINE_WIDTH: f32 = 2.0;
pub const POLYGON_STROKE_WIDTH: f32 = 1.0;

/// Inverts each color channel, keeping alpha.
pub fn complement(color: Rgba<u8>) -> Rgba<u8> {
    Rgba([255 - color[0], 255 - color[1], 255 - color[2], color[3]])
}

/// Parses a color from `[r, g, b]`, `[r, g, b, a]`, `#rrggbb` or `#rrggbbaa`.
pub fn parse_color(value: &Value) -> Option<Rgba<u8>> {
    match value {
        Value::Array(channels) if channels.len() == 3 || channels.len() == 4 => {
            let mut rgba = [255u8; 4];
            for (slot, channel) in rgba.iter_mut().zip(channels) {
                let v = channel.as_f64()?;
                if !(0.0..=255.0).contains(&v) {
                    return None;
                }
                *slot = v.round() as u8;
            }
            Some(Rgba(rgba))
        }
        Value::String(s) => parse_hex(s),
        _ => None,
    }
}

fn parse_hex(s: &str) -> Option<Rgba<u8>> {
    let hex = s.strip_prefix('#')?;
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Some(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

fn parse_marker(value: &Value) -> Option<String> {
    match value {
        Value::Bool(true) => Some(MARKER_GLYPH.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn color_or(props: Option<&JsonObject>, key: &str, default: Rgba<u8>) -> Rgba<u8> {
    props
        .and_then(|p| p.get(key))
        .and_then(parse_color)
        .unwrap_or(default)
}

fn positive_or(props: Option<&JsonObject>, key: &str, default: f32) -> f32 {
    props
        .and_then(|p| p.get(key))
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v as f32)
        .unwrap_or(default)
}

/// Styling for Point features.
#[derive(Debug, Clone, PartialEq)]
pub struct PointStyle {
    pub color: Rgba<u8>,
    /// Circle radius in pixels
    pub radius: f32,
    /// Icon text drawn instead of a circle when an icon font is loaded.
    /// `marker: true` selects [`MARKER_GLYPH`]; a string is drawn as given.
    pub marker: Option<String>,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR,
            radius: DEFAULT_POINT_RADIUS,
            marker: None,
        }
    }
}

impl PointStyle {
    pub fn from_properties(props: Option<&JsonObject>) -> Self {
        Self {
            color: color_or(props, "color", DEFAULT_COLOR),
            radius: positive_or(props, "radius", DEFAULT_POINT_RADIUS),
            marker: props.and_then(|p| p.get("marker")).and_then(parse_marker),
        }
    }

    pub fn with_color(mut self, color: Rgba<u8>) -> Self {
        self.color = color;
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }
}

/// Styling for LineString features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Rgba<u8>,
    pub width: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR,
            width: DEFAULT_LINE_WIDTH,
        }
    }
}

impl LineStyle {
    pub fn from_properties(props: Option<&JsonObject>) -> Self {
        Self {
            color: color_or(props, "color", DEFAULT_COLOR),
            width: positive_or(props, "width", DEFAULT_LINE_WIDTH),
        }
    }
}

/// Styling for Polygon features.
///
/// `color` strokes the exterior ring and is complemented once more for each
/// following ring, so ring outlines alternate. `fill` (the `outline`
/// property) fills every ring unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonStyle {
    pub color: Rgba<u8>,
    pub fill: Option<Rgba<u8>>,
}

impl Default for PolygonStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR,
            fill: None,
        }
    }
}

impl PolygonStyle {
    pub fn from_properties(props: Option<&JsonObject>) -> Self {
        Self {
            color: color_or(props, "color", DEFAULT_COLOR),
            fill: props.and_then(|p| p.get("outline")).and_then(parse_color),
        }
    }

    /// Stroke color of ring `index`, the exterior ring being 0.
    pub fn ring_color(&self, index: usize) -> Rgba<u8> {
        if index % 2 == 0 {
            self.color
        } else {
            complement(self.color)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_complement_keeps_alpha() {
        assert_eq!(complement(Rgba([255, 0, 10, 77])), Rgba([0, 255, 245, 77]));
    }

    #[test]
    fn test_parse_color_forms() {
        assert_eq!(parse_color(&json!([0, 128, 255])), Some(Rgba([0, 128, 255, 255])));
        assert_eq!(parse_color(&json!([1, 2, 3, 4])), Some(Rgba([1, 2, 3, 4])));
        assert_eq!(parse_color(&json!("#00ff7f")), Some(Rgba([0, 255, 127, 255])));
        assert_eq!(parse_color(&json!("#00ff7f80")), Some(Rgba([0, 255, 127, 128])));
    }

    #[test]
    fn test_parse_color_rejects_garbage() {
        assert_eq!(parse_color(&json!([0, 300, 0])), None);
        assert_eq!(parse_color(&json!([0, 0])), None);
        assert_eq!(parse_color(&json!(["a", 0, 0])), None);
        assert_eq!(parse_color(&json!("00ff7f")), None);
        assert_eq!(parse_color(&json!("#zzzzzz")), None);
        assert_eq!(parse_color(&json!(42)), None);
    }

    #[test]
    fn test_point_defaults() {
        assert_eq!(PointStyle::from_properties(None), PointStyle::default());
    }

    #[test]
    fn test_malformed_properties_fall_back() {
        let p = props(json!({ "color": "blue-ish", "radius": -4, "marker": 7 }));
        assert_eq!(PointStyle::from_properties(Some(&p)), PointStyle::default());

        let p = props(json!({ "width": "thick" }));
        assert_eq!(LineStyle::from_properties(Some(&p)).width, DEFAULT_LINE_WIDTH);
    }

    #[test]
    fn test_marker_forms() {
        let p = props(json!({ "marker": true }));
        assert_eq!(
            PointStyle::from_properties(Some(&p)).marker,
            Some(MARKER_GLYPH.to_string())
        );

        let p = props(json!({ "marker": "\u{f041}" }));
        assert_eq!(
            PointStyle::from_properties(Some(&p)).marker,
            Some("\u{f041}".to_string())
        );

        let p = props(json!({ "marker": false }));
        assert_eq!(PointStyle::from_properties(Some(&p)).marker, None);
    }

    #[test]
    fn test_polygon_outline_is_fill() {
        let p = props(json!({ "color": [0, 0, 255], "outline": [0, 255, 0, 128] }));
        let style = PolygonStyle::from_properties(Some(&p));
        assert_eq!(style.color, Rgba([0, 0, 255, 255]));
        assert_eq!(style.fill, Some(Rgba([0, 255, 0, 128])));

    }

    #[test]
    fn test_ring_colors_alternate() {
        let style = PolygonStyle {
            color: Rgba([0, 0, 255, 200]),
            fill: None,
        };
        assert_eq!(style.ring_color(0), Rgba([0, 0, 255, 200]));
        assert_eq!(style.ring_color(1), Rgba([255, 255, 0, 200]));
        assert_eq!(style.ring_color(2), Rgba([0, 0, 255, 200]));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_complement_is_an_involution(r: u8, g: u8, b: u8, a: u8) {
                let color = Rgba([r, g, b, a]);
                prop_assert_eq!(complement(complement(color)), color);
                prop_assert_eq!(complement(color)[3], a);
            }

            #[test]
            fn test_hex_colors_parse(r: u8, g: u8, b: u8) {
                let hex = json!(format!("#{:02x}{:02x}{:02x}", r, g, b));
                prop_assert_eq!(parse_color(&hex), Some(Rgba([r, g, b, 255])));
            }
        }
    }
}
