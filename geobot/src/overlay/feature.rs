//! Feature collection parsing and drawable shapes.

use geojson::{Feature, JsonObject, Value as Geometry};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::style::{LineStyle, PointStyle, PolygonStyle};
use super::OverlayError;
use crate::coord::LonLat;

/// Why a single feature could not be drawn.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FeatureError {
    #[error("Feature has no geometry")]
    MissingGeometry,

    #[error("Position must hold at least a finite longitude and latitude, got {0:?}")]
    BadPosition(Vec<f64>),

    #[error("{kind} needs at least {min} positions, got {found}")]
    TooFewPositions {
        kind: &'static str,
        min: usize,
        found: usize,
    },
}

/// Parses a GeoJSON document into features.
///
/// Accepts a FeatureCollection or a single Feature. Features inside a
/// collection are parsed one by one; a malformed one is logged and skipped
/// so the rest still render.
pub fn parse_features(document: &str) -> Result<Vec<Feature>, OverlayError> {
    let value: Value =
        serde_json::from_str(document).map_err(|e| OverlayError::InvalidJson(e.to_string()))?;
    features_from_value(value)
}

/// Same as [`parse_features`] for an already-parsed JSON value.
pub fn features_from_value(mut value: Value) -> Result<Vec<Feature>, OverlayError> {
    let kind = value.get("type").and_then(Value::as_str).map(str::to_owned);
    let raw_features = match kind.as_deref() {
        Some("FeatureCollection") => match value.get_mut("features").map(Value::take) {
            Some(Value::Array(features)) => features,
            _ => {
                return Err(OverlayError::InvalidDocument(
                    "FeatureCollection without a features array".to_string(),
                ))
            }
        },
        Some("Feature") => vec![value],
        Some(other) => {
            return Err(OverlayError::InvalidDocument(format!(
                "expected a FeatureCollection or Feature, got {}",
                other
            )))
        }
        None => {
            return Err(OverlayError::InvalidDocument(
                "missing \"type\" member".to_string(),
            ))
        }
    };

    let mut features = Vec::with_capacity(raw_features.len());
    for (index, raw) in raw_features.into_iter().enumerate() {
        match Feature::from_json_value(raw) {
            Ok(feature) => features.push(feature),
            Err(e) => warn!(index, error = %e, "Skipping malformed feature"),
        }
    }
    Ok(features)
}

/// A feature resolved into pixel-independent drawing instructions.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point {
        at: LonLat,
        style: PointStyle,
    },
    Line {
        path: Vec<LonLat>,
        style: LineStyle,
    },
    /// First ring is the exterior; the rest are holes.
    Polygon {
        rings: Vec<Vec<LonLat>>,
        style: PolygonStyle,
    },
}

impl Shape {
    /// Resolves a feature. `Ok(None)` means the geometry type is not drawn.
    pub fn from_feature(feature: &Feature) -> Result<Option<Shape>, FeatureError> {
        let geometry = feature.geometry.as_ref().ok_or(FeatureError::MissingGeometry)?;
        let props = style_properties(feature);

        let shape = match &geometry.value {
            Geometry::Point(position) => Shape::Point {
                at: to_lonlat(position)?,
                style: PointStyle::from_properties(Some(&props)),
            },
            Geometry::LineString(positions) => Shape::Line {
                path: to_path(positions, "LineString", 2)?,
                style: LineStyle::from_properties(Some(&props)),
            },
            Geometry::Polygon(rings) => {
                if rings.is_empty() {
                    return Err(FeatureError::TooFewPositions {
                        kind: "Polygon ring",
                        min: 3,
                        found: 0,
                    });
                }
                Shape::Polygon {
                    rings: rings
                        .iter()
                        .map(|ring| to_path(ring, "Polygon ring", 3))
                        .collect::<Result<_, _>>()?,
                    style: PolygonStyle::from_properties(Some(&props)),
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(shape))
    }
}

/// Styling keys from `feature.properties`, falling back per key to a
/// `properties` object carried on the geometry.
fn style_properties(feature: &Feature) -> JsonObject {
    let mut merged = feature
        .geometry
        .as_ref()
        .and_then(|g| g.foreign_members.as_ref())
        .and_then(|members| members.get("properties"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    if let Some(properties) = &feature.properties {
        for (key, value) in properties {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

fn to_lonlat(position: &[f64]) -> Result<LonLat, FeatureError> {
    match position {
        [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Ok(LonLat::new(*lon, *lat)),
        _ => Err(FeatureError::BadPosition(position.to_vec())),
    }
}

fn to_path(
    positions: &[Vec<f64>],
    kind: &'static str,
    min: usize,
) -> Result<Vec<LonLat>, FeatureError> {
    if positions.len() < min {
        return Err(FeatureError::TooFewPositions {
            kind,
            min,
            found: positions.len(),
        });
    }
    positions.iter().map(|p| to_lonlat(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use serde_json::json;

    #[test]
    fn test_collection_skips_malformed_features() {
        let document = json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": {}, "geometry": { "type": "Point", "coordinates": [1.0, 2.0] } },
                { "type": "Feature", "properties": {}, "geometry": { "type": "Bogus", "coordinates": [] } },
                { "type": "Feature", "properties": {}, "geometry": { "type": "Point", "coordinates": [1.0] } },
                { "type": "Feature", "properties": null, "geometry": { "type": "LineString", "coordinates": [[0, 0], [1, 1]] } }
            ]
        })
        .to_string();

        let features = parse_features(&document).unwrap();
        assert_eq!(features.len(), 2);
    }

    #[test]
    fn test_single_feature_document() {
        let document = r#"{"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[3,4]}}"#;
        assert_eq!(parse_features(document).unwrap().len(), 1);
    }

    #[test]
    fn test_document_level_errors() {
        assert!(matches!(parse_features("{not json"), Err(OverlayError::InvalidJson(_))));
        assert!(matches!(
            parse_features(r#"{"type":"FeatureCollection"}"#),
            Err(OverlayError::InvalidDocument(_))
        ));
        assert!(matches!(
            parse_features(r#"{"type":"Point","coordinates":[0,0]}"#),
            Err(OverlayError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_geometry_properties_fallback() {
        let document = json!({
            "type": "Feature",
            "properties": { "radius": 6 },
            "geometry": {
                "type": "Point",
                "coordinates": [10.0, 20.0],
                "properties": { "color": [0, 0, 255], "radius": 2 }
            }
        })
        .to_string();
        let features = parse_features(&document).unwrap();

        let Some(Shape::Point { at, style }) = Shape::from_feature(&features[0]).unwrap() else {
            panic!("expected a point");
        };
        assert_eq!(at, LonLat::new(10.0, 20.0));
        assert_eq!(style.color, Rgba([0, 0, 255, 255]));
        assert_eq!(style.radius, 6.0);
    }

    #[test]
    fn test_unsupported_geometry_is_not_drawn() {
        let document = r#"{"type":"Feature","properties":{},"geometry":{"type":"MultiPoint","coordinates":[[0,0],[1,1]]}}"#;
        let features = parse_features(document).unwrap();
        assert_eq!(Shape::from_feature(&features[0]), Ok(None));
    }

    #[test]
    fn test_short_line_is_malformed() {
        let feature = Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(Geometry::LineString(vec![vec![0.0, 0.0]]))),
            id: None,
            properties: None,
            foreign_members: None,
        };
        assert_eq!(
            Shape::from_feature(&feature),
            Err(FeatureError::TooFewPositions {
                kind: "LineString",
                min: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_missing_geometry() {
        let feature = Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: None,
            foreign_members: None,
        };
        assert_eq!(Shape::from_feature(&feature), Err(FeatureError::MissingGeometry));
    }
}
