//! GeoJSON echo helpers for geodesy values.
//!
//! External callers use these to send geometry back to clients, for example
//! the bbox a rendered image covers.

use geojson::{Feature, Geometry, JsonObject, Value};

use super::types::{Bbox, LonLat};

/// Serializes a bbox as a Polygon feature with one closed 5-point ring.
///
/// Ring order is NW, SW, SE, NE, NW.
pub fn bbox_to_geojson(bbox: &Bbox, properties: Option<JsonObject>) -> Feature {
    let (w, n, e, s) = bbox.to_tuple();
    let ring = vec![
        vec![w, n],
        vec![w, s],
        vec![e, s],
        vec![e, n],
        vec![w, n],
    ];
    feature(Value::Polygon(vec![ring]), properties)
}

/// Serializes a point as a Point feature.
pub fn lonlat_to_geojson(lonlat: &LonLat, properties: Option<JsonObject>) -> Feature {
    feature(Value::Point(vec![lonlat.lon, lonlat.lat]), properties)
}

/// Computes the envelope of every coordinate in a feature.
///
/// Returns `None` when the feature has no geometry or no coordinates.
pub fn feature_to_bbox(feature: &Feature) -> Option<Bbox> {
    let geometry = feature.geometry.as_ref()?;
    let mut positions = Vec::new();
    collect_positions(&geometry.value, &mut positions);

    let mut iter = positions
        .into_iter()
        .filter(|p| p.len() >= 2)
        .map(|p| (p[0], p[1]));
    let (lon0, lat0) = iter.next()?;
    let init = Bbox::new(lon0, lat0, lon0, lat0);

    Some(iter.fold(init, |acc, (lon, lat)| Bbox {
        west: acc.west.min(lon),
        north: acc.north.max(lat),
        east: acc.east.max(lon),
        south: acc.south.min(lat),
    }))
}

fn collect_positions<'a>(value: &'a Value, out: &mut Vec<&'a Vec<f64>>) {
    match value {
        Value::Point(p) => out.push(p),
        Value::MultiPoint(ps) | Value::LineString(ps) => out.extend(ps.iter()),
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            out.extend(lines.iter().flatten())
        }
        Value::MultiPolygon(polys) => out.extend(polys.iter().flatten().flatten()),
        Value::GeometryCollection(geoms) => {
            for g in geoms {
                collect_positions(&g.value, out);
            }
        }
    }
}

fn feature(value: Value, properties: Option<JsonObject>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties,
        foreign_members: None,
    }
}
