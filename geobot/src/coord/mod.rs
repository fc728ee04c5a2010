//! Coordinate conversion module
//!
//! Pure Web Mercator math: longitude/latitude to tile and back, quadkeys,
//! tile hierarchy navigation and point-in-polygon tests. No I/O.
//!
//! The forward projection is only defined away from the poles. Latitudes are
//! regularized to [-90, 90] first and the resulting tile indices are clamped
//! into `[0, 2^z)`, so a pole maps to the first or last tile row rather than
//! failing. Callers that need exact behaviour near the poles should clamp to
//! [`MIN_LAT`]..[`MAX_LAT`] before calling.

mod geojson;
mod types;

pub use geojson::{bbox_to_geojson, feature_to_bbox, lonlat_to_geojson};
pub use types::{
    Bbox, CoordError, Corner, LonLat, Tile, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON,
};

use std::collections::VecDeque;
use std::f64::consts::PI;

/// Converts geographic coordinates to the tile containing them.
///
/// The point is regularized first. Indices are clamped into the zoom grid,
/// which only matters on the east edge (lon = 180) and at the poles.
#[inline]
pub fn lonlat_to_tile(lonlat: LonLat, zoom: u8) -> Tile {
    let ll = lonlat.regularized();
    let n = 2.0_f64.powi(zoom as i32);

    let x = ((ll.lon + 180.0) / 360.0 * n).floor();

    let lat_rad = ll.lat.to_radians();
    let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n).floor();

    Tile {
        z: zoom,
        x: clamp_index(x, n),
        y: clamp_index(y, n),
    }
}

fn clamp_index(value: f64, n: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, n - 1.0) as u32
}

/// Projects a tile corner (or center) back to longitude/latitude.
#[inline]
pub fn tile_to_lonlat(tile: &Tile, corner: Corner) -> LonLat {
    tile.lonlat(corner)
}

/// Returns the bbox covered by a tile.
///
/// The result always has `west < east` and `south < north`.
pub fn tile_to_bbox(tile: &Tile) -> Bbox {
    let ul = tile.lonlat(Corner::TopLeft);
    let lr = tile.lonlat(Corner::BottomRight);

    Bbox {
        west: ul.lon.min(lr.lon),
        north: ul.lat.max(lr.lat),
        east: ul.lon.max(lr.lon),
        south: ul.lat.min(lr.lat),
    }
}

/// Encodes a tile as a quadkey.
///
/// One digit per zoom level from `z` down to 1; each digit is
/// `x_bit + 2 * y_bit` for that level. The root tile encodes as "".
pub fn quadkey(tile: &Tile) -> String {
    let mut key = String::with_capacity(tile.z as usize);
    for level in (1..=tile.z).rev() {
        let mask = 1u32 << (level - 1);
        let mut digit = b'0';
        if tile.x & mask != 0 {
            digit += 1;
        }
        if tile.y & mask != 0 {
            digit += 2;
        }
        key.push(digit as char);
    }
    key
}

/// Decodes a quadkey back into a tile.
///
/// The empty string is the root tile.
pub fn parse_quadkey(quadkey: &str) -> Result<Tile, CoordError> {
    if quadkey.len() > MAX_ZOOM as usize {
        return Err(CoordError::QuadkeyTooLong(quadkey.to_string()));
    }

    let mut x = 0u32;
    let mut y = 0u32;
    let mut z = 0u8;
    for (i, digit) in quadkey.chars().rev().enumerate() {
        let mask = 1u32 << i;
        match digit {
            '0' => {}
            '1' => x |= mask,
            '2' => y |= mask,
            '3' => {
                x |= mask;
                y |= mask;
            }
            other => {
                return Err(CoordError::InvalidQuadkeyDigit {
                    quadkey: quadkey.to_string(),
                    digit: other,
                })
            }
        }
        z += 1;
    }

    Ok(Tile { z, x, y })
}

/// Returns the ancestor of `tile` at `zoom` (default: the direct parent).
///
/// Asking for the tile's own zoom returns the tile itself.
pub fn parent(tile: &Tile, zoom: Option<u8>) -> Result<Tile, CoordError> {
    if let Some(target) = zoom {
        if target > tile.z {
            return Err(CoordError::ZoomDirection {
                operation: "parent",
                requested: target,
                current: tile.z,
            });
        }
    }
    if tile.z == 0 {
        return Err(CoordError::RootHasNoParent);
    }

    let target = zoom.unwrap_or(tile.z - 1);
    let shift = tile.z - target;

    // Right shift is floor division by 2^shift for unsigned indices.
    Ok(Tile {
        z: target,
        x: tile.x >> shift,
        y: tile.y >> shift,
    })
}

/// Deepest expansion [`children`] performs, 4^10 (about a million) tiles.
pub const MAX_CHILDREN_DEPTH: u8 = 10;

/// Returns all descendants of `tile` at `zoom` (default: direct children).
///
/// Expansion is breadth-first; each tile yields its four children in the
/// order (2x,2y), (2x+1,2y), (2x+1,2y+1), (2x,2y+1).
pub fn children(tile: &Tile, zoom: Option<u8>) -> Result<Vec<Tile>, CoordError> {
    let target = match zoom {
        Some(target) => target,
        None => tile
            .z
            .checked_add(1)
            .ok_or_else(|| CoordError::InvalidZoom(format!("{}+1", tile.z)))?,
    };

    if target < tile.z {
        return Err(CoordError::ZoomDirection {
            operation: "children",
            requested: target,
            current: tile.z,
        });
    }
    if target > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(target.to_string()));
    }
    let depth = target - tile.z;
    if depth > MAX_CHILDREN_DEPTH {
        return Err(CoordError::TooManyDescendants {
            depth,
            max: MAX_CHILDREN_DEPTH,
        });
    }

    let mut queue = VecDeque::from([*tile]);

    while queue.front().is_some_and(|t| t.z < target) {
        let Some(t) = queue.pop_front() else {
            break;
        };
        let (z, x, y) = (t.z + 1, t.x * 2, t.y * 2);
        queue.push_back(Tile::new(z, x, y));
        queue.push_back(Tile::new(z, x + 1, y));
        queue.push_back(Tile::new(z, x + 1, y + 1));
        queue.push_back(Tile::new(z, x, y + 1));
    }

    Ok(queue.into_iter().collect())
}

/// Even-odd ray casting test of a point against a coordinate ring.
///
/// O(n) in the ring length. The ring may be open or closed. Results on
/// self-intersecting rings follow the even-odd rule and are otherwise
/// unspecified.
pub fn point_in_polygon(point: LonLat, ring: &[LonLat]) -> bool {
    let Some(last) = ring.len().checked_sub(1) else {
        return false;
    };

    let mut inside = false;
    let mut j = last;
    for i in 0..ring.len() {
        let (pi, pj) = (ring[i], ring[j]);
        // The first condition guarantees pj.lat != pi.lat below.
        if (pi.lat > point.lat) != (pj.lat > point.lat)
            && point.lon < pi.lon + (pj.lon - pi.lon) * (point.lat - pi.lat) / (pj.lat - pi.lat)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Returns a regularized point from raw longitude/latitude.
pub fn parse_lonlat(lon: f64, lat: f64) -> LonLat {
    LonLat::new(lon, lat).regularized()
}

/// Builds a tile from a (z, x, y) triplet, validating the indices.
pub fn parse_tile(z: u8, x: u32, y: u32) -> Result<Tile, CoordError> {
    if z > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(z.to_string()));
    }
    let n = 1u64 << z;
    if x as u64 >= n || y as u64 >= n {
        return Err(CoordError::TileOutOfRange { z, x, y });
    }
    Ok(Tile { z, x, y })
}

/// Parses a textual zoom level.
///
/// Non-integer, negative or out-of-range values are rejected.
pub fn parse_zoom(value: &str) -> Result<u8, CoordError> {
    let invalid = || CoordError::InvalidZoom(value.to_string());
    let parsed: f64 = value.trim().parse().map_err(|_| invalid())?;

    if !parsed.is_finite() || parsed.fract() != 0.0 || parsed < 0.0 || parsed > MAX_ZOOM as f64 {
        return Err(invalid());
    }
    Ok(parsed as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_york_city_at_zoom_16() {
        // New York City: 40.7128°N, 74.0060°W
        let tile = lonlat_to_tile(LonLat::new(-74.0060, 40.7128), 16);

        assert_eq!(tile.y, 24640);
        assert_eq!(tile.x, 19295);
        assert_eq!(tile.z, 16);
    }

    #[test]
    fn test_out_of_range_point_is_clamped() {
        let tile = lonlat_to_tile(LonLat::new(200.0, 0.0), 3);
        assert_eq!(tile.x, 7);

        let pole = lonlat_to_tile(LonLat::new(0.0, 90.0), 3);
        assert!(pole.y < 8);
    }

    #[test]
    fn test_tile_to_lonlat_corners() {
        let tile = Tile::new(1, 0, 0);

        let tl = tile_to_lonlat(&tile, Corner::TopLeft);
        assert_eq!(tl.lon, -180.0);
        assert!((tl.lat - 85.0511287798).abs() < 1e-6);

        let br = tile_to_lonlat(&tile, Corner::BottomRight);
        assert_eq!(br.lon, 0.0);
        assert!(br.lat.abs() < 1e-9);

        let c = tile_to_lonlat(&tile, Corner::Center);
        assert_eq!(c.lon, -90.0);
        assert!(c.lat > 0.0 && c.lat < tl.lat);
    }

    #[test]
    fn test_tile_to_bbox_is_ordered() {
        let bbox = tile_to_bbox(&Tile::new(3, 5, 6));
        assert!(bbox.west < bbox.east);
        assert!(bbox.south < bbox.north);
        assert_eq!(bbox.west, 45.0);
        assert_eq!(bbox.east, 90.0);
    }

    #[test]
    fn test_quadkey_known_value() {
        // Bing documentation example: tile 3/3/5 -> "213"
        assert_eq!(quadkey(&Tile::new(3, 3, 5)), "213");
        assert_eq!(quadkey(&Tile::ROOT), "");
    }

    #[test]
    fn test_parse_quadkey() {
        assert_eq!(parse_quadkey("213").unwrap(), Tile::new(3, 3, 5));
        assert_eq!(parse_quadkey("").unwrap(), Tile::ROOT);
    }

    #[test]
    fn test_parse_quadkey_rejects_bad_digit() {
        let err = parse_quadkey("0142").unwrap_err();
        assert!(matches!(
            err,
            CoordError::InvalidQuadkeyDigit { digit: '4', .. }
        ));
    }

    #[test]
    fn test_parent_default_and_explicit() {
        let tile = Tile::new(3, 5, 6);
        assert_eq!(parent(&tile, None).unwrap(), Tile::new(2, 2, 3));
        assert_eq!(parent(&tile, Some(1)).unwrap(), Tile::new(1, 1, 1));
        assert_eq!(parent(&tile, Some(3)).unwrap(), tile);
    }

    #[test]
    fn test_parent_errors() {
        assert!(matches!(
            parent(&Tile::new(2, 1, 1), Some(4)),
            Err(CoordError::ZoomDirection { .. })
        ));
        assert_eq!(parent(&Tile::ROOT, None), Err(CoordError::RootHasNoParent));
    }

    #[test]
    fn test_children_order() {
        let kids = children(&Tile::new(1, 1, 0), None).unwrap();
        assert_eq!(
            kids,
            vec![
                Tile::new(2, 2, 0),
                Tile::new(2, 3, 0),
                Tile::new(2, 3, 1),
                Tile::new(2, 2, 1),
            ]
        );
    }

    #[test]
    fn test_children_two_levels() {
        let kids = children(&Tile::ROOT, Some(2)).unwrap();
        assert_eq!(kids.len(), 16);
        assert!(kids.iter().all(|t| t.z == 2));
        // Breadth-first: first child of the first level-1 tile comes first
        assert_eq!(kids[0], Tile::new(2, 0, 0));
        assert_eq!(kids[4], Tile::new(2, 2, 0));
    }

    #[test]
    fn test_children_same_zoom_returns_self() {
        let tile = Tile::new(4, 3, 3);
        assert_eq!(children(&tile, Some(4)).unwrap(), vec![tile]);
    }

    #[test]
    fn test_children_rejects_lower_zoom() {
        assert!(matches!(
            children(&Tile::new(4, 3, 3), Some(2)),
            Err(CoordError::ZoomDirection { .. })
        ));
    }

    #[test]
    fn test_children_depth_is_capped() {
        assert!(matches!(
            children(&Tile::ROOT, Some(30)),
            Err(CoordError::TooManyDescendants { depth: 30, .. })
        ));
        assert!(children(&Tile::new(20, 0, 0), Some(20 + MAX_CHILDREN_DEPTH + 1)).is_err());
        assert_eq!(children(&Tile::new(20, 0, 0), Some(22)).unwrap().len(), 16);
    }

    #[test]
    fn test_point_in_polygon() {
        let square = [
            LonLat::new(0.0, 0.0),
            LonLat::new(10.0, 0.0),
            LonLat::new(10.0, 10.0),
            LonLat::new(0.0, 10.0),
            LonLat::new(0.0, 0.0),
        ];
        assert!(point_in_polygon(LonLat::new(5.0, 5.0), &square));
        assert!(!point_in_polygon(LonLat::new(15.0, 5.0), &square));
        assert!(!point_in_polygon(LonLat::new(5.0, 5.0), &[]));
    }

    #[test]
    fn test_point_in_self_intersecting_polygon_does_not_panic() {
        let bowtie = [
            LonLat::new(0.0, 0.0),
            LonLat::new(10.0, 10.0),
            LonLat::new(10.0, 0.0),
            LonLat::new(0.0, 10.0),
        ];
        let _ = point_in_polygon(LonLat::new(5.0, 5.0), &bowtie);
        let _ = point_in_polygon(LonLat::new(5.0, 0.0), &bowtie);
    }

    #[test]
    fn test_parse_lonlat_clamps() {
        assert_eq!(parse_lonlat(190.0, -95.0), LonLat::new(180.0, -90.0));
    }

    #[test]
    fn test_parse_tile_validates() {
        assert!(parse_tile(2, 3, 3).is_ok());
        assert!(matches!(
            parse_tile(2, 4, 0),
            Err(CoordError::TileOutOfRange { .. })
        ));
    }

    #[test]
    fn test_parse_zoom() {
        assert_eq!(parse_zoom("12").unwrap(), 12);
        assert_eq!(parse_zoom(" 3.0 ").unwrap(), 3);
        assert!(matches!(parse_zoom("2.5"), Err(CoordError::InvalidZoom(_))));
        assert!(matches!(parse_zoom("-1"), Err(CoordError::InvalidZoom(_))));
        assert!(matches!(parse_zoom("abc"), Err(CoordError::InvalidZoom(_))));
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_roundtrip_within_one_tile(
                lat in -85.05..85.05_f64,
                lon in -180.0..180.0_f64,
                zoom in 0u8..=18
            ) {
                let tile = lonlat_to_tile(LonLat::new(lon, lat), zoom);
                let back = tile_to_lonlat(&tile, Corner::TopLeft);

                let tile_size = 360.0 / 2.0_f64.powi(zoom as i32);
                prop_assert!((back.lon - lon).abs() <= tile_size);
                prop_assert!((back.lat - lat).abs() <= tile_size);
            }

            #[test]
            fn test_tile_indices_in_bounds(
                lat in -90.0..90.0_f64,
                lon in -180.0..=180.0_f64,
                zoom in 0u8..=18
            ) {
                let tile = lonlat_to_tile(LonLat::new(lon, lat), zoom);
                let n = 1u32 << zoom;
                prop_assert!(tile.x < n);
                prop_assert!(tile.y < n);
            }

            #[test]
            fn test_quadkey_roundtrip(
                zoom in 1u8..=20,
                x_raw in 0u32..u32::MAX,
                y_raw in 0u32..u32::MAX
            ) {
                let n = 1u32 << zoom;
                let tile = Tile::new(zoom, x_raw % n, y_raw % n);
                prop_assert_eq!(parse_quadkey(&quadkey(&tile))?, tile);
            }

            #[test]
            fn test_children_then_parent_recovers_ancestor(
                zoom in 0u8..=12,
                x_raw in 0u32..4096,
                y_raw in 0u32..4096,
                depth in 1u8..=2
            ) {
                let n = 1u32 << zoom;
                let tile = Tile::new(zoom, x_raw % n, y_raw % n);

                for child in children(&tile, Some(zoom + depth))? {
                    prop_assert_eq!(parent(&child, Some(zoom))?, tile);
                }
            }
        }
    }
}
