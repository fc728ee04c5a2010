//! Tile set resolution for bounding boxes.
//!
//! Given a bbox and a desired number of visible tiles, picks the zoom level
//! and enumerates the rectangular tile grid covering the bbox. Boxes that
//! straddle the antimeridian are split in two and their grids unioned.

use std::collections::HashSet;

use crate::coord::{lonlat_to_tile, tile_to_bbox, Bbox, CoordError, LonLat, Tile, MAX_LAT, MIN_LAT};

/// Inward nudge applied at tile-grid edges to avoid picking up an extra
/// row or column from floating-point noise.
pub const EDGE_EPSILON: f64 = 1e-11;

/// Upper bound for zoom inference.
///
/// Point-like boxes never grow past one tile, so the search needs a ceiling.
pub const DEFAULT_MAX_ZOOM: u8 = 18;

/// Ordered collection of tiles at a common zoom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSet {
    zoom: u8,
    tiles: Vec<Tile>,
}

impl TileSet {
    /// Zoom level shared by every tile in the set.
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn contains(&self, tile: &Tile) -> bool {
        self.tiles.contains(tile)
    }

    /// Sorted distinct x indices (mosaic columns).
    pub fn columns(&self) -> Vec<u32> {
        sorted_distinct(self.tiles.iter().map(|t| t.x))
    }

    /// Sorted distinct y indices (mosaic rows).
    pub fn rows(&self) -> Vec<u32> {
        sorted_distinct(self.tiles.iter().map(|t| t.y))
    }

    /// Whether some columns between the first and last are absent.
    ///
    /// True for sets split at the antimeridian. Their mosaic places the
    /// x = 0 column right after the x = n - 1 column, so its pixels no
    /// longer map linearly onto the envelope.
    pub fn has_column_gap(&self) -> bool {
        let columns = self.columns();
        match (columns.first(), columns.last()) {
            (Some(first), Some(last)) => (last - first) as usize + 1 != columns.len(),
            _ => false,
        }
    }

    /// Geographic envelope of the whole set, see [`tileset_to_bbox`].
    pub fn to_bbox(&self) -> Option<Bbox> {
        tileset_to_bbox(&self.tiles)
    }
}

impl<'a> IntoIterator for &'a TileSet {
    type Item = &'a Tile;
    type IntoIter = std::slice::Iter<'a, Tile>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles.iter()
    }
}

fn sorted_distinct(values: impl Iterator<Item = u32>) -> Vec<u32> {
    let mut v: Vec<u32> = values.collect();
    v.sort_unstable();
    v.dedup();
    v
}

/// Returns every tile at `zoom` overlapped by `bbox`.
///
/// Corners are regularized, latitude is clamped to the Web Mercator range
/// and longitude to ±180°. A box with `west > east` is split into
/// `[-180, east]` and `[west, 180]`; tiles present in both halves appear once.
pub fn bbox_to_tileset(bbox: &Bbox, zoom: u8) -> TileSet {
    let ne = LonLat::new(bbox.east, bbox.north).regularized();
    let sw = LonLat::new(bbox.west, bbox.south).regularized();
    let (west, north, east, south) = (sw.lon, ne.lat, ne.lon, sw.lat);

    let parts = if west > east {
        vec![
            Bbox::new(-180.0, north, east, south),
            Bbox::new(west, north, 180.0, south),
        ]
    } else {
        vec![Bbox::new(west, north, east, south)]
    };

    let mut seen = HashSet::new();
    let mut tiles = Vec::new();

    for part in parts {
        let w = part.west.max(-180.0);
        let n = part.north.min(MAX_LAT);
        let e = part.east.min(180.0);
        let s = part.south.max(MIN_LAT);

        let first = lonlat_to_tile(LonLat::new(w, n), zoom);
        let last = lonlat_to_tile(LonLat::new(e - EDGE_EPSILON, s + EDGE_EPSILON), zoom);

        let (x1, x2) = (first.x.min(last.x), first.x.max(last.x));
        let (y1, y2) = (first.y.min(last.y), first.y.max(last.y));

        for x in x1..=x2 {
            for y in y1..=y2 {
                let tile = Tile::new(zoom, x, y);
                if seen.insert(tile) {
                    tiles.push(tile);
                }
            }
        }
    }

    TileSet { zoom, tiles }
}

/// Infers the zoom at which `bbox` spans about `target_tile_count` tiles.
///
/// Brute-force increasing search from zoom 0, capped at [`DEFAULT_MAX_ZOOM`].
pub fn infer_zoom(bbox: &Bbox, target_tile_count: usize) -> Result<u8, CoordError> {
    infer_zoom_within(bbox, target_tile_count, DEFAULT_MAX_ZOOM)
}

/// [`infer_zoom`] with an explicit zoom ceiling.
///
/// Keeps increasing zoom while the next level still fits in the target
/// count, then moves up one more level if the chosen zoom is still short of
/// the target. Tile counts are monotone in zoom, so no backtracking happens.
pub fn infer_zoom_within(
    bbox: &Bbox,
    target_tile_count: usize,
    max_zoom: u8,
) -> Result<u8, CoordError> {
    validate_tile_count(target_tile_count)?;

    let mut zoom = 0;
    while zoom < max_zoom && target_tile_count >= bbox_to_tileset(bbox, zoom + 1).len() {
        zoom += 1;
    }
    if zoom < max_zoom && target_tile_count > bbox_to_tileset(bbox, zoom).len() {
        zoom += 1;
    }
    Ok(zoom)
}

/// Resolves the zoom like [`infer_zoom`] and returns its tile set.
///
/// Each level's tile set is computed once and reused.
pub fn fit_tileset(bbox: &Bbox, target_tile_count: usize) -> Result<TileSet, CoordError> {
    fit_tileset_within(bbox, target_tile_count, DEFAULT_MAX_ZOOM)
}

/// [`fit_tileset`] with an explicit zoom ceiling.
pub fn fit_tileset_within(
    bbox: &Bbox,
    target_tile_count: usize,
    max_zoom: u8,
) -> Result<TileSet, CoordError> {
    validate_tile_count(target_tile_count)?;

    let mut current = bbox_to_tileset(bbox, 0);
    while current.zoom < max_zoom {
        let next = bbox_to_tileset(bbox, current.zoom + 1);
        if target_tile_count >= next.len() {
            current = next;
            continue;
        }
        if target_tile_count > current.len() {
            current = next;
        }
        break;
    }
    Ok(current)
}

/// Envelope of all tiles' bboxes, nudged inward by [`EDGE_EPSILON`].
///
/// Returns `None` for an empty slice.
pub fn tileset_to_bbox(tiles: &[Tile]) -> Option<Bbox> {
    let mut iter = tiles.iter().map(tile_to_bbox);
    let first = iter.next()?;

    let envelope = iter.fold(first, |acc, b| Bbox {
        west: acc.west.min(b.west),
        north: acc.north.max(b.north),
        east: acc.east.max(b.east),
        south: acc.south.min(b.south),
    });

    Some(Bbox {
        west: envelope.west + EDGE_EPSILON,
        north: envelope.north - EDGE_EPSILON,
        east: envelope.east - EDGE_EPSILON,
        south: envelope.south + EDGE_EPSILON,
    })
}

/// Parses a textual visible-tile count; it must be a positive integer.
pub fn parse_tile_count(value: &str) -> Result<usize, CoordError> {
    let invalid = || CoordError::InvalidTileCount(value.to_string());
    let parsed: f64 = value.trim().parse().map_err(|_| invalid())?;

    if !parsed.is_finite() || parsed.fract() != 0.0 || parsed < 1.0 || parsed > usize::MAX as f64
    {
        return Err(invalid());
    }
    Ok(parsed as usize)
}

fn validate_tile_count(count: usize) -> Result<(), CoordError> {
    if count == 0 {
        return Err(CoordError::InvalidTileCount(count.to_string()));
    }
    Ok(())
}
