//! Coordinate type definitions

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Web Mercator valid latitude range, as used when clamping bounding boxes.
pub const MIN_LAT: f64 = -85.051129;
pub const MAX_LAT: f64 = 85.051129;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Highest zoom level whose tile indices still fit comfortably in `u32`.
pub const MAX_ZOOM: u8 = 30;

/// Geographic point as (longitude, latitude) in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    /// Creates a point without regularization.
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Clamps longitude to [-180, 180] and latitude to [-90, 90].
    ///
    /// Out-of-range values are clamped, never rejected.
    pub fn regularized(self) -> Self {
        Self {
            lon: self.lon.clamp(MIN_LON, MAX_LON),
            lat: self.lat.clamp(-90.0, 90.0),
        }
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lon, self.lat)
    }
}

/// Which point of a tile to project back to geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Corner {
    /// North-west corner
    #[default]
    TopLeft,
    /// Tile center
    Center,
    /// South-east corner
    BottomRight,
}

/// A slippy-map tile in the Web Mercator pyramid.
///
/// `x` grows eastward and `y` grows southward, both in `[0, 2^z)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tile {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl Tile {
    /// The root tile covering the whole world.
    pub const ROOT: Tile = Tile { z: 0, x: 0, y: 0 };

    pub const fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Number of tiles along one axis at this tile's zoom.
    #[inline]
    pub fn axis_len(&self) -> u64 {
        1u64 << self.z
    }

    /// Projects the requested corner of the tile back to longitude/latitude.
    pub fn lonlat(&self, corner: Corner) -> LonLat {
        let (x, y) = match corner {
            Corner::TopLeft => (self.x as f64, self.y as f64),
            Corner::Center => (self.x as f64 + 0.5, self.y as f64 + 0.5),
            Corner::BottomRight => (self.x as f64 + 1.0, self.y as f64 + 1.0),
        };

        let n = 2.0_f64.powi(self.z as i32);
        let lon = x / n * 360.0 - 180.0;
        let lat_rad = (PI * (1.0 - 2.0 * y / n)).sinh().atan();

        LonLat::new(lon, lat_rad.to_degrees())
    }

    /// Returns the geographic rectangle covered by this tile.
    pub fn to_bbox(&self) -> Bbox {
        super::tile_to_bbox(self)
    }

    /// Returns the quadkey string for this tile.
    pub fn quadkey(&self) -> String {
        super::quadkey(self)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Axis-aligned rectangle in lon/lat space.
///
/// `west > east` signals a box straddling the antimeridian. No ordering is
/// assumed between `north` and `south` on input; "north" is conventionally
/// the larger latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bbox {
    pub west: f64,
    pub north: f64,
    pub east: f64,
    pub south: f64,
}

impl Bbox {
    pub const fn new(west: f64, north: f64, east: f64, south: f64) -> Self {
        Self {
            west,
            north,
            east,
            south,
        }
    }

    /// Raw `(west, north, east, south)` tuple.
    pub fn to_tuple(&self) -> (f64, f64, f64, f64) {
        (self.west, self.north, self.east, self.south)
    }

    /// `(south, west, north, east)` ordering used by OSM / Overpass queries.
    pub fn to_osm(&self) -> (f64, f64, f64, f64) {
        (self.south, self.west, self.north, self.east)
    }

    /// Whether the box wraps across the ±180° meridian.
    pub fn straddles_antimeridian(&self) -> bool {
        self.west > self.east
    }

    /// Longitude span in degrees (absolute).
    pub fn width_deg(&self) -> f64 {
        (self.west - self.east).abs()
    }

    /// Latitude span in degrees (absolute).
    pub fn height_deg(&self) -> f64 {
        (self.north - self.south).abs()
    }
}

impl fmt::Display for Bbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[W {}, N {}, E {}, S {}]",
            self.west, self.north, self.east, self.south
        )
    }
}

/// Parses `"west,north,east,south"`.
impl FromStr for Bbox {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| {
                let part = part.trim();
                part.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| CoordError::InvalidNumber(part.to_string()))
            })
            .collect::<Result<Vec<f64>, _>>()?;

        match values[..] {
            [west, north, east, south] => Ok(Bbox::new(west, north, east, south)),
            _ => Err(CoordError::InvalidNumber(s.to_string())),
        }
    }
}

/// Structural input errors for geodesy and tile-set resolution.
///
/// These are always surfaced to the caller and never silently corrected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Zoom target is not a non-negative integer in range
    #[error("Invalid zoom: '{0}' (must be an integer between 0 and {max})", max = MAX_ZOOM)]
    InvalidZoom(String),

    /// Parent requested below / children requested above the current zoom
    #[error("Requested zoom {requested} is on the wrong side of tile zoom {current} for {operation}")]
    ZoomDirection {
        operation: &'static str,
        requested: u8,
        current: u8,
    },

    /// Descendant expansion would produce more tiles than allowed
    #[error("Expanding {depth} zoom levels exceeds the limit of {max}")]
    TooManyDescendants { depth: u8, max: u8 },

    /// The root tile has no parent
    #[error("Tile 0/0/0 is the root tile and has no parent")]
    RootHasNoParent,

    /// Quadkey contains a digit outside 0-3
    #[error("Unexpected quadkey digit '{digit}' in '{quadkey}'")]
    InvalidQuadkeyDigit { quadkey: String, digit: char },

    /// Quadkey is longer than the maximum zoom
    #[error("Quadkey '{0}' is longer than {max} digits", max = MAX_ZOOM)]
    QuadkeyTooLong(String),

    /// Tile indices outside [0, 2^z)
    #[error("Tile {z}/{x}/{y} is outside the {z} zoom grid")]
    TileOutOfRange { z: u8, x: u32, y: u32 },

    /// Visible tile count is not a positive integer
    #[error("Visible tile count must be a positive integer, got '{0}'")]
    InvalidTileCount(String),

    /// A textual coordinate could not be parsed
    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
}
