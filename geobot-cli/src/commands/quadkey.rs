//! Quadkey command - decode a quadkey to its tile and bounding box.

use geobot::coord::{bbox_to_geojson, parse_quadkey};
use serde_json::{json, Map};

use crate::error::CliError;

/// Run the quadkey command.
pub fn run(key: &str) -> Result<(), CliError> {
    println!("{}", describe(key)?);
    Ok(())
}

/// The tile's bbox as a GeoJSON polygon feature, tagged with the tile.
fn describe(key: &str) -> Result<String, CliError> {
    let tile = parse_quadkey(key)?;

    let mut properties = Map::new();
    properties.insert("quadkey".to_string(), json!(key));
    properties.insert("tile".to_string(), json!(tile.to_string()));

    let feature = bbox_to_geojson(&tile.to_bbox(), Some(properties));
    Ok(serde_json::to_string_pretty(&feature)?)
}
