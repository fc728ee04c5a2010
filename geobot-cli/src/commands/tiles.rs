//! Tiles command - list the tiles covering a bounding box.

use geobot::coord::{parse_zoom, Bbox};
use geobot::tileset::{bbox_to_tileset, fit_tileset, parse_tile_count, TileSet};
use serde_json::json;

use crate::error::CliError;

/// Visible tile count used when neither a zoom nor a count is given.
const DEFAULT_VISIBLE_TILES: &str = "4";

/// Arguments for the tiles command.
pub struct TilesArgs {
    pub bbox: Bbox,
    pub zoom: Option<String>,
    pub visible_tiles: Option<String>,
    pub json: bool,
}

/// Run the tiles command.
pub fn run(args: TilesArgs) -> Result<(), CliError> {
    let tileset = resolve(&args)?;
    print!("{}", format_tiles(&tileset, args.json)?);
    Ok(())
}

fn resolve(args: &TilesArgs) -> Result<TileSet, CliError> {
    if let Some(zoom) = &args.zoom {
        return Ok(bbox_to_tileset(&args.bbox, parse_zoom(zoom)?));
    }
    let count = args.visible_tiles.as_deref().unwrap_or(DEFAULT_VISIBLE_TILES);
    Ok(fit_tileset(&args.bbox, parse_tile_count(count)?)?)
}

fn format_tiles(tileset: &TileSet, as_json: bool) -> Result<String, CliError> {
    if as_json {
        let tiles: Vec<_> = tileset
            .iter()
            .map(|tile| json!({ "tile": tile, "quadkey": tile.quadkey() }))
            .collect();
        let document = json!({
            "zoom": tileset.zoom(),
            "extent": tileset.to_bbox(),
            "tiles": tiles,
        });
        return Ok(format!("{}\n", serde_json::to_string_pretty(&document)?));
    }

    let mut out = format!("zoom {} ({} tiles)\n", tileset.zoom(), tileset.len());
    for tile in tileset {
        out.push_str(&format!("{}\t{}\n", tile, tile.quadkey()));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> TilesArgs {
        TilesArgs {
            bbox: Bbox::new(-0.1, 51.55, 0.1, 51.45),
            zoom: None,
            visible_tiles: None,
            json: false,
        }
    }

    #[test]
    fn test_explicit_zoom() {
        let mut args = args();
        args.zoom = Some("2".to_string());
        let tileset = resolve(&args).unwrap();

        assert_eq!(tileset.zoom(), 2);
        // Longitude 0 sits on a tile boundary at every zoom above 0.
        assert_eq!(tileset.columns(), vec![1, 2]);
    }

    #[test]
    fn test_default_visible_tiles() {
        let tileset = resolve(&args()).unwrap();
        assert_eq!(tileset, fit_tileset(&args().bbox, 4).unwrap());
    }

    #[test]
    fn test_invalid_zoom() {
        let mut args = args();
        args.zoom = Some("-1".to_string());
        assert!(matches!(resolve(&args), Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn test_text_output_lists_quadkeys() {
        let mut args = args();
        args.zoom = Some("1".to_string());
        let text = format_tiles(&resolve(&args).unwrap(), false).unwrap();

        assert!(text.starts_with("zoom 1 (2 tiles)\n"));
        assert!(text.contains("1/0/0\t0\n"));
        assert!(text.contains("1/1/0\t1\n"));
    }

    #[test]
    fn test_json_output() {
        let mut args = args();
        args.zoom = Some("1".to_string());
        let text = format_tiles(&resolve(&args).unwrap(), true).unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["zoom"], 1);
        assert_eq!(value["tiles"].as_array().unwrap().len(), 2);
        assert_eq!(value["tiles"][0]["quadkey"], "0");
        assert_eq!(value["tiles"][0]["tile"]["z"], 1);
    }
}
