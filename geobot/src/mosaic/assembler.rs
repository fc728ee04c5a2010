//! Swath-based mosaic assembly.
//!
//! Tiles are stacked per column into vertical swaths (ascending y), then the
//! swaths are laid side by side (ascending x). The result covers the union
//! envelope of the tile set.

use image::{imageops, RgbaImage};
use thiserror::Error;
use tracing::debug;

use super::{Mosaic, TileGrid};
use crate::tileset::{tileset_to_bbox, TileSet};

/// Errors that can occur while assembling a mosaic.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssemblyError {
    #[error("Cannot assemble an empty tile set")]
    EmptyTileSet,

    #[error("No image for tile {zoom}/{x}/{y}")]
    MissingTile { zoom: u8, x: u32, y: u32 },

    #[error(
        "Tile {x}/{y} is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}"
    )]
    DimensionMismatch {
        x: u32,
        y: u32,
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
}

/// Assembles the tiles of `tileset` into a single georeferenced image.
///
/// Every `(column, row)` pair spanned by the set must be present in `grid`
/// and all tiles must share one size.
pub fn assemble(tileset: &TileSet, grid: &TileGrid) -> Result<Mosaic, AssemblyError> {
    let extent = tileset_to_bbox(tileset.tiles()).ok_or(AssemblyError::EmptyTileSet)?;
    let columns = tileset.columns();
    let rows = tileset.rows();

    let zoom = tileset.zoom();
    let (tile_width, tile_height) = grid
        .get(columns[0], rows[0])
        .map(|t| t.dimensions())
        .ok_or(AssemblyError::MissingTile {
            zoom,
            x: columns[0],
            y: rows[0],
        })?;

    let mut canvas = RgbaImage::new(tile_width * columns.len() as u32, tile_height * rows.len() as u32);

    for (col_index, &x) in columns.iter().enumerate() {
        let mut swath = RgbaImage::new(tile_width, tile_height * rows.len() as u32);

        for (row_index, &y) in rows.iter().enumerate() {
            let tile = grid
                .get(x, y)
                .ok_or(AssemblyError::MissingTile { zoom, x, y })?;

            if tile.dimensions() != (tile_width, tile_height) {
                return Err(AssemblyError::DimensionMismatch {
                    x,
                    y,
                    expected_width: tile_width,
                    expected_height: tile_height,
                    actual_width: tile.width(),
                    actual_height: tile.height(),
                });
            }

            imageops::replace(&mut swath, tile, 0, (row_index as u32 * tile_height) as i64);
        }

        imageops::replace(&mut canvas, &swath, (col_index as u32 * tile_width) as i64, 0);
    }

    debug!(
        zoom,
        columns = columns.len(),
        rows = rows.len(),
        width = canvas.width(),
        height = canvas.height(),
        "Assembled mosaic"
    );

    Ok(Mosaic::new(canvas, extent))
}
