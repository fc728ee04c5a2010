//! geobot CLI - Command-line interface
//!
//! Renders map images for a bounding box from a slippy-map tile server.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use geobot::coord::Bbox;

use commands::render::RenderArgs;
use commands::tiles::TilesArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "geobot")]
#[command(version, about = "Render map images from web map tiles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a bounding box to an image file
    Render {
        /// Bounding box as west,north,east,south in degrees
        #[arg(long, allow_hyphen_values = true)]
        bbox: Bbox,

        /// Output file (.png or .jpg)
        #[arg(long, short)]
        output: PathBuf,

        /// GeoJSON Feature or FeatureCollection to draw
        #[arg(long)]
        features: Option<PathBuf>,

        /// Crop the image to the bounding box
        #[arg(long)]
        crop: bool,

        /// Output width in pixels (0 keeps the mosaic size)
        #[arg(long, requires = "height")]
        width: Option<u32>,

        /// Output height in pixels
        #[arg(long, requires = "width")]
        height: Option<u32>,

        /// Approximate number of tiles covering the bounding box
        #[arg(long)]
        visible_tiles: Option<String>,

        /// Watermark text drawn at the bottom-right corner
        #[arg(long)]
        watermark: Option<String>,

        /// Configuration file (default: ~/.geobot/config.ini)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the tiles covering a bounding box
    Tiles {
        /// Bounding box as west,north,east,south in degrees
        #[arg(long, allow_hyphen_values = true)]
        bbox: Bbox,

        /// Zoom level
        #[arg(long, conflicts_with = "visible_tiles")]
        zoom: Option<String>,

        /// Approximate number of tiles, used to pick the zoom (default: 4)
        #[arg(long)]
        visible_tiles: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print a quadkey's tile and bounding box as GeoJSON
    Quadkey {
        /// Quadkey made of the digits 0-3
        key: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            bbox,
            output,
            features,
            crop,
            width,
            height,
            visible_tiles,
            watermark,
            config,
        } => {
            commands::render::run(RenderArgs {
                bbox,
                output,
                features,
                crop,
                size: width.zip(height),
                visible_tiles,
                watermark,
                config,
            })
            .await
        }
        Commands::Tiles {
            bbox,
            zoom,
            visible_tiles,
            json,
        } => commands::tiles::run(TilesArgs {
            bbox,
            zoom,
            visible_tiles,
            json,
        }),
        Commands::Quadkey { key } => commands::quadkey::run(&key),
    };

    if let Err(e) = result {
        e.exit();
    }
}
