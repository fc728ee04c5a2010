//! Render command - draw a bounding box to an image file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use geobot::config::ConfigFile;
use geobot::coord::Bbox;
use geobot::overlay::parse_features;
use geobot::pipeline::OutputFormat;
use geobot::service::{MapService, RenderOptions, ServiceError};
use geobot::tileset::parse_tile_count;
use geojson::Feature;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the render command.
pub struct RenderArgs {
    pub bbox: Bbox,
    pub output: PathBuf,
    pub features: Option<PathBuf>,
    pub crop: bool,
    pub size: Option<(u32, u32)>,
    pub visible_tiles: Option<String>,
    pub watermark: Option<String>,
    pub config: Option<PathBuf>,
}

/// Run the render command.
pub async fn run(args: RenderArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.config.as_deref())?;
    runner.log_startup("render");
    let config = runner.config();

    let options = resolve_options(&args, config)?;
    let features = match &args.features {
        Some(path) => load_features(path)?,
        None => Vec::new(),
    };

    let service = MapService::from_config(config).map_err(CliError::ServiceCreation)?;

    println!("Rendering {}", args.bbox);
    let start = Instant::now();
    let image = service.render_with(&args.bbox, &features, &options).await?;

    fs::write(&args.output, &image.bytes).map_err(|error| CliError::FileWrite {
        path: args.output.clone(),
        error,
    })?;

    println!(
        "Wrote {}x{} {} to {} in {:.2}s",
        image.width,
        image.height,
        image.format,
        args.output.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Merges command-line flags over the configured defaults.
fn resolve_options(args: &RenderArgs, config: &ConfigFile) -> Result<RenderOptions, CliError> {
    let mut options = RenderOptions::from_config(config);

    if let Some(count) = &args.visible_tiles {
        options = options.with_visible_tiles(parse_tile_count(count)?);
    }
    if let Some((width, height)) = args.size {
        let out_size = (width > 0 && height > 0).then_some((width, height));
        options = options.with_out_size(out_size);
    }
    if args.crop {
        options = options.with_crop(true);
    }
    if let Some(text) = &args.watermark {
        options = options.with_watermark(text.clone());
    }
    if let Some(format) = format_from_extension(&args.output) {
        options = options.with_output_format(format);
    }
    Ok(options)
}

fn format_from_extension(path: &Path) -> Option<OutputFormat> {
    path.extension()?.to_str()?.parse().ok()
}

fn load_features(path: &Path) -> Result<Vec<Feature>, CliError> {
    let document = fs::read_to_string(path).map_err(|error| CliError::FileRead {
        path: path.to_path_buf(),
        error,
    })?;
    parse_features(&document).map_err(|e| CliError::Render(ServiceError::Overlay(e)))
}
