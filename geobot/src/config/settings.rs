//! Configuration settings structs.

use std::path::PathBuf;

use super::defaults::*;
use crate::pipeline::OutputFormat;
use crate::provider::DEFAULT_RETINA_SUFFIX;
use crate::tileset::DEFAULT_MAX_ZOOM;

/// Complete contents of `config.ini`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub tile_server: TileServerSettings,
    pub render: RenderSettings,
    pub download: DownloadSettings,
}

/// `[tile_server]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct TileServerSettings {
    /// Server root; tiles are fetched from `{url}/{z}/{x}/{y}.{ext}`
    pub url: String,
    pub access_token: Option<String>,
    /// Query parameter name carrying the token
    pub token_param: String,
    pub extension: String,
    pub retina: bool,
    pub retina_suffix: String,
    /// Watermark text
    pub attribution: Option<String>,
}

impl Default for TileServerSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_TILE_URL.to_string(),
            access_token: None,
            token_param: DEFAULT_TOKEN_PARAM.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            retina: false,
            retina_suffix: DEFAULT_RETINA_SUFFIX.to_string(),
            attribution: None,
        }
    }
}

/// `[render]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub visible_tiles: usize,
    /// Output width; 0 disables resizing
    pub width: u32,
    pub height: u32,
    pub crop: bool,
    pub max_zoom: u8,
    pub icon_font: Option<PathBuf>,
    /// Replaces the bundled watermark font
    pub watermark_font: Option<PathBuf>,
    pub output_format: OutputFormat,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            visible_tiles: DEFAULT_VISIBLE_TILES,
            width: DEFAULT_OUTPUT_WIDTH,
            height: DEFAULT_OUTPUT_HEIGHT,
            crop: false,
            max_zoom: DEFAULT_MAX_ZOOM,
            icon_font: None,
            watermark_font: None,
            output_format: OutputFormat::Png,
        }
    }
}

impl RenderSettings {
    /// Target output size, or `None` when resizing is disabled.
    pub fn output_size(&self) -> Option<(u32, u32)> {
        (self.width > 0 && self.height > 0).then_some((self.width, self.height))
    }
}

/// `[download]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    /// Per-request timeout in seconds
    pub timeout: u64,
    /// Maximum in-flight tile requests
    pub concurrency: usize,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            concurrency: DEFAULT_DOWNLOAD_CONCURRENCY,
        }
    }
}
