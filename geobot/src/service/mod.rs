//! Map rendering service
//!
//! [`MapService`] ties the stages together: it resolves a bounding box to a
//! tile set, fetches the tiles through the injected provider, assembles the
//! mosaic and runs the image pipeline.
//!
//! ```ignore
//! use geobot::config::ConfigFile;
//! use geobot::coord::Bbox;
//! use geobot::service::MapService;
//!
//! let config = ConfigFile::load()?.with_env_overrides();
//! let service = MapService::from_config(&config)?;
//! let image = service.render(&Bbox::new(-0.1, 51.55, 0.1, 51.45), &[]).await?;
//! std::fs::write("london.png", &image.bytes)?;
//! ```

use std::time::Instant;

use geojson::Feature;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigFile, ConfigFileError, DEFAULT_OUTPUT_HEIGHT, DEFAULT_OUTPUT_WIDTH};
use crate::coord::{Bbox, CoordError};
use crate::font::{FontError, LoadedFont};
use crate::mosaic::{assemble, AssemblyError};
use crate::orchestrator::{FetchError, FetchOptions, TileOrchestrator};
use crate::overlay::{parse_features, OverlayError, OverlayRenderer};
use crate::pipeline::{
    ImagePipeline, OutputFormat, PipelineError, PipelineRequest, RenderedImage, ResizeMode,
    WatermarkStyle,
};
use crate::provider::{AsyncReqwestClient, AsyncTileProvider, ProviderError, TileServerProvider};
use crate::tileset::{fit_tileset_within, DEFAULT_MAX_ZOOM};

/// Errors that can occur while rendering a map.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Coord(#[from] CoordError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Overlay(#[from] OverlayError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Font(#[from] FontError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Config(#[from] ConfigFileError),
}

/// Per-service rendering parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Target number of tiles covering the bbox
    pub visible_tiles: usize,
    /// Final image size; `None` keeps the mosaic size
    pub out_size: Option<(u32, u32)>,
    /// Crop to the requested bbox before resizing
    pub crop: bool,
    pub watermark: Option<String>,
    pub extension: String,
    pub retina: bool,
    pub output_format: OutputFormat,
    pub max_zoom: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            visible_tiles: 4,
            out_size: Some((DEFAULT_OUTPUT_WIDTH, DEFAULT_OUTPUT_HEIGHT)),
            crop: false,
            watermark: None,
            extension: "png".to_string(),
            retina: false,
            output_format: OutputFormat::Png,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

impl RenderOptions {
    pub fn from_config(config: &ConfigFile) -> Self {
        Self {
            visible_tiles: config.render.visible_tiles,
            out_size: config.render.output_size(),
            crop: config.render.crop,
            watermark: config.tile_server.attribution.clone(),
            extension: config.tile_server.extension.clone(),
            retina: config.tile_server.retina,
            output_format: config.render.output_format,
            max_zoom: config.render.max_zoom,
        }
    }

    pub fn with_visible_tiles(mut self, visible_tiles: usize) -> Self {
        self.visible_tiles = visible_tiles;
        self
    }

    pub fn with_out_size(mut self, out_size: Option<(u32, u32)>) -> Self {
        self.out_size = out_size;
        self
    }

    pub fn with_crop(mut self, crop: bool) -> Self {
        self.crop = crop;
        self
    }

    pub fn with_watermark(mut self, watermark: impl Into<String>) -> Self {
        self.watermark = Some(watermark.into());
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_retina(mut self, retina: bool) -> Self {
        self.retina = retina;
        self
    }

    pub fn with_max_zoom(mut self, max_zoom: u8) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    /// Cropping keeps the bbox aspect ratio, otherwise the output is stretched
    /// to the exact size.
    fn resize_mode(&self) -> Option<ResizeMode> {
        self.out_size.map(|(width, height)| {
            if self.crop {
                ResizeMode::Harmonious { width, height }
            } else {
                ResizeMode::Exact { width, height }
            }
        })
    }

    fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            extension: self.extension.clone(),
            retina: self.retina,
        }
    }
}

/// Renders bounding boxes to map images.
pub struct MapService<P: AsyncTileProvider> {
    orchestrator: TileOrchestrator<P>,
    pipeline: ImagePipeline,
    options: RenderOptions,
}

impl<P: AsyncTileProvider> MapService<P> {
    pub fn new(orchestrator: TileOrchestrator<P>, pipeline: ImagePipeline) -> Self {
        Self {
            orchestrator,
            pipeline,
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Renders `bbox` with `features` drawn on top.
    pub async fn render(
        &self,
        bbox: &Bbox,
        features: &[Feature],
    ) -> Result<RenderedImage, ServiceError> {
        self.render_with(bbox, features, &self.options).await
    }

    /// Renders with per-call options instead of the service defaults.
    pub async fn render_with(
        &self,
        bbox: &Bbox,
        features: &[Feature],
        options: &RenderOptions,
    ) -> Result<RenderedImage, ServiceError> {
        let started = Instant::now();

        let tileset = fit_tileset_within(bbox, options.visible_tiles, options.max_zoom)?;
        debug!(
            bbox = %bbox,
            zoom = tileset.zoom(),
            tiles = tileset.len(),
            "Resolved tile set"
        );
        if tileset.has_column_gap() && !features.is_empty() {
            warn!(
                bbox = %bbox,
                features = features.len(),
                "Tile set wraps the antimeridian, features will be misplaced"
            );
        }

        let fetched = self
            .orchestrator
            .fetch(&tileset, &options.fetch_options())
            .await?;
        let mosaic = assemble(&tileset, &fetched.grid)?;

        let request = PipelineRequest {
            features,
            crop: options.crop.then_some(*bbox),
            resize: options.resize_mode(),
            watermark: options.watermark.clone(),
        };
        let image = self
            .pipeline
            .render(mosaic, &request, options.output_format)?;

        info!(
            bbox = %bbox,
            zoom = tileset.zoom(),
            tiles = tileset.len(),
            failed = fetched.failure_count(),
            features = features.len(),
            width = image.width,
            height = image.height,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Map rendered"
        );
        Ok(image)
    }

    /// Renders with features taken from a GeoJSON document.
    pub async fn render_geojson(
        &self,
        bbox: &Bbox,
        document: &str,
    ) -> Result<RenderedImage, ServiceError> {
        let features = parse_features(document)?;
        self.render(bbox, &features).await
    }
}

impl MapService<TileServerProvider<AsyncReqwestClient>> {
    /// Builds a service against the configured tile server.
    ///
    /// Fonts named in the configuration are loaded eagerly, so a bad path
    /// fails here rather than at render time.
    pub fn from_config(config: &ConfigFile) -> Result<Self, ServiceError> {
        let server = &config.tile_server;

        let http_client = AsyncReqwestClient::with_timeout(config.download.timeout)?;
        let mut provider = TileServerProvider::new(http_client, server.url.clone())
            .with_retina_suffix(server.retina_suffix.clone());
        if let Some(token) = &server.access_token {
            provider = provider.with_access_token(&server.token_param, token);
        }
        let orchestrator =
            TileOrchestrator::new(provider).with_concurrency(config.download.concurrency);

        let mut renderer = OverlayRenderer::new();
        if let Some(path) = &config.render.icon_font {
            renderer = renderer.with_icons(LoadedFont::from_file(path)?);
        }
        let mut watermark_style = WatermarkStyle::default();
        if let Some(path) = &config.render.watermark_font {
            watermark_style = watermark_style.with_font(LoadedFont::from_file(path)?);
        }

        Ok(Self::new(orchestrator, ImagePipeline::new(renderer, watermark_style))
            .with_options(RenderOptions::from_config(config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::TileRequest;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::future::Future;
    use std::io::Cursor;
    use std::sync::Mutex;

    /// Serves solid 256px tiles and records the requests.
    struct SolidTileProvider {
        bytes: Vec<u8>,
        requests: Mutex<Vec<TileRequest>>,
    }

    impl SolidTileProvider {
        fn new() -> Self {
            let image = RgbaImage::from_pixel(256, 256, Rgba([20, 120, 200, 255]));
            let mut bytes = Vec::new();
            image
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
                .unwrap();
            Self {
                bytes,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl AsyncTileProvider for SolidTileProvider {
        fn fetch_tile(
            &self,
            request: &TileRequest,
        ) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send {
            self.requests.lock().unwrap().push(request.clone());
            let bytes = self.bytes.clone();
            async move { Ok(bytes) }
        }

        fn name(&self) -> &str {
            "solid"
        }
    }

    fn service() -> MapService<SolidTileProvider> {
        MapService::new(
            TileOrchestrator::new(SolidTileProvider::new()),
            ImagePipeline::default(),
        )
    }

    fn london() -> Bbox {
        Bbox::new(-0.1, 51.55, 0.1, 51.45)
    }

    #[tokio::test]
    async fn test_default_render_is_600_square_png() {
        let image = service().render(&london(), &[]).await.unwrap();

        assert_eq!((image.width, image.height), (600, 600));
        assert_eq!(image.format, OutputFormat::Png);
        assert_eq!(image::guess_format(&image.bytes).unwrap(), ImageFormat::Png);
    }

    #[tokio::test]
    async fn test_without_resize_keeps_mosaic_size() {
        let service = service().with_options(RenderOptions::default().with_out_size(None));
        let image = service.render(&london(), &[]).await.unwrap();

        assert_eq!(image.width % 256, 0);
        assert_eq!(image.height % 256, 0);
    }

    #[tokio::test]
    async fn test_crop_uses_harmonious_resize() {
        let options = RenderOptions::default().with_crop(true);
        let image = service()
            .render_with(&london(), &[], &options)
            .await
            .unwrap();

        // 0.2 degrees of longitude span more pixels than 0.1 of latitude.
        assert_eq!(image.width, 600);
        assert!(image.height < 600);
        assert!(image.height > 300);
    }

    #[tokio::test]
    async fn test_requests_follow_options() {
        let options = RenderOptions::default()
            .with_retina(true)
            .with_output_format(OutputFormat::Jpeg);
        let service = service();
        let image = service.render_with(&london(), &[], &options).await.unwrap();

        assert_eq!(image.format, OutputFormat::Jpeg);
        let requests = service.orchestrator.provider().requests.lock().unwrap();
        assert!(!requests.is_empty());
        assert!(requests.iter().all(|r| r.retina && r.extension == "png"));
    }

    #[tokio::test]
    async fn test_invalid_visible_tiles() {
        let options = RenderOptions::default().with_visible_tiles(0);
        let err = service()
            .render_with(&london(), &[], &options)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Coord(CoordError::InvalidTileCount(_))));
    }

    #[tokio::test]
    async fn test_render_geojson_rejects_bad_document() {
        let err = service()
            .render_geojson(&london(), "{not json")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Overlay(OverlayError::InvalidJson(_))));
    }

    #[test]
    fn test_options_from_config() {
        let mut config = ConfigFile::default();
        config.render.width = 0;
        config.render.crop = true;
        config.tile_server.attribution = Some("(c) tiles".to_string());
        config.tile_server.extension = "jpg".to_string();

        let options = RenderOptions::from_config(&config);
        assert_eq!(options.out_size, None);
        assert!(options.crop);
        assert_eq!(options.watermark.as_deref(), Some("(c) tiles"));
        assert_eq!(options.extension, "jpg");
        assert_eq!(options.visible_tiles, 4);
    }

    #[test]
    fn test_resize_mode_selection() {
        let exact = RenderOptions::default();
        assert_eq!(
            exact.resize_mode(),
            Some(ResizeMode::Exact { width: 600, height: 600 })
        );
        let harmonious = RenderOptions::default().with_crop(true);
        assert_eq!(
            harmonious.resize_mode(),
            Some(ResizeMode::Harmonious { width: 600, height: 600 })
        );
    }

    #[test]
    fn test_from_config_reports_missing_font() {
        let mut config = ConfigFile::default();
        config.render.icon_font = Some("/nonexistent/icons.ttf".into());

        let err = MapService::from_config(&config).err().unwrap();
        assert!(matches!(err, ServiceError::Font(FontError::Io { .. })));
    }
}
