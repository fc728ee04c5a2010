//! Generic slippy-map tile server provider.
//!
//! # URL Pattern
//!
//! ```text
//! {server}/{z}/{x}/{y}{retina_suffix}.{ext}[?{query}]
//! ```
//!
//! The query string is opaque: credentials such as `access_token=...` are
//! passed through unchanged, never constructed or inspected here.

use std::future::Future;

use crate::provider::{AsyncHttpClient, AsyncTileProvider, ProviderError, TileRequest};

/// Default suffix inserted before the extension for high-DPI tiles.
pub const DEFAULT_RETINA_SUFFIX: &str = "@2x";

/// Tile provider for any `{z}/{x}/{y}` raster tile server.
///
/// # Example
///
/// ```
/// use geobot::provider::{AsyncReqwestClient, TileServerProvider};
///
/// let client = AsyncReqwestClient::new().unwrap();
/// let provider = TileServerProvider::new(client, "https://tile.openstreetmap.org");
/// ```
pub struct TileServerProvider<C: AsyncHttpClient> {
    http_client: C,
    base_url: String,
    query: Option<String>,
    retina_suffix: String,
}

impl<C: AsyncHttpClient> TileServerProvider<C> {
    /// Creates a provider for the given server root.
    pub fn new(http_client: C, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            query: None,
            retina_suffix: DEFAULT_RETINA_SUFFIX.to_string(),
        }
    }

    /// Appends `{param}={token}` to every request. Empty tokens are ignored.
    pub fn with_access_token(mut self, param: &str, token: &str) -> Self {
        if !token.is_empty() {
            self.query = Some(format!("{}={}", param, token));
        }
        self
    }

    /// Appends a raw query string to every request.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query: String = query.into();
        self.query = Some(query.trim_start_matches('?').to_string()).filter(|q| !q.is_empty());
        self
    }

    pub fn with_retina_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.retina_suffix = suffix.into();
        self
    }

    /// Builds the tile URL for a request.
    pub fn build_url(&self, request: &TileRequest) -> String {
        let tile = &request.tile;
        let suffix = if request.retina {
            self.retina_suffix.as_str()
        } else {
            ""
        };

        let mut url = format!(
            "{}/{}/{}/{}{}.{}",
            self.base_url, tile.z, tile.x, tile.y, suffix, request.extension
        );
        if let Some(query) = &self.query {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}

impl<C: AsyncHttpClient> AsyncTileProvider for TileServerProvider<C> {
    fn fetch_tile(
        &self,
        request: &TileRequest,
    ) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send {
        let url = self.build_url(request);
        async move { self.http_client.get(&url).await }
    }

    fn name(&self) -> &str {
        &self.base_url
    }
}
