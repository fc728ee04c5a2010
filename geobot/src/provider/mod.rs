//! Tile fetch capability
//!
//! The rendering core never talks HTTP itself. It consumes an
//! [`AsyncTileProvider`], which is injected by the caller and owns its own
//! connection pool, timeouts and credentials.
//!
//! ```ignore
//! use geobot::provider::{AsyncReqwestClient, TileServerProvider};
//!
//! let http_client = AsyncReqwestClient::with_timeout(10)?;
//! let provider = TileServerProvider::new(http_client, "https://api.example.com/tiles")
//!     .with_access_token("access_token", &token);
//! ```

mod http;
mod tile_server;
mod types;

pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use tile_server::{TileServerProvider, DEFAULT_RETINA_SUFFIX};
pub use types::{AsyncTileProvider, ProviderError, TileRequest};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
