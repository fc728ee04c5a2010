//! Configuration
//!
//! Settings are read from an INI file (`~/.geobot/config.ini` by default)
//! with three sections: `[tile_server]`, `[render]` and `[download]`.
//!
//! ```ini
//! [tile_server]
//! url = https://tile.openstreetmap.org
//! attribution = (c) OpenStreetMap contributors
//!
//! [render]
//! visible_tiles = 4
//! width = 600
//! height = 600
//!
//! [download]
//! concurrency = 8
//! ```

mod defaults;
mod file;
mod parser;
mod settings;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, DownloadSettings, RenderSettings, TileServerSettings};
