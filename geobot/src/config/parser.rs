//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::defaults::clamp_concurrency;
use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::coord::parse_zoom;
use crate::pipeline::OutputFormat;
use crate::tileset::parse_tile_count;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [tile_server] section
    if let Some(section) = ini.section(Some("tile_server")) {
        if let Some(v) = non_empty(section.get("url")) {
            if !v.starts_with("http://") && !v.starts_with("https://") {
                return Err(invalid("tile_server", "url", v, "must start with http:// or https://"));
            }
            config.tile_server.url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = non_empty(section.get("access_token")) {
            config.tile_server.access_token = Some(v.to_string());
        }
        if let Some(v) = non_empty(section.get("token_param")) {
            config.tile_server.token_param = v.to_string();
        }
        if let Some(v) = section.get("extension") {
            let ext = v.trim().trim_start_matches('.');
            if ext.is_empty() {
                return Err(invalid("tile_server", "extension", v, "must not be empty"));
            }
            config.tile_server.extension = ext.to_string();
        }
        if let Some(v) = section.get("retina") {
            config.tile_server.retina = parse_bool(v);
        }
        if let Some(v) = section.get("retina_suffix") {
            config.tile_server.retina_suffix = v.trim().to_string();
        }
        if let Some(v) = non_empty(section.get("attribution")) {
            config.tile_server.attribution = Some(v.to_string());
        }
    }

    // [render] section
    if let Some(section) = ini.section(Some("render")) {
        if let Some(v) = section.get("visible_tiles") {
            config.render.visible_tiles = parse_tile_count(v).map_err(|_| {
                invalid("render", "visible_tiles", v, "must be a positive integer")
            })?;
        }
        if let Some(v) = section.get("width") {
            config.render.width = parse_dimension("width", v)?;
        }
        if let Some(v) = section.get("height") {
            config.render.height = parse_dimension("height", v)?;
        }
        if let Some(v) = section.get("crop") {
            config.render.crop = parse_bool(v);
        }
        if let Some(v) = section.get("max_zoom") {
            config.render.max_zoom = parse_zoom(v)
                .map_err(|e| invalid("render", "max_zoom", v, &e.to_string()))?;
        }
        if let Some(v) = non_empty(section.get("icon_font")) {
            config.render.icon_font = Some(expand_tilde(v));
        }
        if let Some(v) = non_empty(section.get("watermark_font")) {
            config.render.watermark_font = Some(expand_tilde(v));
        }
        if let Some(v) = section.get("output_format") {
            config.render.output_format = v
                .parse::<OutputFormat>()
                .map_err(|_| invalid("render", "output_format", v, "must be 'png' or 'jpeg'"))?;
        }
    }

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("timeout") {
            config.download.timeout = match v.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(invalid(
                        "download",
                        "timeout",
                        v,
                        "must be a positive integer (seconds)",
                    ))
                }
            };
        }
        if let Some(v) = section.get("concurrency") {
            let requested: usize = v.trim().parse().map_err(|_| {
                invalid("download", "concurrency", v, "must be a positive integer")
            })?;
            config.download.concurrency = clamp_concurrency(requested);
        }
    }

    Ok(config)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_dimension(key: &str, value: &str) -> Result<u32, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid("render", key, value, "must be a non-negative integer (pixels)"))
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a boolean value from a string.
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
