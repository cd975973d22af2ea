//! Canvas configuration.
//!
//! [`CanvasConfig`] controls canvas size, grid, pointer tolerances and export
//! defaults. Every field has a default, so an empty TOML file is valid:
//!
//! ```toml
//! width = 1600
//! grid_size = 25
//! source_extension = "java"
//! ```

use camino::Utf8Path;
use log::debug;
use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Canvas width in pixels (also the image export width).
    pub width: u32,
    /// Canvas height in pixels (also the image export height).
    pub height: u32,
    /// Spacing of the background grid. Zero disables the grid.
    pub grid_size: u32,
    pub show_grid: bool,
    /// How close the pointer must be to a line or control point to hit it.
    pub pick_tolerance: f32,
    /// How close the pointer must be to a connection point to snap to it.
    pub snap_radius: f32,
    /// Background colour as `#rrggbb`.
    pub background: String,
    /// File extension of generated source files.
    pub source_extension: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            grid_size: 20,
            show_grid: true,
            pick_tolerance: 10.0,
            snap_radius: 10.0,
            background: "#ffffff".to_string(),
            source_extension: "java".to_string(),
        }
    }
}

impl CanvasConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load the configuration file at `path`.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        debug!(path = path.as_str(); "Loaded canvas config");
        Ok(config)
    }
}
