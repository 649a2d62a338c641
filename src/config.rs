//! Overlay configuration.
//!
//! Field names follow the widget settings keys so an exported settings JSON
//! can be loaded unchanged.

use crate::geo::PyramidParams;
use geo_types::Coord;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Highest tile level the pyramid and tile grid support.
pub const MAX_ZOOM: u8 = 30;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("minimum zoom {min} is greater than maximum zoom {max}")]
    ZoomRange { min: u8, max: u8 },

    #[error("zoom {0} exceeds the supported maximum of {}", MAX_ZOOM)]
    MaxZoom(u8),

    #[error("tile size must be non-zero")]
    ZeroTileSize,

    #[error("opacity {0} is outside 0.0..=1.0")]
    Opacity(f32),
}

/// Imagery view direction, used as a tile URL path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Vert,
    North,
    East,
    South,
    West,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Vert => "Vert",
            Direction::North => "North",
            Direction::East => "East",
            Direction::South => "South",
            Direction::West => "West",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Externally supplied overlay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayConfig {
    /// Provider credential, sent as the `apikey` query parameter.
    pub n_api_key: String,
    #[serde(rename = "tileURL")]
    pub tile_url: String,
    #[serde(rename = "coverageURL")]
    pub coverage_url: String,
    pub direction: Direction,
    pub origin_longitude: f64,
    pub origin_latitude: f64,
    /// Zoom at which the coverage query tile is computed.
    pub origin_zoom: u8,
    pub nearmap_min_zoom: u8,
    pub nearmap_max_zoom: u8,
    pub opacity: f32,
    pub tilesize: u32,
    pub earth_circumference: f64,
    pub inches_per_meter: f64,
    pub initial_nmap_active: bool,
    /// Maximum number of surveys requested per coverage query.
    pub coverage_limit: u32,
    /// Display DPI used for LOD scales.
    pub dpi: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            n_api_key: String::new(),
            tile_url: "https://api.nearmap.com/tiles/v3".to_string(),
            coverage_url: "https://api.nearmap.com/coverage/v2/coord".to_string(),
            direction: Direction::Vert,
            // Austin, TX
            origin_longitude: -97.7431,
            origin_latitude: 30.2672,
            origin_zoom: 13,
            nearmap_min_zoom: 3,
            nearmap_max_zoom: 24,
            opacity: 1.0,
            tilesize: 256,
            earth_circumference: 40075016.685568,
            inches_per_meter: 39.37,
            initial_nmap_active: true,
            coverage_limit: 500,
            dpi: 96.0,
        }
    }
}

impl OverlayConfig {
    /// Environment variable holding a path to a JSON configuration file.
    pub const CONFIG_PATH_ENV: &'static str = "NEARMAP_OVERLAY_CONFIG";

    /// Environment variable overriding the credential.
    pub const API_KEY_ENV: &'static str = "NEARMAP_API_KEY";

    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Loads the configuration from the environment, falling back to
    /// defaults on any error.
    pub fn load() -> Self {
        let mut config = match std::env::var(Self::CONFIG_PATH_ENV) {
            Ok(path) => match Self::from_file(&path) {
                Ok(config) => {
                    log::info!("Loaded overlay configuration from {}", path);
                    config
                }
                Err(e) => {
                    log::warn!("Failed to load configuration from {}: {}", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };

        if let Ok(key) = std::env::var(Self::API_KEY_ENV) {
            config.n_api_key = key;
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(zoom) = [self.nearmap_max_zoom, self.origin_zoom]
            .into_iter()
            .find(|zoom| *zoom > MAX_ZOOM)
        {
            return Err(ConfigError::MaxZoom(zoom));
        }
        if self.nearmap_min_zoom > self.nearmap_max_zoom {
            return Err(ConfigError::ZoomRange {
                min: self.nearmap_min_zoom,
                max: self.nearmap_max_zoom,
            });
        }
        if self.tilesize == 0 {
            return Err(ConfigError::ZeroTileSize);
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ConfigError::Opacity(self.opacity));
        }
        Ok(())
    }

    pub fn origin(&self) -> Coord<f64> {
        Coord {
            x: self.origin_longitude,
            y: self.origin_latitude,
        }
    }

    pub fn pyramid_params(&self) -> PyramidParams {
        PyramidParams {
            circumference: self.earth_circumference,
            tile_size: self.tilesize,
            dpi: self.dpi,
            inches_per_meter: self.inches_per_meter,
        }
    }
}
