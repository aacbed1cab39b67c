//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/ride-pin/config.toml

pub mod defaults;

use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::placement::{PlacementSettings, StalePolicy};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Geocoding service settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Pin placement behaviour
    #[serde(default)]
    pub placement: PlacementConfig,

    /// Initial map view
    #[serde(default)]
    pub map: MapConfig,

    /// Device location settings
    #[serde(default)]
    pub location: LocationConfig,
}

/// Geocoding service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Reverse geocoding endpoint
    #[serde(default = "default_reverse_url")]
    pub reverse_url: String,

    /// Search endpoint for suggestions
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Optional detail level passed as `zoom`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<u8>,

    /// Maximum requests per second
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Decimal places of the lookup cache key
    #[serde(default = "default_key_precision")]
    pub key_precision: usize,
}

/// Pin placement behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Quiet period before a lookup, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Zoom used when focusing a pin
    #[serde(default = "default_close_up_zoom")]
    pub close_up_zoom: u8,

    /// Delay before zooming to a picked suggestion, in milliseconds
    #[serde(default = "default_marker_zoom_delay_ms")]
    pub marker_zoom_delay_ms: u64,

    /// "last_dispatched" or "latest_center"
    #[serde(default = "default_stale_policy")]
    pub stale_policy: String,
}

/// Initial map view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_map_lat")]
    pub default_lat: f64,

    #[serde(default = "default_map_lng")]
    pub default_lng: f64,

    #[serde(default = "default_map_zoom")]
    pub default_zoom: u8,
}

/// Device location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Center on the IP-derived location when a session starts
    #[serde(default = "default_use_ip_location")]
    pub use_ip_location: bool,
}

// Default value functions for serde
fn default_reverse_url() -> String {
    DEFAULT_REVERSE_URL.to_string()
}
fn default_search_url() -> String {
    DEFAULT_SEARCH_URL.to_string()
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_requests_per_second() -> u32 {
    DEFAULT_REQUESTS_PER_SECOND
}
fn default_key_precision() -> usize {
    DEFAULT_KEY_PRECISION
}
fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}
fn default_close_up_zoom() -> u8 {
    DEFAULT_CLOSE_UP_ZOOM
}
fn default_marker_zoom_delay_ms() -> u64 {
    DEFAULT_MARKER_ZOOM_DELAY_MS
}
fn default_stale_policy() -> String {
    DEFAULT_STALE_POLICY.to_string()
}
fn default_map_lat() -> f64 {
    DEFAULT_MAP_LAT
}
fn default_map_lng() -> f64 {
    DEFAULT_MAP_LNG
}
fn default_map_zoom() -> u8 {
    DEFAULT_MAP_ZOOM
}
fn default_use_ip_location() -> bool {
    true
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            reverse_url: default_reverse_url(),
            search_url: default_search_url(),
            user_agent: default_user_agent(),
            zoom: None,
            requests_per_second: default_requests_per_second(),
            key_precision: default_key_precision(),
        }
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            close_up_zoom: default_close_up_zoom(),
            marker_zoom_delay_ms: default_marker_zoom_delay_ms(),
            stale_policy: default_stale_policy(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_lat: default_map_lat(),
            default_lng: default_map_lng(),
            default_zoom: default_map_zoom(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            use_ip_location: default_use_ip_location(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific path, creating it if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geocoding", "reverse_url"] => Some(self.geocoding.reverse_url.clone()),
            ["geocoding", "search_url"] => Some(self.geocoding.search_url.clone()),
            ["geocoding", "user_agent"] => Some(self.geocoding.user_agent.clone()),
            ["geocoding", "zoom"] => Some(
                self.geocoding
                    .zoom
                    .map(|z| z.to_string())
                    .unwrap_or_default(),
            ),
            ["geocoding", "requests_per_second"] => {
                Some(self.geocoding.requests_per_second.to_string())
            }
            ["geocoding", "key_precision"] => Some(self.geocoding.key_precision.to_string()),

            ["placement", "debounce_ms"] => Some(self.placement.debounce_ms.to_string()),
            ["placement", "close_up_zoom"] => Some(self.placement.close_up_zoom.to_string()),
            ["placement", "marker_zoom_delay_ms"] => {
                Some(self.placement.marker_zoom_delay_ms.to_string())
            }
            ["placement", "stale_policy"] => Some(self.placement.stale_policy.clone()),

            ["map", "default_lat"] => Some(self.map.default_lat.to_string()),
            ["map", "default_lng"] => Some(self.map.default_lng.to_string()),
            ["map", "default_zoom"] => Some(self.map.default_zoom.to_string()),

            ["location", "use_ip_location"] => Some(self.location.use_ip_location.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geocoding", "reverse_url"] => self.geocoding.reverse_url = value.to_string(),
            ["geocoding", "search_url"] => self.geocoding.search_url = value.to_string(),
            ["geocoding", "user_agent"] => self.geocoding.user_agent = value.to_string(),
            ["geocoding", "zoom"] => {
                self.geocoding.zoom = if value.is_empty() {
                    None
                } else {
                    Some(parse_value(key, value)?)
                };
            }
            ["geocoding", "requests_per_second"] => {
                self.geocoding.requests_per_second = parse_value(key, value)?;
            }
            ["geocoding", "key_precision"] => {
                self.geocoding.key_precision = parse_value(key, value)?;
            }

            ["placement", "debounce_ms"] => {
                self.placement.debounce_ms = parse_value(key, value)?;
            }
            ["placement", "close_up_zoom"] => {
                self.placement.close_up_zoom = parse_value(key, value)?;
            }
            ["placement", "marker_zoom_delay_ms"] => {
                self.placement.marker_zoom_delay_ms = parse_value(key, value)?;
            }
            ["placement", "stale_policy"] => {
                value
                    .parse::<StalePolicy>()
                    .map_err(Error::Config)?;
                self.placement.stale_policy = value.to_string();
            }

            ["map", "default_lat"] => self.map.default_lat = parse_value(key, value)?,
            ["map", "default_lng"] => self.map.default_lng = parse_value(key, value)?,
            ["map", "default_zoom"] => self.map.default_zoom = parse_value(key, value)?,

            ["location", "use_ip_location"] => {
                self.location.use_ip_location = parse_value(key, value)?;
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "geocoding.reverse_url",
            "geocoding.search_url",
            "geocoding.user_agent",
            "geocoding.zoom",
            "geocoding.requests_per_second",
            "geocoding.key_precision",
            "placement.debounce_ms",
            "placement.close_up_zoom",
            "placement.marker_zoom_delay_ms",
            "placement.stale_policy",
            "map.default_lat",
            "map.default_lng",
            "map.default_zoom",
            "location.use_ip_location",
        ]
    }

    /// Initial map center, validated
    pub fn default_center(&self) -> Result<Coordinates> {
        Coordinates::try_new(self.map.default_lat, self.map.default_lng)
    }

    /// Coordinator settings derived from this configuration
    pub fn placement_settings(&self) -> Result<PlacementSettings> {
        let stale_policy = self
            .placement
            .stale_policy
            .parse::<StalePolicy>()
            .map_err(Error::Config)?;

        Ok(PlacementSettings {
            debounce: Duration::from_millis(self.placement.debounce_ms),
            close_up_zoom: self.placement.close_up_zoom,
            marker_zoom_delay: Duration::from_millis(self.placement.marker_zoom_delay_ms),
            key_precision: self.geocoding.key_precision,
            stale_policy,
        })
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}
