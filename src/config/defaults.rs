//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants::api::{NOMINATIM_REVERSE_URL, NOMINATIM_SEARCH_URL};

/// Default reverse geocoding endpoint
pub const DEFAULT_REVERSE_URL: &str = NOMINATIM_REVERSE_URL;

/// Default search endpoint
pub const DEFAULT_SEARCH_URL: &str = NOMINATIM_SEARCH_URL;

/// User-Agent sent to the geocoding service (Nominatim requires one)
pub const DEFAULT_USER_AGENT: &str = concat!("ride-pin/", env!("CARGO_PKG_VERSION"));

/// Client-side request budget for the geocoding service
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 1;

/// Decimal places of the lookup cache key (~1 m)
pub const DEFAULT_KEY_PRECISION: usize = 5;

/// Quiet period before a moved pin is looked up
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Zoom level used when focusing a single pin
pub const DEFAULT_CLOSE_UP_ZOOM: u8 = 17;

/// Settle time before zooming to a marker picked from suggestions
pub const DEFAULT_MARKER_ZOOM_DELAY_MS: u64 = 400;

/// Default stale lookup policy
pub const DEFAULT_STALE_POLICY: &str = "last_dispatched";

/// Default map center (Damascus)
pub const DEFAULT_MAP_LAT: f64 = 33.5138;
pub const DEFAULT_MAP_LNG: f64 = 36.2765;

/// Default map zoom
pub const DEFAULT_MAP_ZOOM: u8 = 13;

/// Default number of search suggestions
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "ride-pin";
