//! Centralized constants for the ride-pin crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in meters (WGS84 approximation)
    pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

    /// Decimal places used when a coordinate stands in for an address
    pub const FALLBACK_DECIMALS: usize = 6;
}

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim reverse geocoding endpoint
    pub const NOMINATIM_REVERSE_URL: &str = "https://nominatim.openstreetmap.org/reverse";

    /// OpenStreetMap Nominatim search endpoint
    pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";
}

/// Cache settings
pub mod cache {
    /// IP location cache duration in seconds (1 hour)
    pub const IP_LOCATION_TTL_SECS: u64 = 3600;

    /// IP location cache file name
    pub const IP_LOCATION_CACHE_FILE: &str = "ip_location_cache.json";
}
