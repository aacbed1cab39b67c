//! IP-based device location
//!
//! Approximates the device position from its public IP via ip-api.com.
//! Results are cached on disk for an hour so repeated sessions start fast.

use crate::constants::api::IP_API_URL;
use crate::constants::cache::{IP_LOCATION_CACHE_FILE, IP_LOCATION_TTL_SECS};
use crate::config::defaults::APP_DIR_NAME;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::{DeviceLocator, GeoLocation};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tracing::debug;

/// IP location service with caching
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: reqwest::Client,
    endpoint: String,
    cache_path: Option<PathBuf>,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    country: Option<String>,
}

/// Cached location data
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedLocation {
    location: GeoLocation,
    timestamp: u64,
}

impl IpLocator {
    /// Create a new IP locator with the default cache path
    pub fn new() -> Self {
        let cache_path = dirs::cache_dir().map(|p| p.join(APP_DIR_NAME).join(IP_LOCATION_CACHE_FILE));

        Self {
            client: reqwest::Client::new(),
            endpoint: IP_API_URL.to_string(),
            cache_path,
        }
    }

    /// Create an IP locator without caching
    pub fn without_cache() -> Self {
        Self {
            cache_path: None,
            ..Self::new()
        }
    }

    /// Use a specific cache file
    pub fn with_cache_path(mut self, cache_path: PathBuf) -> Self {
        self.cache_path = Some(cache_path);
        self
    }

    /// Query a different endpoint (e.g. a local stub)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Get current location based on IP address
    pub async fn locate_location(&self) -> Result<GeoLocation> {
        if let Some(cached) = self.load_cache() {
            debug!("Using cached IP location: {}", cached.display_name);
            return Ok(cached);
        }

        let location = self.fetch_location().await?;
        self.save_cache(&location);

        Ok(location)
    }

    async fn fetch_location(&self) -> Result<GeoLocation> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| Error::Geolocation(format!("IP location request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geolocation(format!(
                "IP location API returned status: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Geolocation(format!("Failed to parse IP location response: {}", e)))?;

        if data.status != "success" {
            return Err(Error::Geolocation("IP location lookup failed".to_string()));
        }

        let (Some(lat), Some(lng)) = (data.lat, data.lon) else {
            return Err(Error::Geolocation("No position in IP location response".to_string()));
        };

        let display_name = [data.city, data.country]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");

        Ok(GeoLocation {
            lat,
            lng,
            display_name: if display_name.is_empty() {
                Coordinates::new(lat, lng).fallback_address()
            } else {
                display_name
            },
        })
    }

    fn load_cache(&self) -> Option<GeoLocation> {
        let cache_path = self.cache_path.as_ref()?;
        let content = fs::read_to_string(cache_path).ok()?;
        let cached: CachedLocation = serde_json::from_str(&content).ok()?;

        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .ok()?
            .as_secs();

        (now.saturating_sub(cached.timestamp) < IP_LOCATION_TTL_SECS).then_some(cached.location)
    }

    fn save_cache(&self, location: &GeoLocation) {
        let Some(cache_path) = &self.cache_path else {
            return;
        };

        if let Some(parent) = cache_path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let cached = CachedLocation {
            location: location.clone(),
            timestamp,
        };

        if let Ok(content) = serde_json::to_string_pretty(&cached) {
            let _ = fs::write(cache_path, content);
        }
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        if let Some(cache_path) = &self.cache_path {
            let _ = fs::remove_file(cache_path);
        }
    }

    /// Get cache duration
    pub fn cache_duration() -> Duration {
        Duration::from_secs(IP_LOCATION_TTL_SECS)
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceLocator for IpLocator {
    async fn locate(&self) -> Result<Coordinates> {
        let location = self.locate_location().await?;
        let coords = location.coordinates();
        coords.validate()?;
        Ok(coords)
    }
}
