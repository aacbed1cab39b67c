//! Nominatim geocoding backend (OpenStreetMap)
//!
//! Reverse lookups read only `display_name`; a response without one counts
//! as "no result". Requests pass through a client-side rate limiter, since
//! the public instance allows about one request per second.

use crate::config::GeocodingConfig;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::{ForwardGeocoder, ReverseGeocoder, Suggestion};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::Deserialize;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

/// Nominatim geocoding backend
#[derive(Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    reverse_url: String,
    search_url: String,
    zoom: Option<u8>,
    limiter: Arc<DefaultDirectRateLimiter>,
}

/// Nominatim reverse response; error bodies lack `display_name`
#[derive(Debug, Deserialize)]
struct NominatimReverse {
    display_name: Option<String>,
}

/// Nominatim search response item
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimBackend {
    /// Create a backend from geocoding settings
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second)));

        Ok(Self {
            client,
            reverse_url: config.reverse_url.clone(),
            search_url: config.search_url.clone(),
            zoom: config.zoom,
            limiter,
        })
    }

    /// Build the reverse lookup URL for a coordinate
    fn reverse_request_url(&self, coords: Coordinates) -> String {
        let mut url = format!(
            "{}?format=json&lat={}&lon={}&addressdetails=1",
            self.reverse_url, coords.lat, coords.lng
        );
        if let Some(zoom) = self.zoom {
            url.push_str(&format!("&zoom={}", zoom));
        }
        url
    }

    /// Build the search URL for a free-text query
    fn search_request_url(&self, query: &str, limit: usize) -> String {
        format!(
            "{}?format=json&q={}&limit={}",
            self.search_url,
            urlencoding::encode(query),
            limit
        )
    }

    /// Parse lat/lng strings to f64
    fn parse_coords(lat: &str, lng: &str) -> Result<(f64, f64)> {
        let lat: f64 = lat
            .parse()
            .map_err(|_| Error::Geocoding(format!("Invalid latitude: {}", lat)))?;
        let lng: f64 = lng
            .parse()
            .map_err(|_| Error::Geocoding(format!("Invalid longitude: {}", lng)))?;
        Ok((lat, lng))
    }
}

impl fmt::Debug for NominatimBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NominatimBackend")
            .field("reverse_url", &self.reverse_url)
            .field("search_url", &self.search_url)
            .field("zoom", &self.zoom)
            .finish_non_exhaustive()
    }
}

impl ReverseGeocoder for NominatimBackend {
    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Option<String>> {
        let url = self.reverse_request_url(coords);

        self.limiter.until_ready().await;
        debug!("Nominatim reverse lookup: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Geocoding(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(None);
            }
            return Err(Error::Geocoding(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let result: NominatimReverse = response
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse Nominatim response: {}", e)))?;

        Ok(result.display_name.filter(|name| !name.trim().is_empty()))
    }
}

impl ForwardGeocoder for NominatimBackend {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>> {
        let url = self.search_request_url(query, limit);

        self.limiter.until_ready().await;
        debug!("Nominatim search: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Geocoding(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geocoding(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let results: Vec<NominatimResult> = response
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse Nominatim response: {}", e)))?;

        results
            .into_iter()
            .map(|result| {
                let (lat, lon) = Self::parse_coords(&result.lat, &result.lon)?;
                Ok(Suggestion::new(result.display_name, lat, lon))
            })
            .collect()
    }
}
