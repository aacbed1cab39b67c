//! Address resolution with a guaranteed result
//!
//! Any backend failure is absorbed here and replaced by the coordinate
//! rendered to six decimal places. One attempt per call, no retries.

use crate::coord::Coordinates;
use crate::geo::ReverseGeocoder;
use tracing::{debug, warn};

/// Wraps a reverse geocoder so callers always receive a non-empty address
#[derive(Debug, Clone)]
pub struct GeocodingClient<G> {
    backend: G,
}

impl<G: ReverseGeocoder> GeocodingClient<G> {
    pub fn new(backend: G) -> Self {
        Self { backend }
    }

    /// Access the wrapped backend
    pub fn backend(&self) -> &G {
        &self.backend
    }

    /// Resolve coordinates to an address, falling back to the coordinate text
    pub async fn resolve(&self, coords: Coordinates) -> String {
        match self.backend.reverse_geocode(coords).await {
            Ok(Some(name)) if !name.trim().is_empty() => name,
            Ok(_) => {
                debug!("No display name for {}, using coordinates", coords);
                coords.fallback_address()
            }
            Err(e) => {
                warn!("Reverse geocoding failed for {}: {}", coords, e);
                coords.fallback_address()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};

    enum Canned {
        Name(&'static str),
        Missing,
        Fail,
    }

    struct CannedGeocoder(Canned);

    impl ReverseGeocoder for CannedGeocoder {
        async fn reverse_geocode(&self, _coords: Coordinates) -> Result<Option<String>> {
            match self.0 {
                Canned::Name(name) => Ok(Some(name.to_string())),
                Canned::Missing => Ok(None),
                Canned::Fail => Err(Error::Geocoding("connection refused".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_resolve_returns_display_name() {
        let client = GeocodingClient::new(CannedGeocoder(Canned::Name("Al-Hamidiyah Souq")));
        let address = client.resolve(Coordinates::new(33.5115, 36.3040)).await;
        assert_eq!(address, "Al-Hamidiyah Souq");
    }

    #[tokio::test]
    async fn test_resolve_falls_back_on_error() {
        let client = GeocodingClient::new(CannedGeocoder(Canned::Fail));
        let address = client.resolve(Coordinates::new(33.5138, 36.2765)).await;
        assert_eq!(address, "33.513800, 36.276500");
    }

    #[tokio::test]
    async fn test_resolve_falls_back_on_missing_name() {
        let client = GeocodingClient::new(CannedGeocoder(Canned::Missing));
        let address = client.resolve(Coordinates::new(0.0, 0.0)).await;
        assert_eq!(address, "0.000000, 0.000000");
    }

    #[tokio::test]
    async fn test_resolve_falls_back_on_blank_name() {
        let client = GeocodingClient::new(CannedGeocoder(Canned::Name("   ")));
        let address = client.resolve(Coordinates::new(1.5, 2.25)).await;
        assert_eq!(address, "1.500000, 2.250000");
    }
}
