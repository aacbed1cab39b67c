//! Geocoding module
//!
//! Reverse geocoding (coordinates to address), forward search for
//! suggestions, and device location for initial map centering.

pub mod client;
pub mod ip_location;
pub mod nominatim;

use crate::coord::Coordinates;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;

pub use client::GeocodingClient;

/// A geocoded location result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
    /// Display name (address or description)
    pub display_name: String,
}

impl GeoLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// A search suggestion the user can pick instead of placing a pin by hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Place name shown in the suggestion list
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Suggestion {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// Trait for reverse geocoding backends
pub trait ReverseGeocoder: Send + Sync {
    /// Resolve coordinates to a display name
    ///
    /// Returns `Ok(None)` when the service answered but had no usable name.
    fn reverse_geocode(
        &self,
        coords: Coordinates,
    ) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// Trait for forward geocoding (search suggestion) backends
pub trait ForwardGeocoder: Send + Sync {
    /// Search for places matching `query`, best match first
    fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Suggestion>>> + Send;
}

/// Source of the device's current position
pub trait DeviceLocator: Send + Sync {
    fn locate(&self) -> impl Future<Output = Result<Coordinates>> + Send;
}
