//! Geographic coordinates
//!
//! `Coordinates` is an immutable value: every change produces a new value.

pub mod distance;

use crate::constants::geo::FALLBACK_DECIMALS;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates without validation
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Create coordinates, rejecting non-finite or out-of-range values
    pub fn try_new(lat: f64, lng: f64) -> Result<Self> {
        let coords = Self::new(lat, lng);
        coords.validate()?;
        Ok(coords)
    }

    /// Validate that coordinates are finite and within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(Error::InvalidCoordinates(format!(
                "Coordinates ({}, {}) are not finite",
                self.lat, self.lng
            )));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }

    /// Lookup cache key: both components rounded to `precision` decimals
    ///
    /// Two coordinates with the same key are treated as the same position.
    pub fn cache_key(&self, precision: usize) -> String {
        format!(
            "{},{}",
            rounded(self.lat, precision),
            rounded(self.lng, precision)
        )
    }

    /// Address stand-in used when no place name is available
    pub fn fallback_address(&self) -> String {
        format!(
            "{}, {}",
            rounded(self.lat, FALLBACK_DECIMALS),
            rounded(self.lng, FALLBACK_DECIMALS)
        )
    }
}

/// Render `value` to `decimals` places; values that round to zero never carry a sign
fn rounded(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value);
    match text.strip_prefix('-') {
        Some(magnitude) if magnitude.chars().all(|c| c == '0' || c == '.') => {
            magnitude.to_string()
        }
        _ => text,
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ranges() {
        assert!(Coordinates::new(33.5138, 36.2765).validate().is_ok());
        assert!(Coordinates::new(90.0, 180.0).validate().is_ok());
        assert!(Coordinates::new(-90.0, -180.0).validate().is_ok());
        assert!(Coordinates::new(90.1, 0.0).validate().is_err());
        assert!(Coordinates::new(0.0, -180.5).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        assert!(Coordinates::try_new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::try_new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_cache_key_rounds() {
        let a = Coordinates::new(33.513_801, 36.276_499);
        let b = Coordinates::new(33.513_799, 36.276_501);
        assert_eq!(a.cache_key(5), "33.51380,36.27650");
        assert_eq!(a.cache_key(5), b.cache_key(5));
        assert_ne!(a.cache_key(6), b.cache_key(6));
    }

    #[test]
    fn test_cache_key_ignores_sign_of_zero() {
        let south_west = Coordinates::new(-0.000_001, -0.000_002);
        let north_east = Coordinates::new(0.000_001, 0.000_002);

        assert_eq!(south_west.cache_key(5), "0.00000,0.00000");
        assert_eq!(south_west.cache_key(5), north_east.cache_key(5));
        assert_eq!(Coordinates::new(-0.0, 0.0).fallback_address(), "0.000000, 0.000000");
        assert_eq!(Coordinates::new(-0.000_01, 0.0).cache_key(5), "-0.00001,0.00000");
    }

    #[test]
    fn test_fallback_address() {
        let coords = Coordinates::new(33.5138, 36.2765);
        assert_eq!(coords.fallback_address(), "33.513800, 36.276500");

        let negative = Coordinates::new(-12.5, -77.03);
        assert_eq!(negative.fallback_address(), "-12.500000, -77.030000");
    }

    #[test]
    fn test_serialization() {
        let coords = Coordinates::new(40.7128, -74.0060);
        let json = serde_json::to_string(&coords).unwrap();
        assert_eq!(json, r#"{"lat":40.7128,"lng":-74.006}"#);
    }
}
