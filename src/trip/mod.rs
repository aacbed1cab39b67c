//! Committed trip points
//!
//! Holds the confirmed origin and destination that ride-request
//! submission consumes. A point always carries both its coordinate and
//! its address.

pub mod request;

use crate::coord::distance::haversine_distance;
use crate::coord::Coordinates;
use crate::pin::PinTarget;
use serde::{Deserialize, Serialize};

pub use request::RideRequest;

/// A confirmed coordinate with its address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPoint {
    pub coordinate: Coordinates,
    pub address: String,
}

impl TripPoint {
    pub fn new(coordinate: Coordinates, address: impl Into<String>) -> Self {
        Self {
            coordinate,
            address: address.into(),
        }
    }
}

/// Confirmed origin and destination
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripCoordinates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<TripPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<TripPoint>,
}

impl TripCoordinates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, target: PinTarget) -> Option<&TripPoint> {
        match target {
            PinTarget::From => self.origin.as_ref(),
            PinTarget::To => self.destination.as_ref(),
        }
    }

    /// Commit a point for `target`, returning the one it replaced
    pub fn set(&mut self, target: PinTarget, point: TripPoint) -> Option<TripPoint> {
        let slot = match target {
            PinTarget::From => &mut self.origin,
            PinTarget::To => &mut self.destination,
        };
        slot.replace(point)
    }

    pub fn clear(&mut self, target: PinTarget) -> Option<TripPoint> {
        match target {
            PinTarget::From => self.origin.take(),
            PinTarget::To => self.destination.take(),
        }
    }

    /// Both ends are set
    pub fn is_complete(&self) -> bool {
        self.origin.is_some() && self.destination.is_some()
    }

    /// Straight-line distance between origin and destination, in meters
    pub fn distance_meters(&self) -> Option<f64> {
        match (&self.origin, &self.destination) {
            (Some(origin), Some(destination)) => Some(haversine_distance(
                origin.coordinate,
                destination.coordinate,
            )),
            _ => None,
        }
    }
}
