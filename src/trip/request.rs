//! Ride request handoff
//!
//! Packages confirmed trip points for the booking backend. Price is not
//! computed here; it is finalized by a separate pricing step.

use crate::error::{Error, Result};
use crate::trip::{TripCoordinates, TripPoint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A ride request ready for submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideRequest {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub origin: TripPoint,
    pub destination: TripPoint,
    /// Straight-line distance between the two points, in meters
    pub distance_meters: f64,
    /// Filled in by pricing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl RideRequest {
    /// Build a request from confirmed trip points
    pub fn from_trip(trip: &TripCoordinates) -> Result<Self> {
        let origin = trip
            .origin
            .clone()
            .ok_or_else(|| Error::IncompleteTrip("pickup has not been confirmed".to_string()))?;
        let destination = trip
            .destination
            .clone()
            .ok_or_else(|| Error::IncompleteTrip("drop-off has not been confirmed".to_string()))?;
        let distance_meters = trip.distance_meters().unwrap_or_default();

        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            origin,
            destination,
            distance_meters,
            price: None,
        })
    }
}
