//! Map widget contract
//!
//! The map itself (tiles, markers, gestures) belongs to the host. The
//! coordinator only asks it to move; center changes come back through
//! `PlacementCoordinator::on_map_center_changed`.

use crate::coord::Coordinates;
use crate::pin::PinTarget;
use serde::{Deserialize, Serialize};

/// Imperative handle onto the host's map
pub trait MapView: Send + Sync {
    fn set_center(&self, center: Coordinates);

    fn set_zoom(&self, zoom: u8);

    /// Fit the view to the marker of `target`
    fn zoom_to_marker(&self, target: PinTarget);
}

/// Last known view of the map, as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapViewState {
    pub center: Coordinates,
    pub zoom: u8,
}

impl MapViewState {
    pub fn new(center: Coordinates, zoom: u8) -> Self {
        Self { center, zoom }
    }
}
