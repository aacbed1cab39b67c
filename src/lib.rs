//! ride-pin: manual pickup and drop-off placement for ride hailing
//!
//! A library and CLI tool that lets a rider position trip points by moving
//! a map under a fixed center pin, resolving each position to an address
//! through reverse geocoding.
//!
//! ## Features
//!
//! - Exclusive pin modes for the pickup and drop-off points
//! - Debounced, coalesced reverse geocoding with a coordinate fallback
//! - One-shot confirmation that commits a point with its address
//! - Search suggestions that bypass geocoding entirely
//! - Nominatim and IP location backends, rate limited
//!
//! ## Quick Start
//!
//! ```no_run
//! use ride_pin::geo::nominatim::NominatimBackend;
//! use ride_pin::map::MapViewState;
//! use ride_pin::notify::TracingSink;
//! use ride_pin::{Config, Coordinates, PinTarget, PlacementCoordinator};
//! # struct NoMap;
//! # impl ride_pin::map::MapView for NoMap {
//! #     fn set_center(&self, _: Coordinates) {}
//! #     fn set_zoom(&self, _: u8) {}
//! #     fn zoom_to_marker(&self, _: PinTarget) {}
//! # }
//!
//! # async fn demo() -> ride_pin::Result<()> {
//! let config = Config::default();
//! let backend = NominatimBackend::new(&config.geocoding)?;
//! let view = MapViewState::new(config.default_center()?, config.map.default_zoom);
//! let coordinator =
//!     PlacementCoordinator::new(backend, NoMap, TracingSink, view, config.placement_settings()?);
//!
//! // Pick up where the map is, nudge the pin, then commit it
//! coordinator.activate(PinTarget::From);
//! coordinator.on_map_center_changed(Coordinates::new(33.5116, 36.3064));
//! let pickup = coordinator.confirm().await;
//! println!("Pickup: {:?}", pickup);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod debounce;
pub mod error;
pub mod geo;
pub mod map;
pub mod notify;
pub mod pin;
pub mod placement;
pub mod trip;

// Re-export commonly used types
pub use config::Config;
pub use coord::Coordinates;
pub use error::{Error, Result};
pub use geo::{GeocodingClient, Suggestion};
pub use pin::{PinMode, PinTarget};
pub use placement::{PlacementCoordinator, PlacementSettings, StalePolicy};
pub use trip::{RideRequest, TripCoordinates, TripPoint};
