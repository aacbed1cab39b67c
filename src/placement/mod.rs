//! Placement coordinator
//!
//! Orchestrates manual pin placement: seeds a slot when a mode starts,
//! feeds map movement through a per-slot debouncer into reverse
//! geocoding, and commits the chosen point exactly once on confirmation.
//!
//! All shared state sits behind one mutex that is never held across an
//! await. Lookups resolve in settlement order; a result is applied only if
//! its slot is still the active one when it arrives, otherwise it is
//! dropped. A lookup still in flight is published so confirmation can join
//! it instead of asking the service twice.

#[cfg(test)]
mod tests;

use crate::config::defaults::{
    DEFAULT_CLOSE_UP_ZOOM, DEFAULT_DEBOUNCE_MS, DEFAULT_KEY_PRECISION,
    DEFAULT_MARKER_ZOOM_DELAY_MS,
};
use crate::coord::Coordinates;
use crate::debounce::{Debouncer, Schedule};
use crate::error::Result;
use crate::geo::{DeviceLocator, GeocodingClient, ReverseGeocoder, Suggestion};
use crate::map::{MapView, MapViewState};
use crate::notify::{Notification, NotificationSink};
use crate::pin::{PinMode, PinState, PinTarget, PlacementTarget, Seed};
use crate::trip::{TripCoordinates, TripPoint};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

/// What to do with a lookup result for the active slot whose position has
/// since moved on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Apply it if it answers the most recently dispatched lookup
    #[default]
    LastDispatchedWins,
    /// Drop it unless it matches the slot's current position
    LatestCenterOnly,
}

impl fmt::Display for StalePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastDispatchedWins => write!(f, "last_dispatched"),
            Self::LatestCenterOnly => write!(f, "latest_center"),
        }
    }
}

impl std::str::FromStr for StalePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "last_dispatched" | "last-dispatched" => Ok(Self::LastDispatchedWins),
            "latest_center" | "latest-center" => Ok(Self::LatestCenterOnly),
            _ => Err(format!("Unknown stale policy: {}", s)),
        }
    }
}

/// Coordinator tuning
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementSettings {
    /// Quiet period before a moved pin is looked up
    pub debounce: Duration,
    /// Minimum zoom when focusing a pin
    pub close_up_zoom: u8,
    /// Settle time before zooming to a picked suggestion
    pub marker_zoom_delay: Duration,
    /// Decimal places of the lookup cache key
    pub key_precision: usize,
    pub stale_policy: StalePolicy,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            close_up_zoom: DEFAULT_CLOSE_UP_ZOOM,
            marker_zoom_delay: Duration::from_millis(DEFAULT_MARKER_ZOOM_DELAY_MS),
            key_precision: DEFAULT_KEY_PRECISION,
            stale_policy: StalePolicy::default(),
        }
    }
}

/// A dispatched lookup whose address has not been applied yet
#[derive(Debug)]
struct InFlight {
    id: u64,
    key: String,
    result: watch::Receiver<Option<String>>,
}

#[derive(Debug)]
struct Shared {
    pins: PinState,
    trip: TripCoordinates,
    view: MapViewState,
    in_flight: HashMap<PinTarget, InFlight>,
    next_lookup_id: u64,
    /// Bumped whenever the map is steered somewhere new; a confirmation
    /// only refocuses if nothing else has taken the view while it awaited.
    view_epoch: u64,
}

struct Inner<G, M, N> {
    shared: Mutex<Shared>,
    geocoder: GeocodingClient<G>,
    map: M,
    sink: N,
    origin_lookups: Debouncer,
    destination_lookups: Debouncer,
    settings: PlacementSettings,
}

impl<G, M, N> Inner<G, M, N>
where
    G: ReverseGeocoder,
    M: MapView,
    N: NotificationSink,
{
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookups(&self, target: PinTarget) -> &Debouncer {
        match target {
            PinTarget::From => &self.origin_lookups,
            PinTarget::To => &self.destination_lookups,
        }
    }

    fn key(&self, coordinate: Coordinates) -> String {
        coordinate.cache_key(self.settings.key_precision)
    }

    /// Center the map on `center` and zoom in to at least close-up
    fn focus(&self, center: Coordinates) {
        let zoom = {
            let mut shared = self.lock();
            shared.view_epoch += 1;
            shared.view.center = center;
            shared.view.zoom = shared.view.zoom.max(self.settings.close_up_zoom);
            shared.view.zoom
        };
        self.map.set_center(center);
        self.map.set_zoom(zoom);
    }

    /// Debounced lookup body: resolve, then apply only if still relevant
    async fn run_lookup(&self, target: PinTarget, coordinate: Coordinates, key: String) {
        let (publish, id) = {
            let mut shared = self.lock();
            let id = shared.next_lookup_id;
            shared.next_lookup_id += 1;
            shared.pins.slot_mut(target).last_resolved_key = Some(key.clone());

            let (publish, result) = watch::channel(None);
            shared.in_flight.insert(
                target,
                InFlight {
                    id,
                    key: key.clone(),
                    result,
                },
            );
            (publish, id)
        };
        debug!("Looking up {} address for {}", target.label(), coordinate);

        let address = self.geocoder.resolve(coordinate).await;
        publish.send_replace(Some(address.clone()));

        let discard_reason = {
            let mut shared = self.lock();
            if shared.in_flight.get(&target).is_some_and(|f| f.id == id) {
                shared.in_flight.remove(&target);
            }

            let still_active = shared.pins.mode() == PinMode::from(target);
            let slot = shared.pins.slot_mut(target);
            let current_key = slot.coordinate.map(|c| self.key(c));

            if !still_active {
                Some("slot no longer active")
            } else {
                let superseded = match self.settings.stale_policy {
                    StalePolicy::LastDispatchedWins => {
                        slot.last_resolved_key.as_deref() != Some(key.as_str())
                    }
                    StalePolicy::LatestCenterOnly => current_key.as_deref() != Some(key.as_str()),
                };
                if superseded {
                    Some("a newer lookup has replaced it")
                } else {
                    slot.resolve(key.clone(), address);
                    None
                }
            }
        };

        if let Some(reason) = discard_reason {
            debug!("Discarding {} lookup for {}: {}", target.label(), key, reason);
            // A dropped result must not block a later lookup of the same spot
            self.lookups(target).forget(&key);
        }
    }
}

/// Manual pin placement coordinator
///
/// Methods that schedule work (`activate`, `on_map_center_changed`,
/// `select_suggestion`) must be called from within a Tokio runtime.
pub struct PlacementCoordinator<G, M, N> {
    inner: Arc<Inner<G, M, N>>,
}

impl<G, M, N> Clone for PlacementCoordinator<G, M, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G, M, N> PlacementCoordinator<G, M, N>
where
    G: ReverseGeocoder + 'static,
    M: MapView + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(
        geocoder: G,
        map: M,
        sink: N,
        initial_view: MapViewState,
        settings: PlacementSettings,
    ) -> Self {
        let shared = Shared {
            pins: PinState::new(),
            trip: TripCoordinates::new(),
            view: initial_view,
            in_flight: HashMap::new(),
            next_lookup_id: 0,
            view_epoch: 0,
        };

        Self {
            inner: Arc::new(Inner {
                shared: Mutex::new(shared),
                geocoder: GeocodingClient::new(geocoder),
                map,
                sink,
                origin_lookups: Debouncer::new(),
                destination_lookups: Debouncer::new(),
                settings,
            }),
        }
    }

    pub fn mode(&self) -> PinMode {
        self.inner.lock().pins.mode()
    }

    /// Snapshot of a slot's provisional state
    pub fn slot(&self, target: PinTarget) -> PlacementTarget {
        self.inner.lock().pins.slot(target).clone()
    }

    /// Snapshot of the committed trip points
    pub fn trip(&self) -> TripCoordinates {
        self.inner.lock().trip.clone()
    }

    /// Last known map view
    pub fn view(&self) -> MapViewState {
        self.inner.lock().view
    }

    pub fn settings(&self) -> &PlacementSettings {
        &self.inner.settings
    }

    pub fn geocoder(&self) -> &G {
        self.inner.geocoder.backend()
    }

    /// Start positioning `target`
    ///
    /// A slot with a point focuses the map on it; an empty slot adopts the
    /// current map center. Any other mode is implicitly deactivated.
    pub fn activate(&self, target: PinTarget) {
        let (activation, needs_lookup) = {
            let mut shared = self.inner.lock();
            shared.view_epoch += 1;
            let center = shared.view.center;
            let activation = shared.pins.activate(target, center);
            let key = self.inner.key(activation.seed.coordinate());
            let needs_lookup = shared.pins.slot(target).address_for(&key).is_none();
            (activation, needs_lookup)
        };

        if let Some(previous) = activation.replaced {
            self.inner.lookups(previous).cancel();
            debug!("Switched from {} to {}", previous.label(), target.label());
        }

        if let Seed::Existing(coordinate) = activation.seed {
            self.inner.focus(coordinate);
        }

        if !activation.already_active {
            self.inner.sink.notify(Notification::placement_started(target));
        }

        if needs_lookup {
            self.schedule_lookup(target, activation.seed.coordinate());
        }
    }

    /// Leave placement without committing anything
    pub fn cancel(&self) -> Option<PinTarget> {
        let previous = self.inner.lock().pins.deactivate()?;
        self.inner.lookups(previous).cancel();
        debug!("Cancelled {} placement", previous.label());
        Some(previous)
    }

    /// Cancel pending lookups; call when the host view goes away
    pub fn shutdown(&self) {
        self.inner.origin_lookups.cancel();
        self.inner.destination_lookups.cancel();
    }

    /// Map center moved (high frequency)
    ///
    /// Moves the active slot immediately and debounces its address lookup.
    /// With no active mode only the remembered view is updated.
    pub fn on_map_center_changed(&self, center: Coordinates) {
        if let Err(e) = center.validate() {
            warn!("Ignoring map center: {}", e);
            return;
        }

        let key = self.inner.key(center);
        let pending = {
            let mut shared = self.inner.lock();
            if shared.view.center != center {
                shared.view_epoch += 1;
                shared.view.center = center;
            }
            match shared.pins.active_slot_mut() {
                Some((target, slot)) => {
                    slot.move_to(center);
                    slot.address_for(&key).is_none().then_some(target)
                }
                None => None,
            }
        };

        if let Some(target) = pending {
            self.schedule_lookup(target, center);
        }
    }

    fn schedule_lookup(&self, target: PinTarget, coordinate: Coordinates) {
        let key = self.inner.key(coordinate);
        let weak: Weak<Inner<G, M, N>> = Arc::downgrade(&self.inner);

        let outcome = self.inner.lookups(target).schedule(
            key.clone(),
            self.inner.settings.debounce,
            move |key| async move {
                if let Some(inner) = weak.upgrade() {
                    inner.run_lookup(target, coordinate, key).await;
                }
            },
        );

        match outcome {
            Schedule::Scheduled => trace!("Scheduled {} lookup for {}", target.label(), key),
            Schedule::Coalesced => trace!("{} lookup for {} already pending", target.label(), key),
            Schedule::Suppressed => debug!("{} already looked up at {}", target.label(), key),
        }
    }

    /// Commit the active slot
    ///
    /// Resolves the address right away (skipping the network when the
    /// debounced lookup already resolved this exact position, and joining
    /// it when it is still in flight), writes the trip point, notifies,
    /// focuses the map and leaves placement mode. Returns `None` without
    /// side effects when no mode is active.
    ///
    /// The map is only refocused if no other placement or selection has
    /// steered it while the address was being resolved.
    pub async fn confirm(&self) -> Option<TripPoint> {
        let (target, coordinate, key, cached, in_flight, epoch) = {
            let mut shared = self.inner.lock();
            let target = shared.pins.mode().target()?;
            let slot = shared.pins.slot(target);
            let coordinate = slot.coordinate?;
            let key = self.inner.key(coordinate);
            let cached = slot.address_for(&key).map(str::to_owned);
            let in_flight = shared
                .in_flight
                .get(&target)
                .filter(|f| f.key == key)
                .map(|f| f.result.clone());
            // Leave the mode before awaiting so a second confirm is a no-op
            shared.pins.deactivate();
            (target, coordinate, key, cached, in_flight, shared.view_epoch)
        };

        let lookups = self.inner.lookups(target);
        lookups.cancel();

        let joined = match (&cached, in_flight) {
            (None, Some(result)) => {
                debug!("Joining in-flight lookup for {}", key);
                join_lookup(result).await
            }
            _ => None,
        };

        let address = match cached.or(joined) {
            Some(address) => {
                debug!("Reusing resolved address for {}", key);
                address
            }
            None => {
                lookups.mark_dispatched(key.clone());
                self.inner.geocoder.resolve(coordinate).await
            }
        };

        let point = TripPoint::new(coordinate, address.clone());
        let refocus = {
            let mut shared = self.inner.lock();
            shared.pins.slot_mut(target).resolve(key, address.clone());
            shared.trip.set(target, point.clone());
            shared.view_epoch == epoch
        };

        info!("Confirmed {} at {}: {}", target.label(), coordinate, address);
        self.inner
            .sink
            .notify(Notification::placement_confirmed(target, &address));

        if refocus {
            self.inner.focus(coordinate);
        } else {
            debug!("Map moved on while confirming {}; not refocusing", target.label());
        }

        Some(point)
    }

    /// Commit a picked search suggestion for `target` without geocoding
    ///
    /// Leaves the pin mode untouched. The map is centered at once and asked
    /// to zoom to the marker after a short settle delay.
    pub fn select_suggestion(&self, suggestion: &Suggestion, target: PinTarget) -> Result<TripPoint> {
        let coordinate = suggestion.coordinates();
        coordinate.validate()?;

        let point = TripPoint::new(coordinate, suggestion.name.clone());
        let key = self.inner.key(coordinate);

        self.inner.lookups(target).cancel();
        {
            let mut shared = self.inner.lock();
            let slot = shared.pins.slot_mut(target);
            slot.move_to(coordinate);
            slot.resolve(key, suggestion.name.clone());
            shared.trip.set(target, point.clone());
            shared.view.center = coordinate;
            shared.view_epoch += 1;
        }

        info!("Selected {} suggestion: {}", target.label(), suggestion.name);
        self.inner.map.set_center(coordinate);

        let weak = Arc::downgrade(&self.inner);
        let delay = self.inner.settings.marker_zoom_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.map.zoom_to_marker(target);
            }
        });

        Ok(point)
    }

    /// Center the map on the device position
    ///
    /// On failure the map stays where it is and the user is told once;
    /// manual placement keeps working.
    pub async fn center_on_device<L: DeviceLocator>(&self, locator: &L) -> Option<Coordinates> {
        match locator.locate().await {
            Ok(position) => {
                info!("Centering on device location {}", position);
                self.inner.focus(position);
                Some(position)
            }
            Err(e) => {
                warn!("Device location unavailable: {}", e);
                self.inner
                    .sink
                    .notify(Notification::location_unavailable(&e.to_string()));
                None
            }
        }
    }
}

/// Wait for an in-flight lookup; `None` if it went away without an answer
async fn join_lookup(mut result: watch::Receiver<Option<String>>) -> Option<String> {
    let address = match result.wait_for(Option::is_some).await {
        Ok(address) => (*address).clone(),
        Err(_) => None,
    };
    address
}
