//! Coordinator scenarios, run on a paused clock

use super::*;
use crate::error::Error;
use crate::notify::NotificationStyle;
use crate::pin::PLACEHOLDER_ADDRESS;
use std::collections::VecDeque;
use tokio::sync::Semaphore;
use tokio::time::sleep;

const SETTLE: Duration = Duration::from_millis(500);

fn damascus() -> Coordinates {
    Coordinates::new(33.5138, 36.2765)
}

fn street_name(c: Coordinates) -> String {
    format!("Street near {:.4}, {:.4}", c.lat, c.lng)
}

/// Reverse geocoder that records calls and can be held back by a gate
/// or by per-call latencies
#[derive(Clone, Default)]
struct FakeGeocoder {
    calls: Arc<Mutex<Vec<Coordinates>>>,
    gate: Option<Arc<Semaphore>>,
    latencies: Arc<Mutex<VecDeque<Duration>>>,
    fail: bool,
}

impl FakeGeocoder {
    fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let geocoder = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (geocoder, gate)
    }

    /// The n-th call takes the n-th latency; later calls answer at once
    fn with_latencies(latencies: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            latencies: Arc::new(Mutex::new(latencies.into_iter().collect())),
            ..Self::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Coordinates> {
        self.calls.lock().unwrap().clone()
    }
}

impl ReverseGeocoder for FakeGeocoder {
    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Option<String>> {
        self.calls.lock().unwrap().push(coords);
        let latency = self.latencies.lock().unwrap().pop_front();
        if let Some(latency) = latency {
            sleep(latency).await;
        }
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.fail {
            return Err(Error::Geocoding("service unavailable".to_string()));
        }
        Ok(Some(street_name(coords)))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum MapCall {
    Center(Coordinates),
    Zoom(u8),
    ZoomToMarker(PinTarget),
}

#[derive(Clone, Default)]
struct RecordingMap {
    calls: Arc<Mutex<Vec<MapCall>>>,
}

impl RecordingMap {
    fn calls(&self) -> Vec<MapCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl MapView for RecordingMap {
    fn set_center(&self, center: Coordinates) {
        self.calls.lock().unwrap().push(MapCall::Center(center));
    }

    fn set_zoom(&self, zoom: u8) {
        self.calls.lock().unwrap().push(MapCall::Zoom(zoom));
    }

    fn zoom_to_marker(&self, target: PinTarget) {
        self.calls.lock().unwrap().push(MapCall::ZoomToMarker(target));
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    seen: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingSink {
    fn seen(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

struct FakeLocator(Option<Coordinates>);

impl DeviceLocator for FakeLocator {
    async fn locate(&self) -> Result<Coordinates> {
        self.0
            .ok_or_else(|| Error::Geolocation("Permission denied".to_string()))
    }
}

type TestCoordinator = PlacementCoordinator<FakeGeocoder, RecordingMap, RecordingSink>;

struct Harness {
    coordinator: TestCoordinator,
    geocoder: FakeGeocoder,
    map: RecordingMap,
    sink: RecordingSink,
}

fn harness_with(geocoder: FakeGeocoder, settings: PlacementSettings) -> Harness {
    let map = RecordingMap::default();
    let sink = RecordingSink::default();
    let coordinator = PlacementCoordinator::new(
        geocoder.clone(),
        map.clone(),
        sink.clone(),
        MapViewState::new(damascus(), 13),
        settings,
    );
    Harness {
        coordinator,
        geocoder,
        map,
        sink,
    }
}

fn harness() -> Harness {
    harness_with(FakeGeocoder::default(), PlacementSettings::default())
}

#[tokio::test(start_paused = true)]
async fn test_manual_origin_placement() {
    let h = harness();
    assert_eq!(h.coordinator.mode(), PinMode::None);

    h.coordinator.activate(PinTarget::From);
    assert_eq!(h.coordinator.mode(), PinMode::From);

    let slot = h.coordinator.slot(PinTarget::From);
    assert_eq!(slot.coordinate, Some(damascus()));
    assert_eq!(slot.display_address(), PLACEHOLDER_ADDRESS);

    sleep(SETTLE).await;
    assert_eq!(h.geocoder.calls(), vec![damascus()]);
    assert_eq!(
        h.coordinator.slot(PinTarget::From).address,
        Some(street_name(damascus()))
    );

    let point = h.coordinator.confirm().await.unwrap();
    assert_eq!(point.coordinate, damascus());
    assert_eq!(point.address, street_name(damascus()));
    assert_eq!(h.coordinator.trip().origin, Some(point));
    assert_eq!(h.coordinator.mode(), PinMode::None);

    // Confirm reused the debounced result
    assert_eq!(h.geocoder.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rapid_movement_dispatches_one_lookup() {
    let h = harness();
    h.coordinator.activate(PinTarget::To);

    let mut last = damascus();
    for i in 1..=10 {
        last = Coordinates::new(33.5138 + i as f64 * 0.001, 36.2765);
        h.coordinator.on_map_center_changed(last);
        sleep(Duration::from_millis(25)).await;
    }
    sleep(SETTLE).await;

    assert_eq!(h.geocoder.calls(), vec![last]);
    let slot = h.coordinator.slot(PinTarget::To);
    assert_eq!(slot.coordinate, Some(last));
    assert_eq!(slot.address, Some(street_name(last)));
}

#[tokio::test(start_paused = true)]
async fn test_slot_tracks_center_before_address_resolves() {
    let h = harness();
    h.coordinator.activate(PinTarget::From);

    let moved = Coordinates::new(33.52, 36.28);
    h.coordinator.on_map_center_changed(moved);

    // Live feedback: position updates immediately, lookup is still pending
    assert_eq!(h.coordinator.slot(PinTarget::From).coordinate, Some(moved));
    assert!(h.geocoder.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_mode_switch_never_commits() {
    let h = harness();
    h.coordinator.activate(PinTarget::From);
    h.coordinator.activate(PinTarget::To);
    sleep(SETTLE).await;

    assert_eq!(h.coordinator.mode(), PinMode::To);
    assert!(h.coordinator.trip().origin.is_none());
    assert!(h.coordinator.trip().destination.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_confirm_without_mode_is_noop() {
    let h = harness();
    let before_trip = h.coordinator.trip();

    assert!(h.coordinator.confirm().await.is_none());
    sleep(SETTLE).await;

    assert_eq!(h.coordinator.trip(), before_trip);
    assert_eq!(h.coordinator.mode(), PinMode::None);
    assert!(h.geocoder.calls().is_empty());
    assert!(h.map.calls().is_empty());
    assert!(h.sink.seen().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_activate_twice_matches_once() {
    let once = harness();
    once.coordinator.activate(PinTarget::From);
    sleep(SETTLE).await;

    let twice = harness();
    twice.coordinator.activate(PinTarget::From);
    twice.coordinator.activate(PinTarget::From);
    sleep(SETTLE).await;

    assert_eq!(once.coordinator.mode(), twice.coordinator.mode());
    assert_eq!(
        once.coordinator.slot(PinTarget::From),
        twice.coordinator.slot(PinTarget::From)
    );
    assert_eq!(once.geocoder.calls(), twice.geocoder.calls());
    // One entry notification; the repeat only re-centers
    assert_eq!(twice.sink.seen().len(), 1);
    assert_eq!(
        twice.map.calls(),
        vec![MapCall::Center(damascus()), MapCall::Zoom(17)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_stale_lookup_discarded_after_mode_switch() {
    let (geocoder, gate) = FakeGeocoder::gated();
    let h = harness_with(geocoder, PlacementSettings::default());

    // Lookup for A goes out for the origin and hangs
    h.coordinator.activate(PinTarget::From);
    sleep(SETTLE).await;
    assert_eq!(h.geocoder.calls(), vec![damascus()]);

    // User switches to the destination and moves to B
    h.coordinator.activate(PinTarget::To);
    let b = Coordinates::new(33.5116, 36.3064);
    h.coordinator.on_map_center_changed(b);
    sleep(SETTLE).await;

    // A settles first: nobody may take it
    gate.add_permits(1);
    sleep(Duration::from_millis(10)).await;
    assert_eq!(h.coordinator.slot(PinTarget::From).address, None);
    assert_eq!(h.coordinator.slot(PinTarget::To).address, None);

    gate.add_permits(1);
    sleep(Duration::from_millis(10)).await;
    let destination = h.coordinator.slot(PinTarget::To);
    assert_eq!(destination.address, Some(street_name(b)));
    assert_eq!(destination.address_key, Some(b.cache_key(5)));
    assert_eq!(h.coordinator.trip(), TripCoordinates::default());
}

#[tokio::test(start_paused = true)]
async fn test_discarded_lookup_can_be_repeated() {
    let (geocoder, gate) = FakeGeocoder::gated();
    let h = harness_with(geocoder, PlacementSettings::default());

    h.coordinator.activate(PinTarget::From);
    sleep(SETTLE).await;
    h.coordinator.cancel();
    gate.add_permits(1);
    sleep(Duration::from_millis(10)).await;
    assert_eq!(h.coordinator.slot(PinTarget::From).address, None);

    // Same spot again: the dropped result must not suppress a new lookup
    h.coordinator.activate(PinTarget::From);
    gate.add_permits(1);
    sleep(SETTLE).await;

    assert_eq!(h.geocoder.calls(), vec![damascus(), damascus()]);
    assert_eq!(
        h.coordinator.slot(PinTarget::From).address,
        Some(street_name(damascus()))
    );
}

#[tokio::test(start_paused = true)]
async fn test_suggestion_bypass() {
    let h = harness();
    let suggestion = Suggestion::new("Umayyad Mosque", 33.5116, 36.3064);

    let point = h
        .coordinator
        .select_suggestion(&suggestion, PinTarget::To)
        .unwrap();

    assert_eq!(point.address, "Umayyad Mosque");
    assert_eq!(h.coordinator.trip().destination, Some(point));
    assert_eq!(h.coordinator.mode(), PinMode::None);
    assert_eq!(
        h.map.calls(),
        vec![MapCall::Center(suggestion.coordinates())]
    );

    sleep(SETTLE).await;
    assert!(h.geocoder.calls().is_empty());
    assert_eq!(
        h.map.calls().last(),
        Some(&MapCall::ZoomToMarker(PinTarget::To))
    );
}

#[tokio::test(start_paused = true)]
async fn test_suggestion_rejects_invalid_coordinates() {
    let h = harness();
    let bogus = Suggestion::new("Nowhere", 123.0, 0.0);

    assert!(h.coordinator.select_suggestion(&bogus, PinTarget::From).is_err());
    assert!(h.coordinator.trip().origin.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_confirm_resolves_immediately() {
    let h = harness();
    h.coordinator.activate(PinTarget::From);
    sleep(SETTLE).await;

    let moved = Coordinates::new(33.52, 36.29);
    h.coordinator.on_map_center_changed(moved);
    let point = h.coordinator.confirm().await.unwrap();

    assert_eq!(point.coordinate, moved);
    assert_eq!(point.address, street_name(moved));

    // The pending debounce for `moved` was cancelled, not fired later
    sleep(SETTLE).await;
    assert_eq!(h.geocoder.calls(), vec![damascus(), moved]);
}

#[tokio::test(start_paused = true)]
async fn test_confirm_focuses_map_and_notifies() {
    let h = harness();
    h.coordinator.activate(PinTarget::To);
    sleep(SETTLE).await;
    h.coordinator.confirm().await.unwrap();

    assert_eq!(
        h.map.calls(),
        vec![MapCall::Center(damascus()), MapCall::Zoom(17)]
    );
    assert_eq!(h.coordinator.view().zoom, 17);

    let seen = h.sink.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], Notification::placement_started(PinTarget::To));
    assert_eq!(seen[1].style, NotificationStyle::Success);
    assert_eq!(seen[1].description, street_name(damascus()));
}

#[tokio::test(start_paused = true)]
async fn test_confirm_falls_back_to_coordinates() {
    let h = harness_with(FakeGeocoder::failing(), PlacementSettings::default());
    h.coordinator.activate(PinTarget::From);

    let point = h.coordinator.confirm().await.unwrap();
    assert_eq!(point.address, "33.513800, 36.276500");
}

#[tokio::test(start_paused = true)]
async fn test_second_confirm_is_noop() {
    let h = harness();
    h.coordinator.activate(PinTarget::From);

    let (first, second) = tokio::join!(h.coordinator.confirm(), h.coordinator.confirm());
    assert_eq!(first.is_some() as u8 + second.is_some() as u8, 1);
    assert_eq!(h.geocoder.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_movement_without_mode_only_updates_view() {
    let h = harness();
    let elsewhere = Coordinates::new(33.50, 36.30);

    h.coordinator.on_map_center_changed(elsewhere);
    sleep(SETTLE).await;
    assert!(h.geocoder.calls().is_empty());
    assert_eq!(h.coordinator.view().center, elsewhere);

    // The next activation adopts where the map actually is
    h.coordinator.activate(PinTarget::From);
    assert_eq!(
        h.coordinator.slot(PinTarget::From).coordinate,
        Some(elsewhere)
    );
}

#[tokio::test(start_paused = true)]
async fn test_invalid_center_is_ignored() {
    let h = harness();
    h.coordinator.activate(PinTarget::From);

    h.coordinator.on_map_center_changed(Coordinates::new(f64::NAN, 36.0));
    h.coordinator.on_map_center_changed(Coordinates::new(95.0, 36.0));

    assert_eq!(
        h.coordinator.slot(PinTarget::From).coordinate,
        Some(damascus())
    );
    assert_eq!(h.coordinator.view().center, damascus());
}

#[tokio::test(start_paused = true)]
async fn test_reactivation_focuses_existing_point() {
    let h = harness();
    h.coordinator.activate(PinTarget::To);
    let placed = Coordinates::new(33.53, 36.25);
    h.coordinator.on_map_center_changed(placed);
    sleep(SETTLE).await;
    h.coordinator.confirm().await.unwrap();

    h.coordinator.on_map_center_changed(damascus());
    h.coordinator.activate(PinTarget::To);

    assert_eq!(h.coordinator.slot(PinTarget::To).coordinate, Some(placed));
    assert_eq!(
        h.map.calls().iter().rev().take(2).cloned().collect::<Vec<_>>(),
        vec![MapCall::Zoom(17), MapCall::Center(placed)]
    );

    // Address already known for this point: nothing new to look up
    sleep(SETTLE).await;
    assert_eq!(h.geocoder.calls(), vec![placed]);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_pending_lookup() {
    let h = harness();
    h.coordinator.activate(PinTarget::From);
    assert_eq!(h.coordinator.cancel(), Some(PinTarget::From));
    assert_eq!(h.coordinator.cancel(), None);

    sleep(SETTLE).await;
    assert!(h.geocoder.calls().is_empty());
    assert!(h.coordinator.trip().origin.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_timers() {
    let h = harness();
    h.coordinator.activate(PinTarget::From);
    h.coordinator.shutdown();

    sleep(SETTLE).await;
    assert!(h.geocoder.calls().is_empty());
}

async fn superseded_result(policy: StalePolicy) -> Option<String> {
    let (geocoder, gate) = FakeGeocoder::gated();
    let settings = PlacementSettings {
        stale_policy: policy,
        ..PlacementSettings::default()
    };
    let h = harness_with(geocoder, settings);

    h.coordinator.activate(PinTarget::From);
    sleep(SETTLE).await;

    // Lookup for the start point is in flight; the pin moves on
    h.coordinator
        .on_map_center_changed(Coordinates::new(33.52, 36.29));
    gate.add_permits(1);
    sleep(Duration::from_millis(10)).await;

    h.coordinator.slot(PinTarget::From).address
}

#[tokio::test(start_paused = true)]
async fn test_last_dispatched_policy_applies_superseded_result() {
    assert_eq!(
        superseded_result(StalePolicy::LastDispatchedWins).await,
        Some(street_name(damascus()))
    );
}

#[tokio::test(start_paused = true)]
async fn test_latest_center_policy_drops_superseded_result() {
    assert_eq!(superseded_result(StalePolicy::LatestCenterOnly).await, None);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_address_is_not_reused_on_confirm() {
    let (geocoder, gate) = FakeGeocoder::gated();
    let h = harness_with(geocoder, PlacementSettings::default());

    h.coordinator.activate(PinTarget::From);
    sleep(SETTLE).await;
    let moved = Coordinates::new(33.52, 36.29);
    h.coordinator.on_map_center_changed(moved);
    gate.add_permits(2);
    sleep(Duration::from_millis(10)).await;

    let point = h.coordinator.confirm().await.unwrap();
    assert_eq!(point.address, street_name(moved));
}

#[tokio::test(start_paused = true)]
async fn test_device_location_failure_keeps_map() {
    let h = harness();

    let located = h.coordinator.center_on_device(&FakeLocator(None)).await;

    assert!(located.is_none());
    assert_eq!(h.coordinator.view().center, damascus());
    assert!(h.map.calls().is_empty());
    let seen = h.sink.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].style, NotificationStyle::Warning);

    // Manual placement still works
    h.coordinator.activate(PinTarget::From);
    assert_eq!(h.coordinator.confirm().await.unwrap().coordinate, damascus());
}

#[tokio::test(start_paused = true)]
async fn test_device_location_success_focuses_map() {
    let h = harness();
    let here = Coordinates::new(33.49, 36.31);

    let located = h.coordinator.center_on_device(&FakeLocator(Some(here))).await;

    assert_eq!(located, Some(here));
    assert_eq!(h.coordinator.view().center, here);
    assert_eq!(
        h.map.calls(),
        vec![MapCall::Center(here), MapCall::Zoom(17)]
    );
    assert!(h.sink.seen().is_empty());
}

#[test]
fn test_stale_policy_parsing() {
    assert_eq!(
        "last_dispatched".parse::<StalePolicy>().unwrap(),
        StalePolicy::LastDispatchedWins
    );
    assert_eq!(
        "latest-center".parse::<StalePolicy>().unwrap(),
        StalePolicy::LatestCenterOnly
    );
    assert!("newest".parse::<StalePolicy>().is_err());
    assert_eq!(StalePolicy::LatestCenterOnly.to_string(), "latest_center");
}

#[tokio::test(start_paused = true)]
async fn test_confirm_leaves_map_to_next_placement() {
    let (geocoder, gate) = FakeGeocoder::gated();
    let h = harness_with(geocoder, PlacementSettings::default());

    let pickup = Coordinates::new(33.52, 36.29);
    h.coordinator.activate(PinTarget::From);
    h.coordinator.on_map_center_changed(pickup);

    let confirming = {
        let coordinator = h.coordinator.clone();
        tokio::spawn(async move { coordinator.confirm().await })
    };
    sleep(Duration::from_millis(1)).await;
    assert_eq!(h.geocoder.calls(), vec![pickup]);

    // Rider moves on to the drop-off while the pickup is still resolving
    let dropoff = Coordinates::new(33.49, 36.31);
    h.coordinator.activate(PinTarget::To);
    h.coordinator.on_map_center_changed(dropoff);
    gate.add_permits(1);

    let point = confirming.await.unwrap().unwrap();
    assert_eq!(point.coordinate, pickup);
    assert_eq!(h.coordinator.trip().origin, Some(point));

    // The late pickup commit must not drag the map or the drop-off back
    assert_eq!(h.coordinator.mode(), PinMode::To);
    assert_eq!(h.coordinator.view().center, dropoff);
    assert_eq!(h.coordinator.slot(PinTarget::To).coordinate, Some(dropoff));
    assert!(!h.map.calls().contains(&MapCall::Center(pickup)));
}

#[tokio::test(start_paused = true)]
async fn test_late_result_does_not_overwrite_newer_address() {
    let h = harness_with(
        FakeGeocoder::with_latencies([Duration::from_secs(3)]),
        PlacementSettings::default(),
    );

    // Lookup for the start point is slow
    h.coordinator.activate(PinTarget::From);
    sleep(SETTLE).await;

    // A lookup for B goes out later and answers first
    let b = Coordinates::new(33.52, 36.29);
    h.coordinator.on_map_center_changed(b);
    sleep(SETTLE).await;
    assert_eq!(
        h.coordinator.slot(PinTarget::From).address,
        Some(street_name(b))
    );

    // The slow answer for the start point lands last
    sleep(Duration::from_secs(3)).await;
    let slot = h.coordinator.slot(PinTarget::From);
    assert_eq!(slot.address, Some(street_name(b)));
    assert_eq!(slot.address_key, Some(b.cache_key(5)));

    h.coordinator.on_map_center_changed(b);
    sleep(SETTLE).await;
    assert_eq!(h.geocoder.calls(), vec![damascus(), b]);
    assert_eq!(h.coordinator.confirm().await.unwrap().address, street_name(b));
}

#[tokio::test(start_paused = true)]
async fn test_confirm_joins_in_flight_lookup() {
    let (geocoder, gate) = FakeGeocoder::gated();
    let h = harness_with(geocoder, PlacementSettings::default());

    h.coordinator.activate(PinTarget::From);
    sleep(SETTLE).await;
    assert_eq!(h.geocoder.calls(), vec![damascus()]);

    let confirming = {
        let coordinator = h.coordinator.clone();
        tokio::spawn(async move { coordinator.confirm().await })
    };
    sleep(Duration::from_millis(1)).await;
    gate.add_permits(1);

    let point = confirming.await.unwrap().unwrap();
    assert_eq!(point.address, street_name(damascus()));
    assert_eq!(h.geocoder.calls(), vec![damascus()]);
    assert_eq!(h.coordinator.mode(), PinMode::None);
}

#[tokio::test(start_paused = true)]
async fn test_confirm_keeps_map_where_rider_panned() {
    let (geocoder, gate) = FakeGeocoder::gated();
    let h = harness_with(geocoder, PlacementSettings::default());

    h.coordinator.activate(PinTarget::From);
    let confirming = {
        let coordinator = h.coordinator.clone();
        tokio::spawn(async move { coordinator.confirm().await })
    };
    sleep(Duration::from_millis(1)).await;

    let elsewhere = Coordinates::new(33.50, 36.30);
    h.coordinator.on_map_center_changed(elsewhere);
    gate.add_permits(1);

    let point = confirming.await.unwrap().unwrap();
    assert_eq!(point.coordinate, damascus());
    assert_eq!(h.coordinator.view().center, elsewhere);
    assert!(h.map.calls().is_empty());
}
