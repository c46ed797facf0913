//! Ride lifecycle state machine.
//!
//! ```text
//! Requested --assign--> DriverAssigned --start--> DriverEnRoute
//!     --pickup--> RideInProgress --complete--> Completed
//! ```
//!
//! `cancel` is legal from every non-terminal status. Every transition method
//! returns `false` (and changes nothing) when called from the wrong status; on
//! success the new status is applied first and then every registered observer is
//! notified in registration order.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agents::{Driver, DriverInfo, Rider, VehicleKind};
use crate::clock::Clock;
use crate::ids::{RideId, RiderId};
use crate::observers::RideObserver;
use crate::pricing::FareBasis;
use crate::spatial::{distance_km, Coordinate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    Requested,
    DriverAssigned,
    DriverEnRoute,
    RideInProgress,
    Completed,
    Cancelled,
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Requested => "REQUESTED",
            RideStatus::DriverAssigned => "DRIVER_ASSIGNED",
            RideStatus::DriverEnRoute => "DRIVER_EN_ROUTE",
            RideStatus::RideInProgress => "RIDE_IN_PROGRESS",
            RideStatus::Completed => "COMPLETED",
            RideStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Cancelled)
    }

    /// Whether `action` is legal from this status.
    pub fn permits(&self, action: RideAction) -> bool {
        match action {
            RideAction::Assign => *self == RideStatus::Requested,
            RideAction::Start => *self == RideStatus::DriverAssigned,
            RideAction::Pickup => *self == RideStatus::DriverEnRoute,
            RideAction::Complete => *self == RideStatus::RideInProgress,
            RideAction::Cancel => !self.is_terminal(),
        }
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The lifecycle operations a caller can attempt on a ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RideAction {
    Assign,
    Start,
    Pickup,
    Complete,
    Cancel,
}

impl fmt::Display for RideAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RideAction::Assign => "assign",
            RideAction::Start => "start",
            RideAction::Pickup => "pickup",
            RideAction::Complete => "complete",
            RideAction::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideKind {
    Regular,
    Carpool,
}

pub struct Ride {
    id: RideId,
    rider: Arc<Rider>,
    driver: Option<Arc<Driver>>,
    pickup: Coordinate,
    dropoff: Coordinate,
    vehicle_kind: VehicleKind,
    kind: RideKind,
    status: RideStatus,
    requested_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    fare: f64,
    distance_km: f64,
    stamp_cancellation: bool,
    observers: Vec<Arc<dyn RideObserver>>,
    clock: Arc<dyn Clock>,
}

impl Ride {
    /// Create a ride in `Requested`. Distance is computed here and never again.
    pub fn new(
        rider: Arc<Rider>,
        pickup: Coordinate,
        dropoff: Coordinate,
        vehicle_kind: VehicleKind,
        kind: RideKind,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            id: RideId::new(),
            rider,
            driver: None,
            pickup,
            dropoff,
            vehicle_kind,
            kind,
            status: RideStatus::Requested,
            requested_at: clock.now(),
            started_at: None,
            ended_at: None,
            fare: 0.0,
            distance_km: distance_km(pickup, dropoff),
            stamp_cancellation: true,
            observers: Vec::new(),
            clock,
        }
    }

    pub fn regular(
        rider: Arc<Rider>,
        pickup: Coordinate,
        dropoff: Coordinate,
        vehicle_kind: VehicleKind,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            rider,
            pickup,
            dropoff,
            vehicle_kind,
            RideKind::Regular,
            clock,
        )
    }

    /// Carpools need room for several passengers: kinds other than Sedan/SUV are
    /// downgraded to Sedan.
    pub fn carpool(
        rider: Arc<Rider>,
        pickup: Coordinate,
        dropoff: Coordinate,
        vehicle_kind: VehicleKind,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let vehicle_kind = if vehicle_kind.supports_carpool() {
            vehicle_kind
        } else {
            VehicleKind::Sedan
        };
        Self::new(
            rider,
            pickup,
            dropoff,
            vehicle_kind,
            RideKind::Carpool,
            clock,
        )
    }

    /// Whether `cancel` stamps `ended_at` (on by default).
    pub fn stamp_cancellation(mut self, enabled: bool) -> Self {
        self.stamp_cancellation = enabled;
        self
    }

    pub fn id(&self) -> RideId {
        self.id
    }

    pub fn rider(&self) -> &Arc<Rider> {
        &self.rider
    }

    pub fn driver(&self) -> Option<&Arc<Driver>> {
        self.driver.as_ref()
    }

    pub fn pickup(&self) -> Coordinate {
        self.pickup
    }

    pub fn dropoff(&self) -> Coordinate {
        self.dropoff
    }

    pub fn vehicle_kind(&self) -> VehicleKind {
        self.vehicle_kind
    }

    pub fn kind(&self) -> RideKind {
        self.kind
    }

    pub fn status(&self) -> RideStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn fare(&self) -> f64 {
        self.fare
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn fare_basis(&self) -> FareBasis {
        FareBasis {
            distance_km: self.distance_km,
            vehicle_kind: self.vehicle_kind,
        }
    }

    pub fn register_observer(&mut self, observer: Arc<dyn RideObserver>) {
        self.observers.push(observer);
    }

    /// Remove a previously registered observer (matched by identity).
    pub fn remove_observer(&mut self, observer: &Arc<dyn RideObserver>) -> bool {
        let target = Arc::as_ptr(observer) as *const ();
        let before = self.observers.len();
        self.observers
            .retain(|existing| Arc::as_ptr(existing) as *const () != target);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn assign(&mut self, driver: Arc<Driver>) -> bool {
        if !self.status.permits(RideAction::Assign) {
            return false;
        }
        driver.set_availability(false);
        self.driver = Some(driver);
        self.status = RideStatus::DriverAssigned;
        self.notify();
        true
    }

    pub fn start(&mut self) -> bool {
        if !self.status.permits(RideAction::Start) {
            return false;
        }
        self.status = RideStatus::DriverEnRoute;
        self.notify();
        true
    }

    pub fn pickup_rider(&mut self) -> bool {
        if !self.status.permits(RideAction::Pickup) {
            return false;
        }
        self.status = RideStatus::RideInProgress;
        self.started_at = Some(self.clock.now());
        self.notify();
        true
    }

    /// Finish the ride. The fare is not computed here; set it with [`Ride::set_fare`].
    pub fn complete(&mut self) -> bool {
        if !self.status.permits(RideAction::Complete) {
            return false;
        }
        self.status = RideStatus::Completed;
        self.ended_at = Some(self.clock.now());
        if let Some(driver) = &self.driver {
            driver.set_availability(true);
            driver.record_ride(self.id);
        }
        self.rider.record_ride(self.id);
        self.notify();
        true
    }

    pub fn cancel(&mut self) -> bool {
        if !self.status.permits(RideAction::Cancel) {
            return false;
        }
        self.status = RideStatus::Cancelled;
        if self.stamp_cancellation {
            self.ended_at = Some(self.clock.now());
        }
        if let Some(driver) = &self.driver {
            driver.set_availability(true);
        }
        self.notify();
        true
    }

    /// Fares can only be written while the ride is in progress or completed.
    pub fn set_fare(&mut self, fare: f64) -> bool {
        match self.status {
            RideStatus::RideInProgress | RideStatus::Completed if fare.is_finite() => {
                self.fare = fare;
                true
            }
            _ => false,
        }
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer.on_ride_changed(self);
        }
    }

    pub fn snapshot(&self) -> RideSnapshot {
        RideSnapshot {
            id: self.id,
            rider_id: self.rider.id(),
            driver: self.driver.as_ref().map(|driver| driver.info()),
            pickup: self.pickup,
            dropoff: self.dropoff,
            vehicle_kind: self.vehicle_kind,
            ride_kind: self.kind,
            status: self.status,
            requested_at: self.requested_at,
            started_at: self.started_at,
            ended_at: self.ended_at,
            fare: self.fare,
            distance_km: self.distance_km,
        }
    }
}

impl fmt::Debug for Ride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ride")
            .field("id", &self.id)
            .field("rider", &self.rider.id())
            .field("driver", &self.driver.as_ref().map(|d| d.id()))
            .field("vehicle_kind", &self.vehicle_kind)
            .field("kind", &self.kind)
            .field("status", &self.status)
            .field("fare", &self.fare)
            .field("distance_km", &self.distance_km)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

/// Owned, serializable copy of a ride at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RideSnapshot {
    pub id: RideId,
    pub rider_id: RiderId,
    pub driver: Option<DriverInfo>,
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
    pub vehicle_kind: VehicleKind,
    pub ride_kind: RideKind,
    pub status: RideStatus,
    pub requested_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub fare: f64,
    pub distance_km: f64,
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::agents::{Vehicle, VehicleSpec};
    use crate::clock::ManualClock;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).expect("coordinate")
    }

    fn rider() -> Arc<Rider> {
        let rider = Rider::new("Alice", "123-456-7890", coord(0.0, 0.0)).expect("rider");
        Arc::new(rider)
    }

    fn driver() -> Arc<Driver> {
        let spec = VehicleSpec::new("CAR001", "Toyota Camry", VehicleKind::Sedan, 4);
        let vehicle = Vehicle::new(spec).expect("vehicle");
        let location = coord(0.01, 0.01);
        Arc::new(Driver::new("Dave", "456-789-0123", vehicle, location).expect("driver"))
    }

    fn ride_with_clock() -> (Ride, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let ride = Ride::regular(
            rider(),
            coord(0.0, 0.0),
            coord(0.0, 0.1),
            VehicleKind::Sedan,
            clock.clone(),
        );
        (ride, clock)
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<RideStatus>>,
    }

    impl RideObserver for Recorder {
        fn on_ride_changed(&self, ride: &Ride) {
            self.seen.lock().expect("recorder lock").push(ride.status());
        }
    }

    #[test]
    fn full_lifecycle_in_order() {
        let (mut ride, clock) = ride_with_clock();
        let recorder = Arc::new(Recorder::default());
        ride.register_observer(recorder.clone());
        let driver = driver();

        assert!(ride.assign(driver.clone()));
        assert!(!driver.is_available());
        assert!(ride.start());
        clock.advance_secs(60);
        assert!(ride.pickup_rider());
        assert_eq!(ride.started_at(), Some(clock.now()));
        clock.advance_secs(600);
        assert!(ride.complete());
        assert_eq!(ride.ended_at(), Some(clock.now()));

        assert!(driver.is_available());
        assert_eq!(driver.ride_history(), vec![ride.id()]);
        assert_eq!(ride.rider().ride_history(), vec![ride.id()]);
        assert_eq!(
            *recorder.seen.lock().expect("lock"),
            vec![
                RideStatus::DriverAssigned,
                RideStatus::DriverEnRoute,
                RideStatus::RideInProgress,
                RideStatus::Completed,
            ]
        );
    }

    #[test]
    fn out_of_order_calls_fail_without_mutation() {
        let (mut ride, _clock) = ride_with_clock();
        let recorder = Arc::new(Recorder::default());
        ride.register_observer(recorder.clone());

        assert!(!ride.start());
        assert!(!ride.pickup_rider());
        assert!(!ride.complete());
        assert_eq!(ride.status(), RideStatus::Requested);
        assert!(ride.started_at().is_none());
        assert!(ride.ended_at().is_none());
        assert!(ride.rider().ride_history().is_empty());
        assert!(recorder.seen.lock().expect("lock").is_empty());
    }

    #[test]
    fn assign_is_set_at_most_once() {
        let (mut ride, _clock) = ride_with_clock();
        let first = driver();
        let second = driver();
        assert!(ride.assign(first.clone()));
        assert!(!ride.assign(second.clone()));
        assert_eq!(ride.driver().map(|d| d.id()), Some(first.id()));
        assert!(second.is_available());
    }

    #[test]
    fn cancel_after_assignment_frees_driver_and_stamps_end() {
        let (mut ride, clock) = ride_with_clock();
        let driver = driver();
        ride.assign(driver.clone());
        clock.advance_secs(30);

        assert!(ride.cancel());
        assert_eq!(ride.status(), RideStatus::Cancelled);
        assert!(driver.is_available());
        assert!(driver.ride_history().is_empty());
        assert_eq!(ride.ended_at(), Some(clock.now()));
        assert!(!ride.cancel());
    }

    #[test]
    fn cancel_stamp_can_be_disabled() {
        let (ride, _clock) = ride_with_clock();
        let mut ride = ride.stamp_cancellation(false);
        assert!(ride.cancel());
        assert!(ride.ended_at().is_none());
    }

    #[test]
    fn completed_ride_cannot_be_cancelled() {
        let (mut ride, _clock) = ride_with_clock();
        ride.assign(driver());
        ride.start();
        ride.pickup_rider();
        ride.complete();
        assert!(!ride.cancel());
        assert_eq!(ride.status(), RideStatus::Completed);
    }

    #[test]
    fn distance_is_fixed_at_creation() {
        let (mut ride, _clock) = ride_with_clock();
        let before = ride.distance_km();
        let driver = driver();
        ride.assign(driver.clone());
        driver.update_location(coord(10.0, 10.0));
        ride.rider().update_location(coord(-5.0, 3.0));
        assert_eq!(ride.distance_km(), before);
    }

    #[test]
    fn carpool_downgrades_small_vehicles() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::default());
        let (pickup, dropoff) = (coord(0.0, 0.0), coord(0.0, 0.1));
        let bike = Ride::carpool(rider(), pickup, dropoff, VehicleKind::Bike, clock.clone());
        assert_eq!(bike.vehicle_kind(), VehicleKind::Sedan);
        assert_eq!(bike.kind(), RideKind::Carpool);
        let suv = Ride::carpool(rider(), pickup, dropoff, VehicleKind::Suv, clock);
        assert_eq!(suv.vehicle_kind(), VehicleKind::Suv);
    }

    #[test]
    fn fare_is_only_writable_late_in_the_lifecycle() {
        let (mut ride, _clock) = ride_with_clock();
        assert!(!ride.set_fare(10.0));
        ride.assign(driver());
        ride.start();
        ride.pickup_rider();
        assert!(ride.set_fare(42.0));
        ride.complete();
        assert_eq!(ride.fare(), 42.0);
    }

    #[test]
    fn observers_can_be_removed_by_identity() {
        let (mut ride, _clock) = ride_with_clock();
        let kept: Arc<dyn RideObserver> = Arc::new(Recorder::default());
        let dropped: Arc<dyn RideObserver> = Arc::new(Recorder::default());
        ride.register_observer(kept.clone());
        ride.register_observer(dropped.clone());

        assert!(ride.remove_observer(&dropped));
        assert!(!ride.remove_observer(&dropped));
        assert_eq!(ride.observer_count(), 1);
    }

    #[test]
    fn snapshot_serializes_enum_names_and_iso_timestamps() {
        let (ride, _clock) = ride_with_clock();
        let json = serde_json::to_value(ride.snapshot()).expect("serialize");
        assert_eq!(json["status"], "REQUESTED");
        assert_eq!(json["vehicle_kind"], "SEDAN");
        assert_eq!(json["ride_kind"], "REGULAR");
        assert_eq!(json["requested_at"], "1970-01-01T00:00:00Z");
        assert!(json["driver"].is_null());
        assert_eq!(json["pickup"], serde_json::json!([0.0, 0.0]));
    }
}
