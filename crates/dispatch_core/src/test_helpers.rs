//! Test helpers for common test setup and utilities.
//!
//! Shared by unit tests and, through the `test-helpers` feature, by the
//! integration tests and benches.

use std::sync::{Arc, Mutex, PoisonError};

use crate::agents::{Driver, Rider, Vehicle, VehicleKind, VehicleSpec};
use crate::clock::ManualClock;
use crate::ride::{Ride, RideStatus};
use crate::spatial::{destination_point, Coordinate};

/// Standard origin used across tests (Berlin, Alexanderplatz).
pub const TEST_ORIGIN: (f64, f64) = (52.5219, 13.4132);

/// Trip length used by [`ride_from`]: 3 km due north of the pickup.
pub const TEST_TRIP_KM: f64 = 3.0;

/// Build a coordinate from degrees.
///
/// # Panics
///
/// Panics if the degrees are out of range.
pub fn coord(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).expect("test coordinate should be in range")
}

pub fn test_origin() -> Coordinate {
    coord(TEST_ORIGIN.0, TEST_ORIGIN.1)
}

fn test_vehicle(kind: VehicleKind) -> Vehicle {
    let capacity = if kind == VehicleKind::Bike { 1 } else { 4 };
    let spec = VehicleSpec::new(format!("TEST-{kind}"), "Test Model", kind, capacity);
    Vehicle::new(spec).expect("test vehicle should be valid")
}

/// An available driver of `kind` at `location`, with the default rating.
pub fn test_driver(kind: VehicleKind, location: Coordinate) -> Arc<Driver> {
    let vehicle = test_vehicle(kind);
    let driver = Driver::new("Test Driver", "000-000-0000", vehicle, location)
        .expect("test driver should be valid");
    Arc::new(driver)
}

/// Like [`test_driver`], with the rating set to `rating`.
pub fn rated_driver(kind: VehicleKind, location: Coordinate, rating: f64) -> Arc<Driver> {
    let driver = test_driver(kind, location);
    driver
        .update_rating(rating)
        .expect("test rating should be in range");
    driver
}

pub fn test_rider() -> Arc<Rider> {
    let rider = Rider::new("Test Rider", "111-111-1111", test_origin())
        .expect("test rider should be valid");
    Arc::new(rider)
}

/// A regular ride requested at `pickup`, heading [`TEST_TRIP_KM`] north, on a
/// manual clock parked at the epoch.
pub fn ride_from(pickup: Coordinate, kind: VehicleKind) -> Ride {
    Ride::regular(
        test_rider(),
        pickup,
        destination_point(pickup, 0.0, TEST_TRIP_KM),
        kind,
        Arc::new(ManualClock::default()),
    )
}

/// Observer that remembers every status it was notified with.
#[derive(Debug, Default)]
pub struct StatusRecorder {
    seen: Mutex<Vec<RideStatus>>,
}

impl StatusRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn statuses(&self) -> Vec<RideStatus> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl crate::observers::RideObserver for StatusRecorder {
    fn on_ride_changed(&self, ride: &Ride) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ride.status());
    }
}
