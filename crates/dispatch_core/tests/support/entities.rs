#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use dispatch_core::agents::{Driver, Rider, VehicleKind};
use dispatch_core::ids::{DriverId, RideId};
use dispatch_core::observers::RideObserver;
use dispatch_core::ride::{Ride, RideStatus};
use dispatch_core::spatial::{destination_point, Coordinate};
use dispatch_core::test_helpers::{rated_driver, test_driver, test_origin, test_rider};
use dispatch_core::{DispatchEngine, RideRequestOutcome};

/// Seeded pickup so every test shares the same geography.
pub fn seeded_pickup() -> Coordinate {
    test_origin()
}

/// Dropoff `km` due north of the seeded pickup.
pub fn seeded_dropoff(km: f64) -> Coordinate {
    destination_point(seeded_pickup(), 0.0, km)
}

/// A driver `km` from the seeded pickup along `bearing_deg`.
pub fn driver_at(kind: VehicleKind, bearing_deg: f64, km: f64) -> Arc<Driver> {
    test_driver(kind, destination_point(seeded_pickup(), bearing_deg, km))
}

/// Like [`driver_at`] with an explicit rating.
pub fn rated_driver_at(kind: VehicleKind, km: f64, rating: f64) -> Arc<Driver> {
    rated_driver(kind, destination_point(seeded_pickup(), 90.0, km), rating)
}

pub fn rider() -> Arc<Rider> {
    test_rider()
}

/// A regular request from a fresh rider at the seeded pickup, `km` long.
pub fn request(engine: &DispatchEngine, kind: VehicleKind, km: f64) -> RideRequestOutcome {
    engine.request_ride(rider(), seeded_pickup(), seeded_dropoff(km), kind)
}

/// Driver id on the requested ride, if one was assigned.
pub fn assigned_driver(outcome: &RideRequestOutcome) -> Option<DriverId> {
    outcome.ride().driver.as_ref().map(|driver| driver.id)
}

/// One notification as seen by an observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RideEvent {
    pub ride_id: RideId,
    pub status: RideStatus,
    pub fare: f64,
}

/// Observer that records every notification, optionally tagging which observer
/// saw it so tests can check delivery order across observers.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<RideEvent>>,
}

impl EventLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<RideEvent> {
        self.events.lock().expect("event log").clone()
    }

    pub fn statuses(&self) -> Vec<RideStatus> {
        self.events()
            .into_iter()
            .map(|event| event.status)
            .collect()
    }
}

impl RideObserver for EventLog {
    fn on_ride_changed(&self, ride: &Ride) {
        let event = RideEvent {
            ride_id: ride.id(),
            status: ride.status(),
            fare: ride.fare(),
        };
        self.events.lock().expect("event log").push(event);
    }
}

/// Shared ordered log for several named observers.
#[derive(Debug, Default, Clone)]
pub struct OrderLog {
    entries: Arc<Mutex<Vec<(&'static str, RideStatus)>>>,
}

impl OrderLog {
    pub fn observer(&self, name: &'static str) -> Arc<dyn RideObserver> {
        let entries = Arc::clone(&self.entries);
        Arc::new(move |ride: &Ride| {
            entries
                .lock()
                .expect("order log")
                .push((name, ride.status()));
        })
    }

    pub fn entries(&self) -> Vec<(&'static str, RideStatus)> {
        self.entries.lock().expect("order log").clone()
    }
}
