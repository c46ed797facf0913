mod support;

use std::sync::Arc;

use dispatch_core::agents::{Driver, VehicleKind};
use dispatch_core::matching::{MatchingPolicy, MatchingStrategy};
use dispatch_core::ride::Ride;
use dispatch_core::DispatchError;
use support::engine::TestEngineBuilder;
use support::entities::{
    assigned_driver, driver_at, rated_driver_at, request, rider, seeded_dropoff, seeded_pickup,
};

#[test]
fn nearest_picks_two_km_driver_over_eight_km_driver() {
    let (engine, _clock) = TestEngineBuilder::new().build();
    let far = driver_at(VehicleKind::Sedan, 90.0, 8.0);
    let near = driver_at(VehicleKind::Sedan, 270.0, 2.0);
    engine.register_driver(far.clone());
    engine.register_driver(near.clone());

    let outcome = request(&engine, VehicleKind::Sedan, 5.0);
    assert!(outcome.is_assigned());
    assert_eq!(assigned_driver(&outcome), Some(near.id()));
    assert!(engine.is_pooled(far.id()));
    assert!(!engine.is_pooled(near.id()));
}

#[test]
fn highest_rated_ignores_distance_within_range() {
    let (engine, _clock) = TestEngineBuilder::new()
        .with_matching(MatchingPolicy::HighestRated)
        .build();
    let close = rated_driver_at(VehicleKind::Sedan, 1.0, 3.9);
    let star = rated_driver_at(VehicleKind::Sedan, 9.0, 4.9);
    engine.register_driver(close.clone());
    engine.register_driver(star.clone());

    let outcome = request(&engine, VehicleKind::Sedan, 5.0);
    assert_eq!(assigned_driver(&outcome), Some(star.id()));
}

#[test]
fn drivers_beyond_range_or_of_other_kinds_are_not_matched() {
    let (engine, _clock) = TestEngineBuilder::new().build();
    engine.register_driver(driver_at(VehicleKind::Sedan, 0.0, 10.5));
    engine.register_driver(driver_at(VehicleKind::Suv, 0.0, 0.2));
    engine.register_driver(driver_at(VehicleKind::AutoRickshaw, 0.0, 0.2));

    let outcome = request(&engine, VehicleKind::Sedan, 5.0);
    assert!(!outcome.is_assigned());
    assert_eq!(engine.available_drivers().len(), 3);
    assert_eq!(engine.telemetry().counts.rides_unassigned, 1);
}

#[test]
fn unregistered_driver_is_not_matched() {
    let (engine, _clock) = TestEngineBuilder::new().build();
    let driver = driver_at(VehicleKind::Bike, 0.0, 1.0);
    engine.register_driver(driver.clone());
    engine.unregister_driver(driver.id());

    let outcome = request(&engine, VehicleKind::Bike, 2.0);
    assert!(!outcome.is_assigned());
    assert!(driver.is_available());
}

#[test]
fn offline_driver_is_skipped_until_back_online() {
    let (engine, _clock) = TestEngineBuilder::new().build();
    let driver = driver_at(VehicleKind::Sedan, 0.0, 1.0);
    engine.register_driver(driver.clone());

    let info = engine
        .set_driver_availability(&driver, false)
        .expect("offline");
    assert!(!info.available);
    let outcome = request(&engine, VehicleKind::Sedan, 2.0);
    assert!(!outcome.is_assigned());

    engine
        .set_driver_availability(&driver, true)
        .expect("online");
    let outcome = request(&engine, VehicleKind::Sedan, 2.0);
    assert_eq!(assigned_driver(&outcome), Some(driver.id()));

    let err = engine
        .set_driver_availability(&driver, false)
        .expect_err("on a ride");
    assert_eq!(err, DispatchError::DriverBusy(driver.id()));
    assert!(!engine.is_pooled(driver.id()));
}

#[test]
fn drivers_near_lists_only_the_free_pool() {
    let (engine, _clock) = TestEngineBuilder::new().build();
    let close = driver_at(VehicleKind::Sedan, 90.0, 1.0);
    let middle = driver_at(VehicleKind::Suv, 180.0, 2.5);
    let edge = driver_at(VehicleKind::Sedan, 270.0, 4.0);
    let outside = driver_at(VehicleKind::Sedan, 0.0, 12.0);
    for driver in [&edge, &outside, &middle, &close] {
        engine.register_driver(Arc::clone(driver));
    }

    let nearby = engine
        .drivers_near(seeded_pickup(), 5.0, None)
        .expect("search");
    let ids: Vec<_> = nearby.iter().map(|found| found.driver.id).collect();
    assert_eq!(ids, vec![close.id(), middle.id(), edge.id()]);

    // The closest sedan is taken by the request and drops out of the search.
    let outcome = request(&engine, VehicleKind::Sedan, 3.0);
    assert_eq!(assigned_driver(&outcome), Some(close.id()));
    let sedans = engine
        .drivers_near(seeded_pickup(), 5.0, Some(VehicleKind::Sedan))
        .expect("search");
    let ids: Vec<_> = sedans.iter().map(|found| found.driver.id).collect();
    assert_eq!(ids, vec![edge.id()]);
    assert!((sedans[0].distance_km - 4.0).abs() < 1e-6);
}

#[test]
fn swapping_strategy_only_affects_later_requests() {
    let (engine, _clock) = TestEngineBuilder::new().build();
    let near_low = rated_driver_at(VehicleKind::Sedan, 1.0, 3.0);
    let mid_high = rated_driver_at(VehicleKind::Sedan, 5.0, 5.0);
    let far_mid = rated_driver_at(VehicleKind::Sedan, 7.0, 4.0);
    for driver in [&near_low, &mid_high, &far_mid] {
        engine.register_driver(Arc::clone(driver));
    }

    let first = request(&engine, VehicleKind::Sedan, 3.0);
    assert_eq!(assigned_driver(&first), Some(near_low.id()));

    engine.set_matching_policy(MatchingPolicy::HighestRated);
    assert_eq!(engine.matching_strategy().name(), "highest_rated");

    let second = request(&engine, VehicleKind::Sedan, 3.0);
    assert_eq!(assigned_driver(&second), Some(mid_high.id()));
    // The first ride keeps its driver.
    let first_now = engine.get_ride(first.ride_id()).expect("ride");
    assert_eq!(first_now.driver.map(|d| d.id), Some(near_low.id()));
}

/// A strategy that always picks the last eligible-kind driver in pool order.
#[derive(Debug)]
struct LastOfKind;

impl MatchingStrategy for LastOfKind {
    fn find_driver(&self, ride: &Ride, candidates: &[Arc<Driver>]) -> Option<Arc<Driver>> {
        let kind = ride.vehicle_kind();
        candidates
            .iter()
            .rev()
            .find(|driver| driver.is_available() && driver.vehicle().kind() == kind)
            .cloned()
    }

    fn name(&self) -> &'static str {
        "last_of_kind"
    }
}

#[test]
fn custom_strategy_can_be_installed() {
    let (engine, _clock) = TestEngineBuilder::new().build();
    let first = driver_at(VehicleKind::Suv, 0.0, 1.0);
    let last = driver_at(VehicleKind::Suv, 0.0, 30.0);
    engine.register_driver(first.clone());
    engine.register_driver(last.clone());
    engine.set_matching_strategy(Arc::new(LastOfKind));

    let outcome = request(&engine, VehicleKind::Suv, 3.0);
    assert_eq!(assigned_driver(&outcome), Some(last.id()));
}

#[test]
fn completed_driver_becomes_matchable_again() {
    let (engine, _clock) = TestEngineBuilder::new().build();
    let driver = driver_at(VehicleKind::AutoRickshaw, 0.0, 1.0);
    engine.register_driver(driver.clone());

    let ride_id = request(&engine, VehicleKind::AutoRickshaw, 3.0).ride_id();
    let waiting = engine.request_ride(
        rider(),
        seeded_pickup(),
        seeded_dropoff(3.0),
        VehicleKind::AutoRickshaw,
    );
    assert!(!waiting.is_assigned());

    engine.start_ride(ride_id).expect("start");
    engine.pickup_rider(ride_id).expect("pickup");
    engine.complete_ride(ride_id).expect("complete");

    let next = request(&engine, VehicleKind::AutoRickshaw, 3.0);
    assert_eq!(assigned_driver(&next), Some(driver.id()));
}
