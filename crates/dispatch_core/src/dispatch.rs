//! The dispatch engine: one authoritative owner of rides, the driver pool and the
//! active strategies.
//!
//! Construct one per process and share it (`Arc<DispatchEngine>`); every method
//! takes `&self`. Locks are always taken in the order ride → ride table / pool →
//! telemetry, and no table lock is held while waiting on a ride.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use crate::agents::{Driver, DriverInfo, Rider, VehicleKind};
use crate::clock::{Clock, SystemClock};
use crate::config::DispatchConfig;
use crate::error::{DispatchError, Result};
use crate::ids::{DriverId, RideId};
use crate::matching::{candidates_near, MatchingPolicy, MatchingStrategy, NearbyDriver};
use crate::observers::{standard_observers, RideObserver};
use crate::pricing::{build_pricing, estimate_fare, FareEstimate, PricingModifier, PricingStrategy};
use crate::ride::{Ride, RideAction, RideSnapshot};
use crate::spatial::Coordinate;
use crate::telemetry::DispatchTelemetry;

type RideHandle = Arc<Mutex<Ride>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Result of a ride request. Both variants carry a stored, valid ride.
#[derive(Debug, Clone, PartialEq)]
pub enum RideRequestOutcome {
    /// A driver was matched and removed from the pool.
    Assigned(RideSnapshot),
    /// Nobody eligible; the ride stays `Requested`.
    Unassigned(RideSnapshot),
}

impl RideRequestOutcome {
    pub fn ride(&self) -> &RideSnapshot {
        match self {
            RideRequestOutcome::Assigned(ride) | RideRequestOutcome::Unassigned(ride) => ride,
        }
    }

    pub fn into_ride(self) -> RideSnapshot {
        match self {
            RideRequestOutcome::Assigned(ride) | RideRequestOutcome::Unassigned(ride) => ride,
        }
    }

    pub fn ride_id(&self) -> RideId {
        self.ride().id
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, RideRequestOutcome::Assigned(_))
    }
}

/// Every ride ever created plus the active subset. Creation order is kept for
/// listings.
#[derive(Default)]
struct RideTable {
    rides: HashMap<RideId, RideHandle>,
    order: Vec<RideId>,
    active: HashSet<RideId>,
}

impl RideTable {
    fn insert(&mut self, id: RideId, handle: RideHandle) {
        self.rides.insert(id, handle);
        self.order.push(id);
        self.active.insert(id);
    }

    fn handles<'a>(&'a self, ids: impl Iterator<Item = &'a RideId>) -> Vec<RideHandle> {
        ids.filter_map(|id| self.rides.get(id).cloned()).collect()
    }
}

/// Drivers currently eligible for matching, in registration order, plus the
/// drivers held by an active ride. A busy driver never re-enters `drivers`
/// until its ride releases it.
#[derive(Default)]
struct DriverPool {
    drivers: Vec<Arc<Driver>>,
    busy: HashSet<DriverId>,
}

impl DriverPool {
    fn contains(&self, id: DriverId) -> bool {
        self.drivers.iter().any(|driver| driver.id() == id)
    }

    fn insert(&mut self, driver: Arc<Driver>) -> bool {
        if self.contains(driver.id()) {
            return false;
        }
        self.drivers.push(driver);
        true
    }

    fn remove(&mut self, id: DriverId) -> Option<Arc<Driver>> {
        let index = self.drivers.iter().position(|driver| driver.id() == id)?;
        Some(self.drivers.remove(index))
    }

    /// Take a driver out of the pool and mark it busy in one step.
    fn claim(&mut self, id: DriverId) -> Option<Arc<Driver>> {
        let driver = self.remove(id)?;
        self.busy.insert(id);
        driver.set_availability(false);
        Some(driver)
    }

    /// Clear the busy mark and re-pool the driver if it is available.
    fn release(&mut self, driver: &Arc<Driver>) -> bool {
        self.busy.remove(&driver.id());
        driver.is_available() && self.insert(Arc::clone(driver))
    }
}

pub struct DispatchEngine {
    clock: Arc<dyn Clock>,
    max_pickup_km: f64,
    standard_observers: bool,
    stamp_cancellation: bool,
    rides: RwLock<RideTable>,
    pool: Mutex<DriverPool>,
    matching: RwLock<Arc<dyn MatchingStrategy>>,
    pricing: RwLock<Arc<dyn PricingStrategy>>,
    observers: RwLock<Vec<Arc<dyn RideObserver>>>,
    telemetry: Mutex<DispatchTelemetry>,
}

impl DispatchEngine {
    pub fn new(config: DispatchConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: DispatchConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let pricing = config.pricing_strategy()?;
        let matching = config.matching_strategy();
        debug!(
            matching = matching.name(),
            pricing = %pricing.describe(),
            max_pickup_km = config.max_pickup_km,
            "dispatch engine configured"
        );
        let telemetry = DispatchTelemetry::with_record_limit(config.completed_ride_limit);
        Ok(Self {
            clock,
            max_pickup_km: config.max_pickup_km,
            standard_observers: config.standard_observers,
            stamp_cancellation: config.stamp_cancellation,
            rides: RwLock::new(RideTable::default()),
            pool: Mutex::new(DriverPool::default()),
            matching: RwLock::new(matching),
            pricing: RwLock::new(pricing),
            observers: RwLock::new(Vec::new()),
            telemetry: Mutex::new(telemetry),
        })
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    // ── Driver pool ────────────────────────────────────────────────

    /// Add a driver to the pool. Returns `false` (and does nothing) if the driver
    /// is already pooled, on an active ride, or currently unavailable.
    pub fn register_driver(&self, driver: Arc<Driver>) -> bool {
        let mut pool = lock(&self.pool);
        let driver_id = driver.id();
        if pool.busy.contains(&driver_id) {
            debug!(driver_id = %driver_id, "driver on an active ride not pooled");
            return false;
        }
        if !driver.is_available() {
            debug!(driver_id = %driver_id, "unavailable driver not pooled");
            return false;
        }
        let added = pool.insert(driver);
        if added {
            let pool_size = pool.drivers.len();
            debug!(driver_id = %driver_id, pool_size, "driver pooled");
        }
        added
    }

    /// Remove a driver from the pool. Absent drivers are a no-op.
    pub fn unregister_driver(&self, driver_id: DriverId) -> bool {
        let removed = lock(&self.pool).remove(driver_id).is_some();
        if removed {
            debug!(driver_id = %driver_id, "driver left the pool");
        }
        removed
    }

    pub fn available_drivers(&self) -> Vec<Arc<Driver>> {
        lock(&self.pool).drivers.clone()
    }

    pub fn is_pooled(&self, driver_id: DriverId) -> bool {
        lock(&self.pool).contains(driver_id)
    }

    /// Take a driver online or offline. Going online joins the pool, going
    /// offline leaves it. Refused with [`DispatchError::DriverBusy`] while the
    /// driver is on an active ride.
    pub fn set_driver_availability(
        &self,
        driver: &Arc<Driver>,
        available: bool,
    ) -> Result<DriverInfo> {
        let mut pool = lock(&self.pool);
        let driver_id = driver.id();
        if pool.busy.contains(&driver_id) {
            warn!(driver_id = %driver_id, available, "driver is on an active ride");
            return Err(DispatchError::DriverBusy(driver_id));
        }
        driver.set_availability(available);
        if available {
            pool.insert(Arc::clone(driver));
        } else {
            pool.remove(driver_id);
        }
        info!(driver_id = %driver_id, available, "driver availability changed");
        Ok(driver.info())
    }

    /// Pooled drivers within `max_km` of `location`, nearest first. Ties keep
    /// pool order. `kind` narrows the search to one vehicle kind.
    pub fn drivers_near(
        &self,
        location: Coordinate,
        max_km: f64,
        kind: Option<VehicleKind>,
    ) -> Result<Vec<NearbyDriver>> {
        if !max_km.is_finite() || max_km <= 0.0 {
            let message = format!("search radius must be positive, got {max_km}");
            return Err(DispatchError::Config(message));
        }
        let mut nearby: Vec<NearbyDriver> = {
            let pool = lock(&self.pool);
            candidates_near(location, kind, &pool.drivers, max_km)
                .map(NearbyDriver::from)
                .collect()
        };
        nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        Ok(nearby)
    }

    // ── Strategies ─────────────────────────────────────────────────

    pub fn matching_strategy(&self) -> Arc<dyn MatchingStrategy> {
        Arc::clone(&read(&self.matching))
    }

    pub fn pricing_strategy(&self) -> Arc<dyn PricingStrategy> {
        Arc::clone(&read(&self.pricing))
    }

    /// Swap the matching strategy. Only later requests are affected.
    pub fn set_matching_strategy(&self, strategy: Arc<dyn MatchingStrategy>) {
        info!(matching = strategy.name(), "matching strategy changed");
        *write(&self.matching) = strategy;
    }

    pub fn set_matching_policy(&self, policy: MatchingPolicy) {
        self.set_matching_strategy(policy.build(self.max_pickup_km));
    }

    /// Swap the pricing strategy. Only later completions are affected.
    pub fn set_pricing_strategy(&self, strategy: Arc<dyn PricingStrategy>) {
        info!(pricing = %strategy.describe(), "pricing strategy changed");
        *write(&self.pricing) = strategy;
    }

    pub fn set_pricing_modifiers(&self, modifiers: &[PricingModifier]) -> Result<()> {
        let strategy = build_pricing(modifiers)?;
        self.set_pricing_strategy(strategy);
        Ok(())
    }

    // ── Observers ──────────────────────────────────────────────────

    /// Attach an observer to every ride requested from now on.
    pub fn add_observer(&self, observer: Arc<dyn RideObserver>) {
        write(&self.observers).push(observer);
    }

    /// Attach an observer to one active ride.
    pub fn register_ride_observer(
        &self,
        ride_id: RideId,
        observer: Arc<dyn RideObserver>,
    ) -> Result<()> {
        let handle = self.active_handle(ride_id)?;
        let mut ride = lock(&handle);
        if !ride.is_active() {
            return Err(DispatchError::RideNotActive(ride_id));
        }
        ride.register_observer(observer);
        Ok(())
    }

    // ── Requests ───────────────────────────────────────────────────

    pub fn request_ride(
        &self,
        rider: Arc<Rider>,
        pickup: Coordinate,
        dropoff: Coordinate,
        vehicle_kind: VehicleKind,
    ) -> RideRequestOutcome {
        let clock = Arc::clone(&self.clock);
        let ride = Ride::regular(rider, pickup, dropoff, vehicle_kind, clock);
        self.dispatch(ride)
    }

    /// Like [`DispatchEngine::request_ride`], but kinds that cannot carpool are
    /// downgraded to Sedan before the ride is built.
    pub fn request_carpool(
        &self,
        rider: Arc<Rider>,
        pickup: Coordinate,
        dropoff: Coordinate,
        vehicle_kind: VehicleKind,
    ) -> RideRequestOutcome {
        let clock = Arc::clone(&self.clock);
        let ride = Ride::carpool(rider, pickup, dropoff, vehicle_kind, clock);
        self.dispatch(ride)
    }

    fn dispatch(&self, ride: Ride) -> RideRequestOutcome {
        let mut ride = ride.stamp_cancellation(self.stamp_cancellation);
        if self.standard_observers {
            for observer in standard_observers() {
                ride.register_observer(observer);
            }
        }
        for observer in read(&self.observers).iter() {
            ride.register_observer(Arc::clone(observer));
        }

        let ride_id = ride.id();
        let matching = self.matching_strategy();
        let handle: RideHandle = Arc::new(Mutex::new(ride));
        let mut ride = lock(&handle);
        write(&self.rides).insert(ride_id, Arc::clone(&handle));
        info!(
            ride_id = %ride_id,
            rider_id = %ride.rider().id(),
            vehicle_kind = %ride.vehicle_kind(),
            distance_km = ride.distance_km(),
            "ride requested"
        );

        // Selection, removal and the busy mark happen under one pool lock, so
        // neither another request nor a re-registration can see the driver as
        // free once it is chosen.
        let claimed = {
            let mut pool = lock(&self.pool);
            matching
                .find_driver(&ride, &pool.drivers)
                .and_then(|driver| pool.claim(driver.id()))
        };

        let matching = matching.name();
        let assigned = match claimed {
            Some(driver) => {
                let driver_id = driver.id();
                if ride.assign(Arc::clone(&driver)) {
                    info!(ride_id = %ride_id, driver_id = %driver_id, matching, "driver assigned");
                    true
                } else {
                    let mut pool = lock(&self.pool);
                    driver.set_availability(true);
                    pool.release(&driver);
                    false
                }
            }
            None => {
                info!(ride_id = %ride_id, matching, "no driver available");
                false
            }
        };

        lock(&self.telemetry).record_request(assigned);
        let snapshot = ride.snapshot();
        if assigned {
            RideRequestOutcome::Assigned(snapshot)
        } else {
            RideRequestOutcome::Unassigned(snapshot)
        }
    }

    // ── Lifecycle ──────────────────────────────────────────────────

    pub fn start_ride(&self, ride_id: RideId) -> Result<RideSnapshot> {
        self.advance(ride_id, RideAction::Start, Ride::start)
    }

    pub fn pickup_rider(&self, ride_id: RideId) -> Result<RideSnapshot> {
        self.advance(ride_id, RideAction::Pickup, Ride::pickup_rider)
    }

    /// Price the ride with the active pricing strategy, complete it, and return
    /// the driver to the pool.
    pub fn complete_ride(&self, ride_id: RideId) -> Result<RideSnapshot> {
        let handle = self.active_handle(ride_id)?;
        let mut ride = lock(&handle);
        Self::check_permitted(&ride, RideAction::Complete)?;

        let pricing = self.pricing_strategy();
        let fare = pricing.calculate_fare(&ride);
        ride.set_fare(fare);
        ride.complete();
        self.release_driver(&ride);
        self.deactivate(ride_id);
        lock(&self.telemetry).record_completion(&ride);
        let pricing = pricing.describe();
        info!(ride_id = %ride_id, fare, pricing = %pricing, "ride completed");
        Ok(ride.snapshot())
    }

    /// Cancel the ride and return its driver, if any, to the pool.
    pub fn cancel_ride(&self, ride_id: RideId) -> Result<RideSnapshot> {
        let handle = self.active_handle(ride_id)?;
        let mut ride = lock(&handle);
        Self::check_permitted(&ride, RideAction::Cancel)?;

        ride.cancel();
        self.release_driver(&ride);
        self.deactivate(ride_id);
        lock(&self.telemetry).record_cancellation();
        info!(ride_id = %ride_id, "ride cancelled");
        Ok(ride.snapshot())
    }

    fn advance(
        &self,
        ride_id: RideId,
        action: RideAction,
        transition: fn(&mut Ride) -> bool,
    ) -> Result<RideSnapshot> {
        let handle = self.active_handle(ride_id)?;
        let mut ride = lock(&handle);
        Self::check_permitted(&ride, action)?;
        transition(&mut *ride);
        debug!(ride_id = %ride_id, status = %ride.status(), "ride advanced");
        Ok(ride.snapshot())
    }

    fn check_permitted(ride: &Ride, action: RideAction) -> Result<()> {
        if !ride.is_active() {
            return Err(DispatchError::RideNotActive(ride.id()));
        }
        if !ride.status().permits(action) {
            let status = ride.status();
            warn!(ride_id = %ride.id(), %status, %action, "transition refused");
            return Err(DispatchError::InvalidTransition {
                ride_id: ride.id(),
                from: ride.status(),
                action,
            });
        }
        Ok(())
    }

    fn release_driver(&self, ride: &Ride) {
        if let Some(driver) = ride.driver() {
            if lock(&self.pool).release(driver) {
                let driver_id = driver.id();
                debug!(ride_id = %ride.id(), driver_id = %driver_id, "driver returned to pool");
            }
        }
    }

    fn deactivate(&self, ride_id: RideId) {
        write(&self.rides).active.remove(&ride_id);
    }

    fn active_handle(&self, ride_id: RideId) -> Result<RideHandle> {
        let rides = read(&self.rides);
        let handle = rides
            .rides
            .get(&ride_id)
            .ok_or(DispatchError::UnknownRide(ride_id))?;
        if !rides.active.contains(&ride_id) {
            warn!(ride_id = %ride_id, "operation on inactive ride");
            return Err(DispatchError::RideNotActive(ride_id));
        }
        Ok(Arc::clone(handle))
    }

    // ── Queries ────────────────────────────────────────────────────

    pub fn get_ride(&self, ride_id: RideId) -> Result<RideSnapshot> {
        let handle = read(&self.rides)
            .rides
            .get(&ride_id)
            .cloned()
            .ok_or(DispatchError::UnknownRide(ride_id))?;
        let ride = lock(&handle);
        Ok(ride.snapshot())
    }

    /// Active rides in creation order.
    pub fn active_rides(&self) -> Vec<RideSnapshot> {
        let handles = {
            let rides = read(&self.rides);
            rides.handles(rides.order.iter().filter(|id| rides.active.contains(id)))
        };
        Self::snapshots(handles)
    }

    /// Every ride ever requested, in creation order.
    pub fn all_rides(&self) -> Vec<RideSnapshot> {
        let handles = {
            let rides = read(&self.rides);
            rides.handles(rides.order.iter())
        };
        Self::snapshots(handles)
    }

    fn snapshots(handles: Vec<RideHandle>) -> Vec<RideSnapshot> {
        handles
            .iter()
            .map(|handle| lock(handle).snapshot())
            .collect()
    }

    /// Quote a trip with the active pricing strategy without creating a ride.
    pub fn estimate_fare(
        &self,
        pickup: Coordinate,
        dropoff: Coordinate,
        vehicle_kind: VehicleKind,
    ) -> FareEstimate {
        let pricing = self.pricing_strategy();
        estimate_fare(pricing.as_ref(), pickup, dropoff, vehicle_kind)
    }

    pub fn telemetry(&self) -> DispatchTelemetry {
        lock(&self.telemetry).clone()
    }
}

impl std::fmt::Debug for DispatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rides = read(&self.rides);
        f.debug_struct("DispatchEngine")
            .field("rides", &rides.order.len())
            .field("active", &rides.active.len())
            .field("pool", &lock(&self.pool).drivers.len())
            .field("matching", &self.matching_strategy().name())
            .field("pricing", &self.pricing_strategy().describe())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ride::RideStatus;
    use crate::spatial::destination_point;
    use crate::test_helpers::{test_driver, test_origin, test_rider};

    fn engine() -> DispatchEngine {
        DispatchEngine::new(DispatchConfig::default().with_standard_observers(false))
            .expect("engine")
    }

    #[test]
    fn pool_add_and_remove_are_idempotent() {
        let engine = engine();
        let driver = test_driver(VehicleKind::Sedan, test_origin());
        assert!(engine.register_driver(driver.clone()));
        assert!(!engine.register_driver(driver.clone()));
        assert_eq!(engine.available_drivers().len(), 1);

        assert!(engine.unregister_driver(driver.id()));
        assert!(!engine.unregister_driver(driver.id()));
        assert!(engine.available_drivers().is_empty());
    }

    #[test]
    fn unknown_and_finished_rides_are_told_apart() {
        let engine = engine();
        let driver = test_driver(VehicleKind::Sedan, test_origin());
        engine.register_driver(driver);
        let outcome = engine.request_ride(
            test_rider(),
            test_origin(),
            destination_point(test_origin(), 0.0, 3.0),
            VehicleKind::Sedan,
        );
        let ride_id = outcome.ride_id();
        engine.cancel_ride(ride_id).expect("cancel");

        let not_active = DispatchError::RideNotActive(ride_id);
        assert_eq!(engine.start_ride(ride_id), Err(not_active));
        let unknown = RideId::new();
        let not_found = DispatchError::UnknownRide(unknown);
        assert_eq!(engine.start_ride(unknown), Err(not_found));
        let status = engine.get_ride(ride_id).map(|ride| ride.status);
        assert_eq!(status, Ok(RideStatus::Cancelled));
    }

    #[test]
    fn assigned_driver_cannot_be_pooled_again_until_released() {
        let engine = engine();
        let driver = test_driver(VehicleKind::Sedan, test_origin());
        engine.register_driver(driver.clone());
        let outcome = engine.request_ride(
            test_rider(),
            test_origin(),
            destination_point(test_origin(), 0.0, 3.0),
            VehicleKind::Sedan,
        );
        assert!(outcome.is_assigned());
        assert!(!driver.is_available());
        assert!(!engine.register_driver(driver.clone()));
        assert!(!engine.is_pooled(driver.id()));

        engine.cancel_ride(outcome.ride_id()).expect("cancel");
        assert!(engine.is_pooled(driver.id()));
        assert!(!engine.register_driver(driver));
    }

    #[test]
    fn availability_toggle_moves_driver_in_and_out_of_pool() {
        let engine = engine();
        let driver = test_driver(VehicleKind::Sedan, test_origin());

        let info = engine
            .set_driver_availability(&driver, true)
            .expect("online");
        assert!(info.available);
        assert!(engine.is_pooled(driver.id()));

        let info = engine
            .set_driver_availability(&driver, false)
            .expect("offline");
        assert!(!info.available);
        assert!(!engine.is_pooled(driver.id()));
        assert!(!engine.register_driver(driver.clone()));

        let outcome = engine.request_ride(
            test_rider(),
            test_origin(),
            destination_point(test_origin(), 0.0, 3.0),
            VehicleKind::Sedan,
        );
        assert!(!outcome.is_assigned());
    }

    #[test]
    fn availability_toggle_is_refused_during_a_ride() {
        let engine = engine();
        let driver = test_driver(VehicleKind::Sedan, test_origin());
        engine.register_driver(driver.clone());
        let outcome = engine.request_ride(
            test_rider(),
            test_origin(),
            destination_point(test_origin(), 0.0, 3.0),
            VehicleKind::Sedan,
        );
        let busy = DispatchError::DriverBusy(driver.id());
        assert_eq!(engine.set_driver_availability(&driver, true), Err(busy));
        let busy = DispatchError::DriverBusy(driver.id());
        assert_eq!(engine.set_driver_availability(&driver, false), Err(busy));
        assert!(!driver.is_available());

        engine.cancel_ride(outcome.ride_id()).expect("cancel");
        assert!(engine.set_driver_availability(&driver, false).is_ok());
        assert!(!engine.is_pooled(driver.id()));
    }

    #[test]
    fn drivers_near_sorts_by_distance_and_filters_kind() {
        let engine = engine();
        let origin = test_origin();
        let far = test_driver(VehicleKind::Sedan, destination_point(origin, 0.0, 3.0));
        let bike = test_driver(VehicleKind::Bike, destination_point(origin, 90.0, 2.0));
        let near = test_driver(VehicleKind::Sedan, destination_point(origin, 180.0, 1.0));
        let outside = test_driver(VehicleKind::Sedan, destination_point(origin, 0.0, 8.0));
        for driver in [&far, &bike, &near, &outside] {
            engine.register_driver(Arc::clone(driver));
        }

        let found = engine.drivers_near(origin, 5.0, None).expect("search");
        let ids: Vec<_> = found.iter().map(|nearby| nearby.driver.id).collect();
        assert_eq!(ids, vec![near.id(), bike.id(), far.id()]);
        assert!((found[0].distance_km - 1.0).abs() < 1e-6);

        let sedans = engine
            .drivers_near(origin, 5.0, Some(VehicleKind::Sedan))
            .expect("search");
        let ids: Vec<_> = sedans.iter().map(|nearby| nearby.driver.id).collect();
        assert_eq!(ids, vec![near.id(), far.id()]);
    }

    #[test]
    fn drivers_near_rejects_bad_radius() {
        let engine = engine();
        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = engine
                .drivers_near(test_origin(), radius, None)
                .expect_err("radius");
            assert!(err.is_configuration());
        }
    }

    #[test]
    fn refused_transition_reports_current_status() {
        let engine = engine();
        let outcome = engine.request_ride(
            test_rider(),
            test_origin(),
            destination_point(test_origin(), 0.0, 3.0),
            VehicleKind::Suv,
        );
        assert!(!outcome.is_assigned());
        let ride_id = outcome.ride_id();
        assert_eq!(
            engine.pickup_rider(ride_id),
            Err(DispatchError::InvalidTransition {
                ride_id,
                from: RideStatus::Requested,
                action: RideAction::Pickup,
            })
        );
    }
}
