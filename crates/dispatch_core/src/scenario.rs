//! Scenario setup: register a seeded random fleet and replay ride requests.
//!
//! Uses a geographic bounding box to sample random positions for riders and
//! drivers. Everything is driven by one `StdRng`, so a seed reproduces the same
//! fleet, the same requests and therefore the same matches.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::agents::{Driver, Rider, VehicleKind, VehicleSpec};
use crate::dispatch::DispatchEngine;
use crate::error::{DispatchError, Result};
use crate::registry::UserRegistry;
use crate::spatial::Coordinate;
use crate::telemetry::DispatchTelemetry;

/// Default bounding box: San Francisco Bay Area (approx).
const DEFAULT_LAT_MIN: f64 = 37.6;
const DEFAULT_LAT_MAX: f64 = 37.85;
const DEFAULT_LNG_MIN: f64 = -122.55;
const DEFAULT_LNG_MAX: f64 = -122.35;

/// Parameters for building a fleet and its ride requests.
#[derive(Debug, Clone)]
pub struct FleetParams {
    pub num_drivers: usize,
    pub num_riders: usize,
    pub seed: u64,
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
    /// Share of requests that are carpools (0.0–1.0).
    pub carpool_share: f64,
    /// Probability (0.0–1.0) that an assigned ride is cancelled before pickup.
    pub cancel_probability: f64,
}

impl Default for FleetParams {
    fn default() -> Self {
        Self {
            num_drivers: 100,
            num_riders: 500,
            seed: 0,
            lat_min: DEFAULT_LAT_MIN,
            lat_max: DEFAULT_LAT_MAX,
            lng_min: DEFAULT_LNG_MIN,
            lng_max: DEFAULT_LNG_MAX,
            carpool_share: 0.1,
            cancel_probability: 0.05,
        }
    }
}

impl FleetParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_counts(mut self, num_drivers: usize, num_riders: usize) -> Self {
        self.num_drivers = num_drivers;
        self.num_riders = num_riders;
        self
    }

    pub fn with_bounds(
        mut self,
        lat_min: f64,
        lat_max: f64,
        lng_min: f64,
        lng_max: f64,
    ) -> Self {
        self.lat_min = lat_min;
        self.lat_max = lat_max;
        self.lng_min = lng_min;
        self.lng_max = lng_max;
        self
    }

    pub fn with_carpool_share(mut self, share: f64) -> Self {
        self.carpool_share = share.clamp(0.0, 1.0);
        self
    }

    pub fn with_cancel_probability(mut self, probability: f64) -> Self {
        self.cancel_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Bounds must be finite, ordered and on the globe. Shares and
    /// probabilities must lie in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        check_bounds("latitude", self.lat_min, self.lat_max, 90.0)?;
        check_bounds("longitude", self.lng_min, self.lng_max, 180.0)?;
        check_probability("carpool_share", self.carpool_share)?;
        check_probability("cancel_probability", self.cancel_probability)
    }

    fn random_position<R: Rng>(&self, rng: &mut R) -> Result<Coordinate> {
        let lat = rng.gen_range(self.lat_min..=self.lat_max);
        let lng = rng.gen_range(self.lng_min..=self.lng_max);
        Coordinate::new(lat, lng)
    }
}

fn check_bounds(axis: &str, min: f64, max: f64, limit: f64) -> Result<()> {
    let on_globe = |value: f64| value.is_finite() && value.abs() <= limit;
    if !on_globe(min) || !on_globe(max) || min > max {
        let message = format!("invalid {axis} bounds {min}..={max}");
        return Err(DispatchError::Config(message));
    }
    Ok(())
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        let message = format!("{name} must be within 0..=1, got {value}");
        return Err(DispatchError::Config(message));
    }
    Ok(())
}

fn random_kind<R: Rng>(rng: &mut R) -> VehicleKind {
    VehicleKind::ALL
        .choose(rng)
        .copied()
        .unwrap_or(VehicleKind::Sedan)
}

/// Riders and drivers created by [`spawn_fleet`], in creation order.
#[derive(Debug, Clone, Default)]
pub struct Fleet {
    pub riders: Vec<Arc<Rider>>,
    pub drivers: Vec<Arc<Driver>>,
}

fn vehicle_for(kind: VehicleKind, index: usize) -> VehicleSpec {
    let (prefix, model, capacity) = match kind {
        VehicleKind::Bike => ("BIKE", "Honda CBR", 1),
        VehicleKind::AutoRickshaw => ("AUTO", "Bajaj RE", 3),
        VehicleKind::Sedan => ("CAR", "Toyota Camry", 4),
        VehicleKind::Suv => ("SUV", "Ford Explorer", 6),
    };
    VehicleSpec::new(format!("{prefix}{index:04}"), model, kind, capacity)
}

/// Register `num_riders` riders and `num_drivers` drivers at random positions and
/// put every driver in the dispatch pool. Invalid params are rejected before
/// anything is registered.
pub fn spawn_fleet(
    registry: &UserRegistry,
    engine: &DispatchEngine,
    params: &FleetParams,
) -> Result<Fleet> {
    params.validate()?;
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut fleet = Fleet::default();

    for index in 0..params.num_drivers {
        let kind = random_kind(&mut rng);
        let location = params.random_position(&mut rng)?;
        let driver = registry.register_driver(
            format!("Driver {index}"),
            format!("555-{index:04}"),
            vehicle_for(kind, index),
            location,
        )?;
        // Spread ratings so HighestRated has something to choose between.
        driver.update_rating(rng.gen_range(3.0..=5.0))?;
        engine.register_driver(Arc::clone(&driver));
        fleet.drivers.push(driver);
    }

    for index in 0..params.num_riders {
        let location = params.random_position(&mut rng)?;
        let rider = registry.register_rider(
            format!("Rider {index}"),
            format!("556-{index:04}"),
            location,
        )?;
        fleet.riders.push(rider);
    }

    debug!(
        drivers = fleet.drivers.len(),
        riders = fleet.riders.len(),
        seed = params.seed,
        "fleet spawned"
    );
    Ok(fleet)
}

/// Each rider requests one ride to a random dropoff. Assigned rides are driven
/// to completion (or cancelled with `cancel_probability`) before the next rider
/// requests, so drivers are recycled through the pool.
pub fn run_requests(
    engine: &DispatchEngine,
    fleet: &Fleet,
    params: &FleetParams,
) -> Result<DispatchTelemetry> {
    params.validate()?;
    let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(1));

    for rider in &fleet.riders {
        let dropoff = params.random_position(&mut rng)?;
        let kind = random_kind(&mut rng);
        let outcome = if rng.gen_bool(params.carpool_share) {
            engine.request_carpool(Arc::clone(rider), rider.location(), dropoff, kind)
        } else {
            engine.request_ride(Arc::clone(rider), rider.location(), dropoff, kind)
        };

        let ride_id = outcome.ride_id();
        if !outcome.is_assigned() {
            engine.cancel_ride(ride_id)?;
            continue;
        }
        engine.start_ride(ride_id)?;
        if rng.gen_bool(params.cancel_probability) {
            engine.cancel_ride(ride_id)?;
            continue;
        }
        engine.pickup_rider(ride_id)?;
        let ride = engine.complete_ride(ride_id)?;
        if let Some(driver) = &ride.driver {
            rider.update_location(dropoff);
            let fare = ride.fare;
            debug!(ride_id = %ride_id, driver_id = %driver.id, fare, "scenario ride done");
        }
    }

    Ok(engine.telemetry())
}
