use std::fmt;
use std::sync::Arc;

use crate::agents::{Driver, VehicleKind};
use crate::ride::Ride;
use crate::spatial::{distance_km, Coordinate};

use super::types::MatchCandidate;

/// Drivers farther than this from the pickup point are never matched.
pub const DEFAULT_MAX_PICKUP_KM: f64 = 10.0;

/// Trait for strategies that pick one driver for a ride.
///
/// Strategies are stateless and shared between threads; the engine hands them the
/// dispatch pool in registration order and removes the chosen driver itself.
pub trait MatchingStrategy: Send + Sync + fmt::Debug {
    /// Pick a driver for `ride` from `candidates`.
    ///
    /// Returns `None` when nobody passes the vehicle kind and range filters. That
    /// is a normal outcome, not an error.
    fn find_driver(&self, ride: &Ride, candidates: &[Arc<Driver>]) -> Option<Arc<Driver>>;

    fn name(&self) -> &'static str;
}

/// Candidates that are available, drive the requested kind, and sit within
/// `max_pickup_km` of the pickup point, in pool order.
pub fn eligible_candidates<'a>(
    ride: &Ride,
    candidates: &'a [Arc<Driver>],
    max_pickup_km: f64,
) -> impl Iterator<Item = MatchCandidate> + 'a {
    let kind = Some(ride.vehicle_kind());
    candidates_near(ride.pickup(), kind, candidates, max_pickup_km)
}

/// Available candidates within `max_km` of `location`, in pool order. A `kind`
/// of `None` accepts every vehicle kind.
pub fn candidates_near(
    location: Coordinate,
    kind: Option<VehicleKind>,
    candidates: &[Arc<Driver>],
    max_km: f64,
) -> impl Iterator<Item = MatchCandidate> + '_ {
    candidates
        .iter()
        .filter(|driver| driver.is_available())
        .filter(move |driver| kind.is_none() || kind == Some(driver.vehicle().kind()))
        .filter_map(move |driver| {
            let pickup_distance_km = distance_km(driver.location(), location);
            (pickup_distance_km <= max_km).then(|| MatchCandidate {
                driver: Arc::clone(driver),
                pickup_distance_km,
                rating: driver.rating(),
            })
        })
}
