use std::sync::Arc;

use crate::agents::Driver;
use crate::ride::Ride;

use super::algorithm::{eligible_candidates, MatchingStrategy, DEFAULT_MAX_PICKUP_KM};
use super::types::MatchCandidate;

/// Picks the eligible driver closest to the pickup point.
///
/// Ties go to whichever driver comes first in the pool.
#[derive(Debug, Clone, Copy)]
pub struct NearestMatching {
    pub max_pickup_km: f64,
}

impl NearestMatching {
    pub fn new(max_pickup_km: f64) -> Self {
        Self { max_pickup_km }
    }
}

impl Default for NearestMatching {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PICKUP_KM)
    }
}

impl MatchingStrategy for NearestMatching {
    fn find_driver(&self, ride: &Ride, candidates: &[Arc<Driver>]) -> Option<Arc<Driver>> {
        let mut best: Option<MatchCandidate> = None;
        for candidate in eligible_candidates(ride, candidates, self.max_pickup_km) {
            let better = match &best {
                Some(current) => candidate.pickup_distance_km < current.pickup_distance_km,
                None => true,
            };
            if better {
                best = Some(candidate);
            }
        }
        best.map(|candidate| candidate.driver)
    }

    fn name(&self) -> &'static str {
        "nearest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::VehicleKind;
    use crate::spatial::destination_point;
    use crate::test_helpers::{ride_from, test_driver, test_origin};

    #[test]
    fn selects_closer_driver_regardless_of_pool_order() {
        let origin = test_origin();
        let far = test_driver(VehicleKind::Sedan, destination_point(origin, 90.0, 8.0));
        let near = test_driver(VehicleKind::Sedan, destination_point(origin, 180.0, 2.0));
        let ride = ride_from(origin, VehicleKind::Sedan);

        let chosen = NearestMatching::default()
            .find_driver(&ride, &[far, near.clone()])
            .expect("driver within range");
        assert_eq!(chosen.id(), near.id());
    }

    #[test]
    fn equal_distance_keeps_first_in_pool() {
        let origin = test_origin();
        let east = test_driver(VehicleKind::Sedan, destination_point(origin, 90.0, 3.0));
        let west = test_driver(VehicleKind::Sedan, destination_point(origin, 270.0, 3.0));
        let ride = ride_from(origin, VehicleKind::Sedan);

        let chosen = NearestMatching::default()
            .find_driver(&ride, &[east.clone(), west])
            .expect("driver");
        assert_eq!(chosen.id(), east.id());
    }

    #[test]
    fn ignores_wrong_kind_and_out_of_range() {
        let origin = test_origin();
        let bike = test_driver(VehicleKind::Bike, destination_point(origin, 0.0, 0.5));
        let distant = test_driver(VehicleKind::Sedan, destination_point(origin, 0.0, 10.5));
        let ride = ride_from(origin, VehicleKind::Sedan);

        let strategy = NearestMatching::default();
        assert!(strategy.find_driver(&ride, &[bike, distant]).is_none());
        assert!(strategy.find_driver(&ride, &[]).is_none());
    }
}
