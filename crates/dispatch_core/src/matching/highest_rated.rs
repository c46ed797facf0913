use std::sync::Arc;

use crate::agents::Driver;
use crate::ride::Ride;

use super::algorithm::{eligible_candidates, MatchingStrategy, DEFAULT_MAX_PICKUP_KM};
use super::types::MatchCandidate;

/// Picks the best rated eligible driver; ties go to the earlier pool entry.
#[derive(Debug, Clone, Copy)]
pub struct HighestRatedMatching {
    pub max_pickup_km: f64,
}

impl HighestRatedMatching {
    pub fn new(max_pickup_km: f64) -> Self {
        Self { max_pickup_km }
    }
}

impl Default for HighestRatedMatching {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PICKUP_KM)
    }
}

impl MatchingStrategy for HighestRatedMatching {
    fn find_driver(&self, ride: &Ride, candidates: &[Arc<Driver>]) -> Option<Arc<Driver>> {
        let mut best: Option<MatchCandidate> = None;
        for candidate in eligible_candidates(ride, candidates, self.max_pickup_km) {
            let better = match &best {
                Some(current) => candidate.rating > current.rating,
                None => true,
            };
            if better {
                best = Some(candidate);
            }
        }
        best.map(|candidate| candidate.driver)
    }

    fn name(&self) -> &'static str {
        "highest_rated"
    }
}
