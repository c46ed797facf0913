use std::sync::Arc;

use serde::Serialize;

use crate::agents::{Driver, DriverInfo};

/// A pool driver that passed the kind and range filters for one ride.
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub driver: Arc<Driver>,
    pub pickup_distance_km: f64,
    pub rating: f64,
}

/// A pooled driver returned by a radius search, with its distance from the
/// search point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyDriver {
    pub driver: DriverInfo,
    pub distance_km: f64,
}

impl From<MatchCandidate> for NearbyDriver {
    fn from(candidate: MatchCandidate) -> Self {
        NearbyDriver {
            driver: candidate.driver.info(),
            distance_km: candidate.pickup_distance_km,
        }
    }
}
