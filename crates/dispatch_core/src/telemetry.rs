//! Telemetry / KPIs: counts dispatch outcomes and records completed rides.
//!
//! Counts cover the whole life of the engine. Per-ride records are a rolling
//! window of the most recent completions, capped by the record limit.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::ids::{DriverId, RideId, RiderId};
use crate::ride::Ride;

/// One completed ride, recorded when the engine completes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedRideRecord {
    pub ride_id: RideId,
    pub rider_id: RiderId,
    pub driver_id: Option<DriverId>,
    pub requested_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: DateTime<Utc>,
    pub fare: f64,
    pub distance_km: f64,
}

impl CompletedRideRecord {
    /// Time from request to the rider being picked up.
    pub fn time_to_pickup(&self) -> Option<Duration> {
        self.started_at.map(|started| started - self.requested_at)
    }

    /// Time from pickup to dropoff.
    pub fn trip_duration(&self) -> Option<Duration> {
        self.started_at.map(|started| self.completed_at - started)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispatchCounts {
    pub rides_requested: u64,
    pub rides_assigned: u64,
    pub rides_unassigned: u64,
    pub rides_completed: u64,
    pub rides_cancelled: u64,
    pub revenue: f64,
}

/// Completed-ride records kept when no other limit is configured.
pub const DEFAULT_COMPLETED_RIDE_LIMIT: usize = 10_000;

#[derive(Debug, Clone, Serialize)]
pub struct DispatchTelemetry {
    pub counts: DispatchCounts,
    /// Most recent completions, oldest first.
    pub completed_rides: VecDeque<CompletedRideRecord>,
    #[serde(skip)]
    record_limit: usize,
}

impl Default for DispatchTelemetry {
    fn default() -> Self {
        Self::with_record_limit(DEFAULT_COMPLETED_RIDE_LIMIT)
    }
}

impl DispatchTelemetry {
    /// Keep at most `record_limit` completed-ride records. Zero keeps none.
    pub fn with_record_limit(record_limit: usize) -> Self {
        Self {
            counts: DispatchCounts::default(),
            completed_rides: VecDeque::new(),
            record_limit,
        }
    }

    pub fn record_limit(&self) -> usize {
        self.record_limit
    }

    pub fn record_request(&mut self, assigned: bool) {
        self.counts.rides_requested += 1;
        if assigned {
            self.counts.rides_assigned += 1;
        } else {
            self.counts.rides_unassigned += 1;
        }
    }

    pub fn record_completion(&mut self, ride: &Ride) {
        let Some(completed_at) = ride.ended_at() else {
            return;
        };
        self.counts.rides_completed += 1;
        self.counts.revenue += ride.fare();
        self.completed_rides.push_back(CompletedRideRecord {
            ride_id: ride.id(),
            rider_id: ride.rider().id(),
            driver_id: ride.driver().map(|driver| driver.id()),
            requested_at: ride.requested_at(),
            started_at: ride.started_at(),
            completed_at,
            fare: ride.fare(),
            distance_km: ride.distance_km(),
        });
        while self.completed_rides.len() > self.record_limit {
            self.completed_rides.pop_front();
        }
    }

    pub fn record_cancellation(&mut self) {
        self.counts.rides_cancelled += 1;
    }

    /// Mean fare over completed rides, if any.
    pub fn average_fare(&self) -> Option<f64> {
        (self.counts.rides_completed > 0)
            .then(|| self.counts.revenue / self.counts.rides_completed as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::VehicleKind;
    use crate::test_helpers::{ride_from, test_driver, test_origin};

    #[test]
    fn record_derives_durations() {
        let requested_at = DateTime::<Utc>::UNIX_EPOCH;
        let record = CompletedRideRecord {
            ride_id: RideId::new(),
            rider_id: RiderId::new(),
            driver_id: Some(DriverId::new()),
            requested_at,
            started_at: Some(requested_at + Duration::seconds(120)),
            completed_at: requested_at + Duration::seconds(720),
            fare: 80.0,
            distance_km: 2.5,
        };
        assert_eq!(record.time_to_pickup(), Some(Duration::seconds(120)));
        assert_eq!(record.trip_duration(), Some(Duration::seconds(600)));
    }

    #[test]
    fn completed_records_roll_over_at_the_limit() {
        let mut telemetry = DispatchTelemetry::with_record_limit(2);
        let mut ids = Vec::new();
        for _ in 0..3 {
            let mut ride = ride_from(test_origin(), VehicleKind::Sedan);
            ride.assign(test_driver(VehicleKind::Sedan, test_origin()));
            ride.start();
            ride.pickup_rider();
            ride.set_fare(10.0);
            ride.complete();
            ids.push(ride.id());
            telemetry.record_completion(&ride);
        }

        assert_eq!(telemetry.counts.rides_completed, 3);
        assert!((telemetry.counts.revenue - 30.0).abs() < 1e-9);
        let kept: Vec<_> = telemetry
            .completed_rides
            .iter()
            .map(|record| record.ride_id)
            .collect();
        assert_eq!(kept, ids[1..].to_vec());
        assert_eq!(telemetry.average_fare(), Some(10.0));
    }

    #[test]
    fn counts_requests_by_outcome() {
        let mut telemetry = DispatchTelemetry::default();
        telemetry.record_request(true);
        telemetry.record_request(false);
        telemetry.record_cancellation();
        assert_eq!(telemetry.counts.rides_requested, 2);
        assert_eq!(telemetry.counts.rides_assigned, 1);
        assert_eq!(telemetry.counts.rides_unassigned, 1);
        assert_eq!(telemetry.counts.rides_cancelled, 1);
        assert_eq!(telemetry.average_fare(), None);
    }
}
