//! Ride change notifications.
//!
//! Observers are called synchronously, in registration order, after the new state
//! has been applied. They run while the engine holds the ride, so they must be fast
//! and must not call back into the [`crate::DispatchEngine`]. Panics are not caught.
//!
//! The standard set only reports through `tracing`; how a notification actually
//! reaches a rider or driver is up to the surrounding application.

use std::sync::Arc;

use tracing::info;

use crate::ride::{Ride, RideStatus};

pub trait RideObserver: Send + Sync {
    fn on_ride_changed(&self, ride: &Ride);
}

impl<F> RideObserver for F
where
    F: Fn(&Ride) + Send + Sync,
{
    fn on_ride_changed(&self, ride: &Ride) {
        self(ride)
    }
}

/// Observers attached to every ride when the engine is configured to do so.
pub fn standard_observers() -> Vec<Arc<dyn RideObserver>> {
    vec![
        Arc::new(RiderNotificationObserver),
        Arc::new(DriverNotificationObserver),
        Arc::new(SystemLogObserver),
    ]
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RiderNotificationObserver;

impl RideObserver for RiderNotificationObserver {
    fn on_ride_changed(&self, ride: &Ride) {
        let rider = ride.rider().name();
        match (ride.status(), ride.driver()) {
            (RideStatus::DriverAssigned, Some(driver)) => info!(
                target: "dispatch::notify::rider",
                ride_id = %ride.id(),
                rider,
                "driver {} has been assigned to your ride, vehicle {} ({})",
                driver.name(),
                driver.vehicle().model(),
                driver.vehicle().vehicle_id()
            ),
            (RideStatus::DriverEnRoute, Some(driver)) => info!(
                target: "dispatch::notify::rider",
                ride_id = %ride.id(),
                rider,
                "driver {} is on the way to pick you up",
                driver.name()
            ),
            (RideStatus::RideInProgress, _) => info!(
                target: "dispatch::notify::rider",
                ride_id = %ride.id(),
                rider,
                "your ride has started"
            ),
            (RideStatus::Completed, _) => info!(
                target: "dispatch::notify::rider",
                ride_id = %ride.id(),
                rider,
                "your ride has been completed, fare {:.2}",
                ride.fare()
            ),
            (RideStatus::Cancelled, _) => info!(
                target: "dispatch::notify::rider",
                ride_id = %ride.id(),
                rider,
                "your ride has been cancelled"
            ),
            _ => {}
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DriverNotificationObserver;

impl RideObserver for DriverNotificationObserver {
    fn on_ride_changed(&self, ride: &Ride) {
        let Some(driver) = ride.driver() else {
            return;
        };
        let driver = driver.name();
        match ride.status() {
            RideStatus::DriverAssigned => info!(
                target: "dispatch::notify::driver",
                ride_id = %ride.id(),
                driver,
                "new ride assigned, pickup at {:?}",
                <(f64, f64)>::from(ride.pickup())
            ),
            RideStatus::DriverEnRoute => info!(
                target: "dispatch::notify::driver",
                ride_id = %ride.id(),
                driver,
                "proceed to {:?} to pick up {}",
                <(f64, f64)>::from(ride.pickup()),
                ride.rider().name()
            ),
            RideStatus::RideInProgress => info!(
                target: "dispatch::notify::driver",
                ride_id = %ride.id(),
                driver,
                "ride started, navigate to {:?}",
                <(f64, f64)>::from(ride.dropoff())
            ),
            RideStatus::Completed => info!(
                target: "dispatch::notify::driver",
                ride_id = %ride.id(),
                driver,
                "ride completed, earned {:.2}",
                ride.fare()
            ),
            RideStatus::Cancelled => info!(
                target: "dispatch::notify::driver",
                ride_id = %ride.id(),
                driver,
                "ride has been cancelled"
            ),
            RideStatus::Requested => {}
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLogObserver;

impl RideObserver for SystemLogObserver {
    fn on_ride_changed(&self, ride: &Ride) {
        info!(
            target: "dispatch::system",
            ride_id = %ride.id(),
            status = %ride.status(),
            "ride status changed"
        );
        if ride.status() == RideStatus::Completed {
            info!(
                target: "dispatch::system",
                ride_id = %ride.id(),
                distance_km = ride.distance_km(),
                fare = ride.fare(),
                "ride completed"
            );
        }
    }
}
