//! Rider and driver registration.
//!
//! The registry owns every rider and driver for the life of the process. It does
//! not touch the dispatch pool: registering a driver here and making them
//! matchable with [`crate::DispatchEngine::register_driver`] are separate steps.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::agents::{Driver, Rider, Vehicle, VehicleSpec};
use crate::error::{DispatchError, Result};
use crate::ids::{DriverId, RiderId};
use crate::spatial::Coordinate;

struct Directory<K, V> {
    by_id: HashMap<K, Arc<V>>,
    order: Vec<K>,
}

impl<K, V> Default for Directory<K, V> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<K: Copy + Eq + Hash, V> Directory<K, V> {
    fn insert(&mut self, id: K, value: Arc<V>) {
        self.by_id.insert(id, value);
        self.order.push(id);
    }

    fn get(&self, id: &K) -> Option<Arc<V>> {
        self.by_id.get(id).cloned()
    }

    fn all(&self) -> Vec<Arc<V>> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id).cloned())
            .collect()
    }
}

#[derive(Default)]
pub struct UserRegistry {
    riders: RwLock<Directory<RiderId, Rider>>,
    drivers: RwLock<Directory<DriverId, Driver>>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_rider(
        &self,
        name: impl Into<String>,
        phone: impl Into<String>,
        default_location: Coordinate,
    ) -> Result<Arc<Rider>> {
        let rider = Arc::new(Rider::new(name, phone, default_location)?);
        info!(rider_id = %rider.id(), name = rider.name(), "rider registered");
        self.riders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(rider.id(), Arc::clone(&rider));
        Ok(rider)
    }

    /// Validate the vehicle and register its driver. Nothing is stored on error.
    pub fn register_driver(
        &self,
        name: impl Into<String>,
        phone: impl Into<String>,
        vehicle: VehicleSpec,
        location: Coordinate,
    ) -> Result<Arc<Driver>> {
        let vehicle = Vehicle::new(vehicle)?;
        let driver = Arc::new(Driver::new(name, phone, vehicle, location)?);
        info!(
            driver_id = %driver.id(),
            name = driver.name(),
            vehicle_kind = %driver.vehicle().kind(),
            "driver registered"
        );
        self.drivers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(driver.id(), Arc::clone(&driver));
        Ok(driver)
    }

    pub fn rider(&self, id: RiderId) -> Result<Arc<Rider>> {
        self.riders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .ok_or(DispatchError::UnknownRider(id))
    }

    pub fn driver(&self, id: DriverId) -> Result<Arc<Driver>> {
        self.drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .ok_or(DispatchError::UnknownDriver(id))
    }

    /// All riders in registration order.
    pub fn riders(&self) -> Vec<Arc<Rider>> {
        self.riders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .all()
    }

    /// All drivers in registration order.
    pub fn drivers(&self) -> Vec<Arc<Driver>> {
        self.drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .all()
    }

    pub fn update_rider_location(&self, id: RiderId, location: Coordinate) -> Result<()> {
        self.rider(id)?.update_location(location);
        Ok(())
    }

    pub fn update_driver_location(&self, id: DriverId, location: Coordinate) -> Result<()> {
        self.driver(id)?.update_location(location);
        Ok(())
    }

    pub fn rate_driver(&self, id: DriverId, rating: f64) -> Result<f64> {
        self.driver(id)?.update_rating(rating)
    }
}
