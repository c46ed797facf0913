//! Riders, drivers and their vehicles.
//!
//! Identity, contact details and the vehicle are fixed at registration. The
//! mutable parts (location, availability, rating, ride history) sit behind a lock
//! so a driver can be shared between the registry, the dispatch pool and the ride
//! it is serving.

use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};
use crate::ids::{DriverId, RideId, RiderId};
use crate::spatial::Coordinate;

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;
pub const DEFAULT_RATING: f64 = 4.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleKind {
    Bike,
    AutoRickshaw,
    Sedan,
    Suv,
}

impl VehicleKind {
    pub const ALL: [VehicleKind; 4] = [
        VehicleKind::Bike,
        VehicleKind::AutoRickshaw,
        VehicleKind::Sedan,
        VehicleKind::Suv,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleKind::Bike => "BIKE",
            VehicleKind::AutoRickshaw => "AUTO_RICKSHAW",
            VehicleKind::Sedan => "SEDAN",
            VehicleKind::Suv => "SUV",
        }
    }

    /// Kinds that may serve a carpool ride.
    pub fn supports_carpool(&self) -> bool {
        matches!(self, VehicleKind::Sedan | VehicleKind::Suv)
    }

    /// Parse a kind name, falling back to `Sedan` for anything unrecognised.
    pub fn parse_or_sedan(name: &str) -> VehicleKind {
        name.parse().unwrap_or(VehicleKind::Sedan)
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleKind {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        VehicleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| DispatchError::InvalidVehicle(format!("unknown vehicle kind `{s}`")))
    }
}

/// Registration input for a vehicle; validated into a [`Vehicle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub vehicle_id: String,
    pub model: String,
    pub kind: VehicleKind,
    pub capacity: u32,
}

impl VehicleSpec {
    pub fn new(
        vehicle_id: impl Into<String>,
        model: impl Into<String>,
        kind: VehicleKind,
        capacity: u32,
    ) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            model: model.into(),
            kind,
            capacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    vehicle_id: String,
    model: String,
    kind: VehicleKind,
    capacity: u32,
}

impl Vehicle {
    pub fn new(spec: VehicleSpec) -> Result<Self> {
        if spec.vehicle_id.trim().is_empty() {
            return Err(DispatchError::InvalidVehicle("vehicle id must not be empty".to_string()));
        }
        if spec.model.trim().is_empty() {
            return Err(DispatchError::InvalidVehicle(
                "vehicle model must not be empty".to_string(),
            ));
        }
        if spec.capacity == 0 {
            return Err(DispatchError::InvalidVehicle(format!(
                "vehicle {} must carry at least one passenger",
                spec.vehicle_id
            )));
        }
        Ok(Self {
            vehicle_id: spec.vehicle_id,
            model: spec.model,
            kind: spec.kind,
            capacity: spec.capacity,
        })
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn kind(&self) -> VehicleKind {
        self.kind
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn require_name(role: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DispatchError::Config(format!("{role} name must not be empty")));
    }
    Ok(())
}

#[derive(Debug)]
struct DriverState {
    location: Coordinate,
    available: bool,
    rating: f64,
    ride_history: Vec<RideId>,
}

#[derive(Debug)]
pub struct Driver {
    id: DriverId,
    name: String,
    phone: String,
    vehicle: Vehicle,
    state: RwLock<DriverState>,
}

impl Driver {
    /// A new driver starts available, at the default rating, with no rides.
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        vehicle: Vehicle,
        location: Coordinate,
    ) -> Result<Self> {
        let name = name.into();
        require_name("driver", &name)?;
        Ok(Self {
            id: DriverId::new(),
            name,
            phone: phone.into(),
            vehicle,
            state: RwLock::new(DriverState {
                location,
                available: true,
                rating: DEFAULT_RATING,
                ride_history: Vec::new(),
            }),
        })
    }

    pub fn id(&self) -> DriverId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn location(&self) -> Coordinate {
        read(&self.state).location
    }

    pub fn update_location(&self, location: Coordinate) {
        write(&self.state).location = location;
    }

    pub fn is_available(&self) -> bool {
        read(&self.state).available
    }

    /// Availability is owned by the ride lifecycle and the dispatch engine.
    pub(crate) fn set_availability(&self, available: bool) {
        write(&self.state).available = available;
    }

    pub fn rating(&self) -> f64 {
        read(&self.state).rating
    }

    /// Fold a new rating into the running average over completed rides.
    ///
    /// With no completed rides the new rating replaces the default outright.
    pub fn update_rating(&self, new_rating: f64) -> Result<f64> {
        if !new_rating.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&new_rating) {
            return Err(DispatchError::InvalidRating(new_rating));
        }
        let mut state = write(&self.state);
        let total = state.ride_history.len() as f64;
        let averaged = if total == 0.0 {
            new_rating
        } else {
            (state.rating * total + new_rating) / (total + 1.0)
        };
        state.rating = averaged.clamp(MIN_RATING, MAX_RATING);
        Ok(state.rating)
    }

    pub fn ride_history(&self) -> Vec<RideId> {
        read(&self.state).ride_history.clone()
    }

    pub(crate) fn record_ride(&self, ride_id: RideId) {
        write(&self.state).ride_history.push(ride_id);
    }

    pub fn info(&self) -> DriverInfo {
        DriverInfo {
            id: self.id,
            name: self.name.clone(),
            phone: self.phone.clone(),
            vehicle_id: self.vehicle.vehicle_id.clone(),
            vehicle_model: self.vehicle.model.clone(),
            vehicle_kind: self.vehicle.kind,
            rating: self.rating(),
            location: self.location(),
            available: self.is_available(),
        }
    }
}

/// Owned, serializable view of a driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverInfo {
    pub id: DriverId,
    pub name: String,
    pub phone: String,
    pub vehicle_id: String,
    pub vehicle_model: String,
    pub vehicle_kind: VehicleKind,
    pub rating: f64,
    pub location: Coordinate,
    pub available: bool,
}

#[derive(Debug)]
struct RiderState {
    location: Coordinate,
    ride_history: Vec<RideId>,
}

#[derive(Debug)]
pub struct Rider {
    id: RiderId,
    name: String,
    phone: String,
    default_location: Coordinate,
    state: RwLock<RiderState>,
}

impl Rider {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        default_location: Coordinate,
    ) -> Result<Self> {
        let name = name.into();
        require_name("rider", &name)?;
        Ok(Self {
            id: RiderId::new(),
            name,
            phone: phone.into(),
            default_location,
            state: RwLock::new(RiderState {
                location: default_location,
                ride_history: Vec::new(),
            }),
        })
    }

    pub fn id(&self) -> RiderId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn default_location(&self) -> Coordinate {
        self.default_location
    }

    pub fn location(&self) -> Coordinate {
        read(&self.state).location
    }

    pub fn update_location(&self, location: Coordinate) {
        write(&self.state).location = location;
    }

    pub fn ride_history(&self) -> Vec<RideId> {
        read(&self.state).ride_history.clone()
    }

    pub(crate) fn record_ride(&self, ride_id: RideId) {
        write(&self.state).ride_history.push(ride_id);
    }

    pub fn info(&self) -> RiderInfo {
        RiderInfo {
            id: self.id,
            name: self.name.clone(),
            phone: self.phone.clone(),
            default_location: self.default_location,
            location: self.location(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiderInfo {
    pub id: RiderId,
    pub name: String,
    pub phone: String,
    pub default_location: Coordinate,
    pub location: Coordinate,
}
