//! Error taxonomy for the dispatch engine.
//!
//! None of these are fatal: every variant describes a local, expected condition
//! the caller can branch on. "No driver available" is deliberately absent; it is
//! a normal outcome carried by [`crate::RideRequestOutcome::Unassigned`].

use thiserror::Error;

use crate::ids::{DriverId, RideId, RiderId};
use crate::ride::{RideAction, RideStatus};

pub type Result<T> = std::result::Result<T, DispatchError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("ride {0} not found")]
    UnknownRide(RideId),

    #[error("driver {0} not found")]
    UnknownDriver(DriverId),

    #[error("rider {0} not found")]
    UnknownRider(RiderId),

    /// The ride exists but already reached a terminal status.
    #[error("ride {0} is no longer active")]
    RideNotActive(RideId),

    /// The driver is assigned to an active ride.
    #[error("driver {0} is on an active ride")]
    DriverBusy(DriverId),

    #[error("cannot {action} ride {ride_id} while it is {from}")]
    InvalidTransition {
        ride_id: RideId,
        from: RideStatus,
        action: RideAction,
    },

    #[error("invalid vehicle: {0}")]
    InvalidVehicle(String),

    #[error("invalid coordinate ({lat}, {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("rating {0} is outside the accepted range")]
    InvalidRating(f64),

    #[error("invalid pricing modifier: {0}")]
    InvalidPricing(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DispatchError {
    /// True for the "not found" family (rides, drivers, riders).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DispatchError::UnknownRide(_)
                | DispatchError::UnknownDriver(_)
                | DispatchError::UnknownRider(_)
        )
    }

    /// True for malformed input rejected before anything was built.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DispatchError::InvalidVehicle(_)
                | DispatchError::InvalidCoordinate { .. }
                | DispatchError::InvalidRating(_)
                | DispatchError::InvalidPricing(_)
                | DispatchError::Config(_)
        )
    }
}
