//! Spatial operations: coordinates and great-circle distance.
//!
//! Distances are haversine distances over a spherical Earth of radius
//! [`EARTH_RADIUS_KM`]. The same function backs ride length, matching range checks
//! and therefore fares, so all three always agree.

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A (latitude, longitude) pair in degrees.
///
/// Serialized as a 2-tuple `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite or out-of-range degrees.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if !valid {
            return Err(DispatchError::InvalidCoordinate { lat, lng });
        }
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        distance_km(*self, *other)
    }
}

impl TryFrom<(f64, f64)> for Coordinate {
    type Error = DispatchError;

    fn try_from((lat, lng): (f64, f64)) -> Result<Self> {
        Coordinate::new(lat, lng)
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(value: Coordinate) -> Self {
        (value.lat, value.lng)
    }
}

/// Haversine distance in kilometres.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lon1) = (a.lat.to_radians(), a.lng.to_radians());
    let (lat2, lon2) = (b.lat.to_radians(), b.lng.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Point reached by travelling `distance_km` from `origin` along `bearing_deg`
/// (clockwise from north). Used to place fixtures and fleets at known distances.
pub fn destination_point(origin: Coordinate, bearing_deg: f64, distance_km: f64) -> Coordinate {
    let angular = distance_km / EARTH_RADIUS_KM;
    let bearing = bearing_deg.to_radians();
    let (sin_lat1, cos_lat1) = origin.lat.to_radians().sin_cos();
    let (sin_ang, cos_ang) = angular.sin_cos();

    let sin_lat2 = sin_lat1 * cos_ang + cos_lat1 * sin_ang * bearing.cos();
    let lat2 = sin_lat2.asin();
    let y = bearing.sin() * sin_ang * cos_lat1;
    let x = cos_ang - sin_lat1 * sin_lat2;
    let lon2 = origin.lng.to_radians() + y.atan2(x);

    // Normalise longitude into [-180, 180].
    let lng = (lon2.to_degrees() + 540.0) % 360.0 - 180.0;
    Coordinate {
        lat: lat2.to_degrees(),
        lng,
    }
}
