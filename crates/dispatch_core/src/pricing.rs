//! Fare calculation: a base table plus composable surge/discount modifiers.
//!
//! Formula for the base strategy: `fare = base(kind) + distance_km * per_km(kind)`.
//! Modifiers wrap any other strategy and call it exactly once per calculation.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agents::VehicleKind;
use crate::error::{DispatchError, Result};
use crate::ride::Ride;
use crate::spatial::{distance_km, Coordinate};

pub const DEFAULT_SURGE_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_DISCOUNT_PERCENTAGE: f64 = 10.0;

/// The inputs a fare depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FareBasis {
    pub distance_km: f64,
    pub vehicle_kind: VehicleKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FareRates {
    pub base_fare: f64,
    pub per_km_rate: f64,
}

/// Standard rate card. Unrecognised kind names are mapped to Sedan before they
/// reach this table (see [`VehicleKind::parse_or_sedan`]).
pub fn standard_rates(kind: VehicleKind) -> FareRates {
    let (base_fare, per_km_rate) = match kind {
        VehicleKind::Bike => (20.0, 5.0),
        VehicleKind::AutoRickshaw => (30.0, 8.0),
        VehicleKind::Sedan => (50.0, 12.0),
        VehicleKind::Suv => (70.0, 16.0),
    };
    FareRates {
        base_fare,
        per_km_rate,
    }
}

pub trait PricingStrategy: Send + Sync + fmt::Debug {
    fn fare_for(&self, basis: &FareBasis) -> f64;

    /// Human readable description, e.g. `surge(1.5, base)`.
    fn describe(&self) -> String;

    fn calculate_fare(&self, ride: &Ride) -> f64 {
        self.fare_for(&ride.fare_basis())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BasePricing;

impl PricingStrategy for BasePricing {
    fn fare_for(&self, basis: &FareBasis) -> f64 {
        let rates = standard_rates(basis.vehicle_kind);
        rates.base_fare + basis.distance_km * rates.per_km_rate
    }

    fn describe(&self) -> String {
        "base".to_string()
    }
}

/// Multiplies the wrapped strategy's fare.
#[derive(Debug, Clone)]
pub struct SurgePricing {
    inner: Arc<dyn PricingStrategy>,
    multiplier: f64,
}

impl SurgePricing {
    pub fn new(inner: Arc<dyn PricingStrategy>, multiplier: f64) -> Result<Self> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(DispatchError::InvalidPricing(format!(
                "surge multiplier must be positive, got {multiplier}"
            )));
        }
        Ok(Self { inner, multiplier })
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }
}

impl PricingStrategy for SurgePricing {
    fn fare_for(&self, basis: &FareBasis) -> f64 {
        self.inner.fare_for(basis) * self.multiplier
    }

    fn describe(&self) -> String {
        format!("surge({}, {})", self.multiplier, self.inner.describe())
    }
}

/// Takes a percentage off the wrapped strategy's fare.
#[derive(Debug, Clone)]
pub struct DiscountPricing {
    inner: Arc<dyn PricingStrategy>,
    percentage: f64,
}

impl DiscountPricing {
    pub fn new(inner: Arc<dyn PricingStrategy>, percentage: f64) -> Result<Self> {
        if !percentage.is_finite() || !(0.0..=100.0).contains(&percentage) {
            return Err(DispatchError::InvalidPricing(format!(
                "discount percentage must be within 0..=100, got {percentage}"
            )));
        }
        Ok(Self { inner, percentage })
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }
}

impl PricingStrategy for DiscountPricing {
    fn fare_for(&self, basis: &FareBasis) -> f64 {
        let fare = self.inner.fare_for(basis);
        fare - (self.percentage / 100.0) * fare
    }

    fn describe(&self) -> String {
        format!("discount({}%, {})", self.percentage, self.inner.describe())
    }
}

/// One layer of a pricing pipeline, as it appears in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PricingModifier {
    Surge {
        #[serde(default = "default_surge")]
        multiplier: f64,
    },
    Discount {
        #[serde(default = "default_discount")]
        percentage: f64,
    },
}

fn default_surge() -> f64 {
    DEFAULT_SURGE_MULTIPLIER
}

fn default_discount() -> f64 {
    DEFAULT_DISCOUNT_PERCENTAGE
}

impl PricingModifier {
    pub fn wrap(self, inner: Arc<dyn PricingStrategy>) -> Result<Arc<dyn PricingStrategy>> {
        Ok(match self {
            PricingModifier::Surge { multiplier } => {
                Arc::new(SurgePricing::new(inner, multiplier)?)
            }
            PricingModifier::Discount { percentage } => {
                Arc::new(DiscountPricing::new(inner, percentage)?)
            }
        })
    }
}

/// Base pricing followed by modifiers, applied innermost-first.
///
/// `[Discount, Surge]` builds `surge(discount(base))`.
pub fn build_pricing(modifiers: &[PricingModifier]) -> Result<Arc<dyn PricingStrategy>> {
    modifiers
        .iter()
        .try_fold(Arc::new(BasePricing) as Arc<dyn PricingStrategy>, |inner, modifier| {
            modifier.wrap(inner)
        })
}

/// A fare quote for a trip that has not been requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FareEstimate {
    pub estimated_fare: f64,
    pub distance_km: f64,
    pub vehicle_kind: VehicleKind,
    pub pricing: String,
    pub base_fare: f64,
    pub per_km_rate: f64,
}

pub fn estimate_fare(
    strategy: &dyn PricingStrategy,
    pickup: Coordinate,
    dropoff: Coordinate,
    vehicle_kind: VehicleKind,
) -> FareEstimate {
    let basis = FareBasis {
        distance_km: distance_km(pickup, dropoff),
        vehicle_kind,
    };
    let rates = standard_rates(vehicle_kind);
    FareEstimate {
        estimated_fare: strategy.fare_for(&basis),
        distance_km: basis.distance_km,
        vehicle_kind,
        pricing: strategy.describe(),
        base_fare: rates.base_fare,
        per_km_rate: rates.per_km_rate,
    }
}
