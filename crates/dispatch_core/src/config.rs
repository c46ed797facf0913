//! Engine configuration.
//!
//! Every field has a default, so a JSON document only needs the keys it changes:
//!
//! ```json
//! { "matching": "HIGHEST_RATED", "pricing": [{ "type": "surge", "multiplier": 1.8 }] }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};
use crate::matching::{MatchingPolicy, MatchingStrategy, DEFAULT_MAX_PICKUP_KM};
use crate::pricing::{build_pricing, PricingModifier, PricingStrategy};
use crate::telemetry::DEFAULT_COMPLETED_RIDE_LIMIT;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub matching: MatchingPolicy,
    /// Maximum driver-to-pickup distance considered by matching.
    pub max_pickup_km: f64,
    /// Modifiers applied over base pricing, innermost first.
    pub pricing: Vec<PricingModifier>,
    /// Attach the rider/driver/system-log observers to every new ride.
    pub standard_observers: bool,
    /// Record `ended_at` when a ride is cancelled.
    pub stamp_cancellation: bool,
    /// Completed-ride records kept by telemetry; older ones are dropped.
    pub completed_ride_limit: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            matching: MatchingPolicy::Nearest,
            max_pickup_km: DEFAULT_MAX_PICKUP_KM,
            pricing: Vec::new(),
            standard_observers: true,
            stamp_cancellation: true,
            completed_ride_limit: DEFAULT_COMPLETED_RIDE_LIMIT,
        }
    }
}

impl DispatchConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: DispatchConfig =
            serde_json::from_str(json).map_err(|err| DispatchError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.max_pickup_km.is_finite() || self.max_pickup_km <= 0.0 {
            return Err(DispatchError::Config(format!(
                "max_pickup_km must be positive, got {}",
                self.max_pickup_km
            )));
        }
        build_pricing(&self.pricing).map(|_| ())
    }

    pub fn with_matching(mut self, matching: MatchingPolicy) -> Self {
        self.matching = matching;
        self
    }

    pub fn with_max_pickup_km(mut self, max_pickup_km: f64) -> Self {
        self.max_pickup_km = max_pickup_km;
        self
    }

    pub fn with_pricing(mut self, modifiers: impl Into<Vec<PricingModifier>>) -> Self {
        self.pricing = modifiers.into();
        self
    }

    pub fn with_surge(mut self, multiplier: f64) -> Self {
        self.pricing.push(PricingModifier::Surge { multiplier });
        self
    }

    pub fn with_discount(mut self, percentage: f64) -> Self {
        self.pricing.push(PricingModifier::Discount { percentage });
        self
    }

    pub fn with_standard_observers(mut self, enabled: bool) -> Self {
        self.standard_observers = enabled;
        self
    }

    pub fn with_stamp_cancellation(mut self, enabled: bool) -> Self {
        self.stamp_cancellation = enabled;
        self
    }

    pub fn with_completed_ride_limit(mut self, limit: usize) -> Self {
        self.completed_ride_limit = limit;
        self
    }

    pub(crate) fn matching_strategy(&self) -> Arc<dyn MatchingStrategy> {
        self.matching.build(self.max_pickup_km)
    }

    pub(crate) fn pricing_strategy(&self) -> Result<Arc<dyn PricingStrategy>> {
        build_pricing(&self.pricing)
    }
}
