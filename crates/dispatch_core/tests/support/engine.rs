#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dispatch_core::clock::ManualClock;
use dispatch_core::config::DispatchConfig;
use dispatch_core::matching::MatchingPolicy;
use dispatch_core::DispatchEngine;

/// Builder for engines on a manual clock, with the logging observers off by default.
#[derive(Debug, Clone)]
pub struct TestEngineBuilder {
    config: DispatchConfig,
    start: DateTime<Utc>,
}

impl Default for TestEngineBuilder {
    fn default() -> Self {
        Self {
            config: DispatchConfig::default().with_standard_observers(false),
            start: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

impl TestEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matching(mut self, policy: MatchingPolicy) -> Self {
        self.config = self.config.with_matching(policy);
        self
    }

    pub fn with_surge(mut self, multiplier: f64) -> Self {
        self.config = self.config.with_surge(multiplier);
        self
    }

    pub fn with_discount(mut self, percentage: f64) -> Self {
        self.config = self.config.with_discount(percentage);
        self
    }

    pub fn with_standard_observers(mut self) -> Self {
        self.config = self.config.with_standard_observers(true);
        self
    }

    pub fn with_stamp_cancellation(mut self, enabled: bool) -> Self {
        self.config = self.config.with_stamp_cancellation(enabled);
        self
    }

    /// Build the engine and hand back the clock that drives it.
    pub fn build(self) -> (Arc<DispatchEngine>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(self.start));
        let engine = DispatchEngine::with_clock(self.config, clock.clone()).expect("test engine");
        (Arc::new(engine), clock)
    }
}
