pub mod agents;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod ids;
pub mod matching;
pub mod observers;
pub mod pricing;
pub mod registry;
pub mod ride;
pub mod scenario;
pub mod spatial;
pub mod telemetry;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use dispatch::{DispatchEngine, RideRequestOutcome};
pub use error::{DispatchError, Result};
