use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

use super::algorithm::MatchingStrategy;
use super::highest_rated::HighestRatedMatching;
use super::nearest::NearestMatching;

/// Which matching strategy to run, as named in configuration and on the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchingPolicy {
    #[default]
    Nearest,
    HighestRated,
}

impl MatchingPolicy {
    pub fn build(self, max_pickup_km: f64) -> Arc<dyn MatchingStrategy> {
        match self {
            MatchingPolicy::Nearest => Arc::new(NearestMatching::new(max_pickup_km)),
            MatchingPolicy::HighestRated => Arc::new(HighestRatedMatching::new(max_pickup_km)),
        }
    }
}

impl fmt::Display for MatchingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchingPolicy::Nearest => f.write_str("NEAREST"),
            MatchingPolicy::HighestRated => f.write_str("HIGHEST_RATED"),
        }
    }
}

impl FromStr for MatchingPolicy {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "NEAREST" => Ok(MatchingPolicy::Nearest),
            "HIGHEST_RATED" => Ok(MatchingPolicy::HighestRated),
            other => Err(DispatchError::Config(format!("unknown matching policy `{other}`"))),
        }
    }
}
