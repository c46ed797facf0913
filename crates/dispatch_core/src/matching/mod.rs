pub mod algorithm;
pub mod highest_rated;
pub mod nearest;
pub mod policy;
pub mod types;

pub use algorithm::{candidates_near, eligible_candidates, MatchingStrategy, DEFAULT_MAX_PICKUP_KM};
pub use highest_rated::HighestRatedMatching;
pub use nearest::NearestMatching;
pub use policy::MatchingPolicy;
pub use types::{MatchCandidate, NearbyDriver};
