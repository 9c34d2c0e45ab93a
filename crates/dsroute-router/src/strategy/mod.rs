//! Replica Selection Strategies
//!
//! - `RandomStrategy`: uniform pick on every call, no state
//! - `RoundRobinStrategy`: cycles through replicas with a shared counter
//!
//! Both pick from the ordered replica list held by the registry; neither
//! ever falls back to the primary.

mod random;
mod round_robin;

pub use random::RandomStrategy;
pub use round_robin::{RoundRobinStrategy, ROUND_ROBIN_RESET_THRESHOLD};

use dsroute_types::{RouteError, RouteResult, TargetKey};

/// Trait for replica selection strategies
pub trait ReplicaStrategy: Send + Sync {
    /// Select one replica from a non-empty, ordered replica list
    fn select(&self, replicas: &[TargetKey]) -> RouteResult<TargetKey>;

    /// Strategy name for logging
    fn name(&self) -> &'static str;
}

/// Error returned when a pick is attempted against no replicas
pub(crate) fn no_replicas() -> RouteError {
    RouteError::configuration("replica routing requested but no replicas are configured")
}
