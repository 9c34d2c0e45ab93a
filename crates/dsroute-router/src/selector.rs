//! Replica selector - applies the configured policy to a replica list

use std::fmt;
use tracing::trace;

use dsroute_types::{RouteResult, SelectionPolicy, TargetKey};

use crate::strategy::{RandomStrategy, ReplicaStrategy, RoundRobinStrategy};

/// Picks one replica according to a policy fixed at construction
pub struct ReplicaSelector {
    policy: SelectionPolicy,
    strategy: Box<dyn ReplicaStrategy>,
}

impl ReplicaSelector {
    /// Create a selector for `policy`
    pub fn new(policy: SelectionPolicy) -> Self {
        let strategy: Box<dyn ReplicaStrategy> = match policy {
            SelectionPolicy::Random => Box::new(RandomStrategy::new()),
            SelectionPolicy::RoundRobin => Box::new(RoundRobinStrategy::new()),
        };
        Self { policy, strategy }
    }

    /// Round-robin selector whose counter starts at `counter`
    pub fn round_robin_starting_at(counter: u64) -> Self {
        Self {
            policy: SelectionPolicy::RoundRobin,
            strategy: Box::new(RoundRobinStrategy::starting_at(counter)),
        }
    }

    /// Pick one replica from `replicas`
    ///
    /// Fails with a configuration error when `replicas` is empty; the
    /// primary is never returned as a substitute.
    pub fn pick(&self, replicas: &[TargetKey]) -> RouteResult<TargetKey> {
        let picked = self.strategy.select(replicas)?;
        trace!(strategy = self.strategy.name(), replica = %picked, "Replica picked");
        Ok(picked)
    }

    /// Policy this selector applies
    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }
}

impl Default for ReplicaSelector {
    fn default() -> Self {
        Self::new(SelectionPolicy::default())
    }
}

impl fmt::Debug for ReplicaSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplicaSelector")
            .field("policy", &self.policy)
            .field("strategy", &self.strategy.name())
            .finish()
    }
}
