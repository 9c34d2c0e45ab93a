//! Uniform random replica selection

use rand::Rng;
use tracing::trace;

use dsroute_types::{RouteResult, TargetKey};

use super::{no_replicas, ReplicaStrategy};

/// Picks a uniformly random replica on every call
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomStrategy;

impl RandomStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl ReplicaStrategy for RandomStrategy {
    fn select(&self, replicas: &[TargetKey]) -> RouteResult<TargetKey> {
        if replicas.is_empty() {
            return Err(no_replicas());
        }

        let index = rand::thread_rng().gen_range(0..replicas.len());
        trace!(index, replica = %replicas[index], "Selected replica at random");
        Ok(replicas[index].clone())
    }

    fn name(&self) -> &'static str {
        "Random"
    }
}
