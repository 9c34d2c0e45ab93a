//! Round-robin replica selection
//!
//! A shared counter is incremented before every pick and the replica is
//! `replicas[counter % len]`, so a fresh selector starts at index 1.
//!
//! # Counter reset
//!
//! The counter is reset to zero once it reaches
//! [`ROUND_ROBIN_RESET_THRESHOLD`]. The reset is check-lock-check: every
//! caller that observes the threshold takes the reset lock and re-reads
//! the counter, so only the first one resets and a caller that arrives
//! after the reset leaves the fresh counter alone.
//!
//! ```text
//! fetch_add(1) ──► value < threshold ──────────────► index = value % len
//!        │
//!        └──► value >= threshold ──► lock ──► still >= threshold? ──► store(0)
//! ```
//!
//! The threshold sits half way through the `u64` range, so concurrent
//! increments racing the reset can never get near overflow. The atomic
//! add itself wraps, so even a counter seeded past the threshold cannot
//! panic.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

use dsroute_types::{RouteResult, TargetKey};

use super::{no_replicas, ReplicaStrategy};

/// Counter value at which the round-robin counter is reset to zero
pub const ROUND_ROBIN_RESET_THRESHOLD: u64 = u64::MAX / 2;

/// Cycles through replicas in configured order
#[derive(Debug)]
pub struct RoundRobinStrategy {
    /// Shared monotonic counter
    counter: AtomicU64,
    /// Serializes counter resets
    reset_lock: Mutex<()>,
}

impl RoundRobinStrategy {
    /// Create a strategy with the counter at zero
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create a strategy with the counter at `value`
    pub fn starting_at(value: u64) -> Self {
        Self {
            counter: AtomicU64::new(value),
            reset_lock: Mutex::new(()),
        }
    }

    /// Current counter value
    pub fn counter(&self) -> u64 {
        self.counter.load(Ordering::Acquire)
    }

    /// Advance the counter, returning the post-increment value
    fn advance(&self) -> u64 {
        let value = self.counter.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        if value >= ROUND_ROBIN_RESET_THRESHOLD {
            self.reset_if_exhausted();
        }
        value
    }

    fn reset_if_exhausted(&self) {
        let _guard = self.reset_lock.lock();
        // Another caller may have reset while we waited for the lock
        let current = self.counter.load(Ordering::Acquire);
        if current >= ROUND_ROBIN_RESET_THRESHOLD {
            self.counter.store(0, Ordering::Release);
            debug!(counter = current, "Round-robin counter reset");
        }
    }
}

impl Default for RoundRobinStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplicaStrategy for RoundRobinStrategy {
    fn select(&self, replicas: &[TargetKey]) -> RouteResult<TargetKey> {
        if replicas.is_empty() {
            return Err(no_replicas());
        }

        let value = self.advance();
        let index = (value % replicas.len() as u64) as usize;
        trace!(counter = value, index, replica = %replicas[index], "Selected replica round-robin");
        Ok(replicas[index].clone())
    }

    fn name(&self) -> &'static str {
        "RoundRobin"
    }
}
