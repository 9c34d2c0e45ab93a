//! Router - turns a route context into a routing target
//!
//! # Decision
//!
//! ```text
//! ctx.get()
//!    │
//!    ├── None ─────────► Write (default) ──► Primary
//!    ├── Some(Write) ───────────────────────► Primary
//!    └── Some(Read) ───► ReplicaSelector::pick(registry.replicas())
//!                              │
//!                              ├── Ok(replica)
//!                              └── Err(Configuration)  (propagated, never
//!                                                       downgraded to Primary)
//! ```
//!
//! The router holds no per-unit state and is shared by every unit of work.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use dsroute_core::{DataSource, DataSourceRegistry, RoutingConfig};
use dsroute_types::{RouteIntent, RouteResult, SelectionPolicy, TargetKey, DEFAULT_INTENT};

use crate::context::RouteContext;
use crate::selector::ReplicaSelector;

/// Outcome of a single routing decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDecision {
    /// Execution unit the decision was made for
    pub unit_id: Uuid,

    /// Intent the decision was based on
    pub intent: RouteIntent,

    /// Whether `intent` is the default because none was set
    pub defaulted: bool,

    /// Resolved target
    pub target: TargetKey,
}

/// Read/write router over an immutable data-source registry
#[derive(Debug)]
pub struct Router {
    registry: Arc<DataSourceRegistry>,
    selector: ReplicaSelector,
    metrics: RouterMetrics,
}

impl Router {
    /// Create a router applying `policy` to the registry's replicas
    pub fn new(registry: Arc<DataSourceRegistry>, policy: SelectionPolicy) -> Self {
        Self::with_selector(registry, ReplicaSelector::new(policy))
    }

    /// Create a router with an explicit selector
    pub fn with_selector(registry: Arc<DataSourceRegistry>, selector: ReplicaSelector) -> Self {
        info!(
            policy = %selector.policy(),
            replicas = registry.replicas().len(),
            "Router created"
        );
        Self {
            registry,
            selector,
            metrics: RouterMetrics::default(),
        }
    }

    /// Build the registry from `config` and a router over it
    pub fn from_config(config: &RoutingConfig) -> RouteResult<Self> {
        let registry = Arc::new(DataSourceRegistry::from_config(config)?);
        Ok(Self::new(registry, config.policy))
    }

    /// Decide where the next operation of `ctx` goes
    pub fn decide(&self, ctx: &RouteContext) -> RouteResult<RouteDecision> {
        let (intent, defaulted) = match ctx.get() {
            Some(intent) => (intent, false),
            None => (DEFAULT_INTENT, true),
        };

        let target = match intent {
            RouteIntent::Write => TargetKey::Primary,
            RouteIntent::Read => match self.selector.pick(self.registry.replicas()) {
                Ok(replica) => replica,
                Err(e) => {
                    self.metrics.failed.fetch_add(1, Ordering::Relaxed);
                    warn!(unit_id = %ctx.unit_id(), error = %e, "Read routing failed");
                    return Err(e);
                }
            },
        };

        self.metrics.record(&target, defaulted);
        debug!(
            unit_id = %ctx.unit_id(),
            %intent,
            defaulted,
            target = %target,
            "Route decision"
        );

        Ok(RouteDecision {
            unit_id: ctx.unit_id(),
            intent,
            defaulted,
            target,
        })
    }

    /// Resolve the routing target for the next operation of `ctx`
    pub fn resolve(&self, ctx: &RouteContext) -> RouteResult<TargetKey> {
        self.decide(ctx).map(|decision| decision.target)
    }

    /// Resolve the data source the next operation of `ctx` must use
    pub fn resolve_data_source(&self, ctx: &RouteContext) -> RouteResult<Arc<DataSource>> {
        let target = self.resolve(ctx)?;
        self.registry.lookup(&target)
    }

    /// Registry this router reads from
    pub fn registry(&self) -> &DataSourceRegistry {
        &self.registry
    }

    /// Replica selection policy
    pub fn policy(&self) -> SelectionPolicy {
        self.selector.policy()
    }

    /// Snapshot of the routing counters
    pub fn metrics(&self) -> RouterMetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Routing counters
#[derive(Debug, Default)]
struct RouterMetrics {
    primary: AtomicU64,
    replica: AtomicU64,
    defaulted: AtomicU64,
    failed: AtomicU64,
}

impl RouterMetrics {
    fn record(&self, target: &TargetKey, defaulted: bool) {
        if target.is_primary() {
            self.primary.fetch_add(1, Ordering::Relaxed);
        } else {
            self.replica.fetch_add(1, Ordering::Relaxed);
        }
        if defaulted {
            self.defaulted.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn snapshot(&self) -> RouterMetricsSnapshot {
        RouterMetricsSnapshot {
            primary_routes: self.primary.load(Ordering::Relaxed),
            replica_routes: self.replica.load(Ordering::Relaxed),
            defaulted_routes: self.defaulted.load(Ordering::Relaxed),
            failed_routes: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Router metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouterMetricsSnapshot {
    /// Decisions that resolved to the primary
    pub primary_routes: u64,
    /// Decisions that resolved to a replica
    pub replica_routes: u64,
    /// Decisions made on the default intent
    pub defaulted_routes: u64,
    /// Decisions that failed with an error
    pub failed_routes: u64,
}
