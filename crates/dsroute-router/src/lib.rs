//! dsroute Router - read/write data-source routing
//!
//! Directs each database operation to the primary or to one of the
//! replicas without the calling code naming a physical connection.
//!
//! # Architecture
//!
//! ```text
//! TransactionBoundary / explicit override
//!     │  set intent
//!     ▼
//! ┌─────────────────────────┐
//! │      RouteContext       │  One per unit of work (Read / Write / unset)
//! └───────────┬─────────────┘
//!             │  &RouteContext
//!             ▼
//! ┌─────────────────────────┐
//! │         Router          │  Unset → Write, Write → Primary
//! │   (Primary or replica?) │
//! └───────────┬─────────────┘
//!             │  Read
//!             ▼
//! ┌─────────────────────────┐
//! │     ReplicaSelector     │  Random / RoundRobin
//! │    (Which replica?)     │
//! └───────────┬─────────────┘
//!             │  TargetKey
//!             ▼
//! ┌─────────────────────────┐
//! │   DataSourceRegistry    │  Immutable after startup
//! └─────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use dsroute_router::{RouteContext, Router, RoutingConfig};
//!
//! let router = Router::from_config(&RoutingConfig::from_env()?)?;
//! let mut ctx = RouteContext::new();
//!
//! // Transaction-level intent
//! let mut unit = ctx.begin_unit_of_work(false);
//! let primary = router.resolve_data_source(&unit)?;
//!
//! // Method-level override, restored when the closure returns
//! let replica = unit.with_read_intent(|ctx| router.resolve_data_source(ctx))?;
//! unit.end();
//! ```

// Core modules
mod context;
mod selector;
mod unit_of_work;

// Strategy module (replica selection policies)
mod strategy;

// Router
mod router;

#[cfg(test)]
mod tests;

// Re-exports: Shared types
pub use dsroute_types::{
    RouteError, RouteIntent, RouteResult, SelectionPolicy, TargetKey, DEFAULT_INTENT, PRIMARY_NAME,
};

// Re-exports: Configuration and registry
pub use dsroute_core::{DataSource, DataSourceConfig, DataSourceRegistry, RoutingConfig};

// Re-exports: Route state
pub use context::{RouteContext, RouteOverride};
pub use unit_of_work::UnitOfWork;

// Re-exports: Replica selection
pub use selector::ReplicaSelector;
pub use strategy::{RandomStrategy, ReplicaStrategy, RoundRobinStrategy, ROUND_ROBIN_RESET_THRESHOLD};

// Re-exports: Router
pub use router::{RouteDecision, Router, RouterMetricsSnapshot};
