//! dsroute Node - demo host service for the routing layer
//!
//! The node plays the role of the host application: every request is one
//! unit of work with its own [`RouteContext`], run as its own tokio task.
//! Read requests begin a read-only unit; a request may also carry a
//! forced intent, which is how an annotated "always primary" or "always
//! replica" method reaches the router.

use anyhow::Context;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use dsroute_router::{
    RouteContext, RouteIntent, RouteResult, Router, RouterMetricsSnapshot, RoutingConfig, TargetKey,
};

/// Kind of statement a request runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// SELECT-style statement, runs in a read-only unit of work
    Read,
    /// INSERT/UPDATE/DELETE-style statement
    Write,
}

/// One inbound request
#[derive(Debug, Clone)]
pub struct Request {
    /// Request identifier
    pub id: String,

    /// Table the statement touches
    pub table: String,

    /// Statement kind
    pub kind: QueryKind,

    /// Method-level override, if the handler forces a route
    pub forced: Option<RouteIntent>,
}

impl Request {
    pub fn read(id: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            table: table.into(),
            kind: QueryKind::Read,
            forced: None,
        }
    }

    pub fn write(id: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            table: table.into(),
            kind: QueryKind::Write,
            forced: None,
        }
    }

    /// Force a route regardless of the statement kind
    pub fn forced(mut self, intent: RouteIntent) -> Self {
        self.forced = Some(intent);
        self
    }
}

/// Where a request was executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Request identifier
    pub request_id: String,

    /// Unit of work the request ran in
    pub unit_id: Uuid,

    /// Resolved routing target
    pub target: TargetKey,

    /// URL of the data source that served the request
    pub url: String,
}

/// Demo routing node
#[derive(Debug, Clone)]
pub struct RoutingNode {
    router: Arc<Router>,
}

impl RoutingNode {
    /// Build the registry and router from `config`
    pub fn new(config: RoutingConfig) -> anyhow::Result<Self> {
        let router = Router::from_config(&config).context("failed to build data-source router")?;

        if !router.registry().has_replicas() {
            warn!("No replicas configured, read requests will fail");
        }

        info!(
            primary = %config.primary.url,
            replicas = config.replicas.len(),
            policy = %config.policy,
            "Creating routing node"
        );

        Ok(Self {
            router: Arc::new(router),
        })
    }

    /// Shared router
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Run one request as a unit of work
    pub async fn handle(&self, request: Request) -> RouteResult<Execution> {
        let mut ctx = RouteContext::new();
        let mut unit = ctx.begin_unit_of_work(request.kind == QueryKind::Read);

        let execution = match request.forced {
            Some(intent) => {
                let guard = unit.scoped(intent);
                self.execute(&guard, &request).await
            }
            None => self.execute(&unit, &request).await,
        };

        unit.end();
        execution
    }

    async fn execute(&self, ctx: &RouteContext, request: &Request) -> RouteResult<Execution> {
        let source = self.router.resolve_data_source(ctx)?;

        // Statement execution is delegated to the pool behind `source`
        tokio::task::yield_now().await;

        debug!(
            request_id = %request.id,
            table = %request.table,
            target = %source.key,
            "Request executed"
        );

        Ok(Execution {
            request_id: request.id.clone(),
            unit_id: ctx.unit_id(),
            target: source.key.clone(),
            url: source.url.clone(),
        })
    }

    /// Serve requests until the request channel closes
    ///
    /// Every request runs in its own task. Returns the router metrics once
    /// all in-flight requests have finished.
    pub async fn run(
        self,
        mut requests: mpsc::UnboundedReceiver<Request>,
        results: mpsc::UnboundedSender<RouteResult<Execution>>,
    ) -> RouterMetricsSnapshot {
        info!(policy = %self.router.policy(), "Routing node started");

        let mut in_flight = JoinSet::new();

        while let Some(request) = requests.recv().await {
            let node = self.clone();
            let results = results.clone();
            in_flight.spawn(async move {
                let outcome = node.handle(request).await;
                // Receiver may be gone during shutdown
                let _ = results.send(outcome);
            });
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "Request task failed");
            }
        }

        let metrics = self.router.metrics();
        info!(
            primary_routes = metrics.primary_routes,
            replica_routes = metrics.replica_routes,
            failed_routes = metrics.failed_routes,
            "Routing node stopped"
        );
        metrics
    }
}
