//! dsroute Node - Main entry point

use anyhow::Context;
use dsroute_node::{Request, RoutingNode};
use dsroute_router::{RouteIntent, RoutingConfig};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration from environment
    let config = RoutingConfig::from_env().context("invalid routing configuration")?;

    let node = RoutingNode::new(config)?;

    // Create request and result channels
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (result_tx, mut result_rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(node.run(request_rx, result_tx));

    // Short burst of mixed traffic
    for i in 0..12 {
        let request = match i % 4 {
            0 => Request::write(format!("req-{}", i), "orders"),
            1 | 2 => Request::read(format!("req-{}", i), "orders"),
            _ => Request::read(format!("req-{}", i), "inventory").forced(RouteIntent::Write),
        };
        request_tx.send(request).context("routing node stopped early")?;
    }
    drop(request_tx);

    while let Some(outcome) = result_rx.recv().await {
        match outcome {
            Ok(execution) => info!(
                request_id = %execution.request_id,
                unit_id = %execution.unit_id,
                target = %execution.target,
                url = %execution.url,
                "Request routed"
            ),
            Err(e) => warn!(error = %e, "Request rejected"),
        }
    }

    let metrics = handle.await.context("routing node task failed")?;
    info!(?metrics, "Done");

    Ok(())
}
