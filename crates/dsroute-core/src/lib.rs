//! dsroute Core - configuration and data-source registry
//!
//! This crate provides the startup half of the routing layer: reading the
//! routing configuration and building the immutable registry that owns
//! every connection-factory handle.

pub mod config;
pub mod registry;

pub use config::{DataSourceConfig, RoutingConfig};
pub use registry::{DataSource, DataSourceRegistry};
