//! Data-source registry - owns every connection-factory handle
//!
//! Built once at process start from [`RoutingConfig`] and never mutated
//! afterwards, so lookups take no lock. The router and replica selector
//! only ever read from it.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

use dsroute_types::{RouteError, RouteResult, TargetKey, PRIMARY_NAME};

use crate::config::{DataSourceConfig, RoutingConfig};

/// Connection-factory handle for one physical data source
///
/// Pool construction (driver, credentials, sizing) is delegated to the
/// underlying pool; this handle carries what that pool needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSource {
    /// Routing target served by this data source
    pub key: TargetKey,

    /// Connection URL
    pub url: String,

    /// Pool size hint
    pub max_connections: u32,
}

impl DataSource {
    fn from_config(key: TargetKey, config: &DataSourceConfig) -> Self {
        Self {
            key,
            url: config.url.clone(),
            max_connections: config.max_connections,
        }
    }
}

/// Immutable mapping from routing target to data source
#[derive(Debug)]
pub struct DataSourceRegistry {
    /// Primary data source
    primary: Arc<DataSource>,

    /// All registered data sources, primary included
    sources: HashMap<TargetKey, Arc<DataSource>>,

    /// Replica keys in configured order
    replicas: Vec<TargetKey>,
}

impl DataSourceRegistry {
    /// Build and validate the registry
    ///
    /// Rejects empty URLs, a primary not named `primary`, empty or
    /// duplicate replica names and replicas that claim the primary name.
    pub fn from_config(config: &RoutingConfig) -> RouteResult<Self> {
        if !config.primary.name.trim().eq_ignore_ascii_case(PRIMARY_NAME) {
            return Err(RouteError::configuration(format!(
                "primary data source must be named '{}', got '{}'",
                PRIMARY_NAME, config.primary.name
            )));
        }
        validate_url(PRIMARY_NAME, &config.primary.url)?;

        let primary = Arc::new(DataSource::from_config(TargetKey::Primary, &config.primary));
        let mut sources = HashMap::with_capacity(config.replicas.len() + 1);
        sources.insert(TargetKey::Primary, Arc::clone(&primary));

        let mut seen = HashSet::new();
        let mut replicas = Vec::with_capacity(config.replicas.len());

        for replica in &config.replicas {
            let name = replica.name.trim();
            if name.is_empty() {
                return Err(RouteError::configuration("replica name cannot be empty"));
            }
            if name.eq_ignore_ascii_case(PRIMARY_NAME) {
                return Err(RouteError::configuration(format!(
                    "replica name '{}' is reserved",
                    name
                )));
            }
            if !seen.insert(name.to_string()) {
                return Err(RouteError::configuration(format!(
                    "duplicate replica name '{}'",
                    name
                )));
            }
            validate_url(name, &replica.url)?;

            let key = TargetKey::replica(name);
            debug!(replica = %name, url = %replica.url, "Registering replica data source");
            sources.insert(key.clone(), Arc::new(DataSource::from_config(key.clone(), replica)));
            replicas.push(key);
        }

        info!(
            primary = %config.primary.url,
            replicas = replicas.len(),
            "Data-source registry built"
        );

        Ok(Self {
            primary,
            sources,
            replicas,
        })
    }

    /// Look up the data source registered for `key`
    pub fn lookup(&self, key: &TargetKey) -> RouteResult<Arc<DataSource>> {
        self.sources
            .get(key)
            .cloned()
            .ok_or_else(|| RouteError::UnknownTarget(key.clone()))
    }

    /// Primary data source
    pub fn primary(&self) -> Arc<DataSource> {
        Arc::clone(&self.primary)
    }

    /// Replica keys in configured order
    pub fn replicas(&self) -> &[TargetKey] {
        &self.replicas
    }

    pub fn has_replicas(&self) -> bool {
        !self.replicas.is_empty()
    }

    /// Number of registered data sources, primary included
    pub fn count(&self) -> usize {
        self.sources.len()
    }
}

fn validate_url(name: &str, url: &str) -> RouteResult<()> {
    if url.trim().is_empty() {
        return Err(RouteError::configuration(format!(
            "data source '{}' has an empty url",
            name
        )));
    }
    Ok(())
}
