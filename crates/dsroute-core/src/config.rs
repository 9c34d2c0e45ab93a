//! Routing configuration, read once at startup

use serde::{Deserialize, Serialize};

use dsroute_types::{RouteError, RouteResult, SelectionPolicy, PRIMARY_NAME};

/// Default connection limit per data source
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Primary (writable) data source
    pub primary: DataSourceConfig,

    /// Replica data sources, in selection order
    #[serde(default)]
    pub replicas: Vec<DataSourceConfig>,

    /// Replica selection policy
    #[serde(default)]
    pub policy: SelectionPolicy,
}

/// Connection descriptor for one data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceConfig {
    /// Data-source name: `primary` for the primary, replica names become
    /// routing targets
    pub name: String,

    /// Connection URL handed to the underlying pool
    pub url: String,

    /// Pool size hint for the underlying pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

impl DataSourceConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Set max connections
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            primary: DataSourceConfig::new(PRIMARY_NAME, "postgres://127.0.0.1:5432/app"),
            replicas: vec![],
            policy: SelectionPolicy::default(),
        }
    }
}

impl RoutingConfig {
    /// Create a config with a primary and no replicas
    pub fn new(primary: DataSourceConfig) -> Self {
        Self {
            primary,
            ..Self::default()
        }
    }

    /// Add a replica
    pub fn with_replica(mut self, replica: DataSourceConfig) -> Self {
        self.replicas.push(replica);
        self
    }

    /// Set the selection policy
    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Parse configuration from a JSON document
    pub fn from_json(json: &str) -> RouteResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| RouteError::configuration(format!("invalid routing config: {}", e)))
    }

    /// Load configuration from environment variables
    ///
    /// - `DSROUTE_PRIMARY_URL`: primary connection URL
    /// - `DSROUTE_REPLICAS`: comma separated `name=url` pairs
    /// - `DSROUTE_POLICY`: `random` or `round-robin`
    /// - `DSROUTE_MAX_CONNECTIONS`: pool size hint applied to every data source
    pub fn from_env() -> RouteResult<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> RouteResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = RoutingConfig::default();

        if let Some(url) = lookup("DSROUTE_PRIMARY_URL") {
            config.primary.url = url;
        }

        if let Some(replicas) = lookup("DSROUTE_REPLICAS") {
            config.replicas = replicas
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(parse_replica_entry)
                .collect::<RouteResult<Vec<_>>>()?;
        }

        if let Some(policy) = lookup("DSROUTE_POLICY") {
            config.policy = policy.parse()?;
        }

        if let Some(max) = lookup("DSROUTE_MAX_CONNECTIONS") {
            let max: u32 = max.trim().parse().map_err(|_| {
                RouteError::configuration(format!("invalid DSROUTE_MAX_CONNECTIONS '{}'", max))
            })?;
            config.primary.max_connections = max;
            for replica in &mut config.replicas {
                replica.max_connections = max;
            }
        }

        Ok(config)
    }
}

/// Parse one `name=url` replica entry
fn parse_replica_entry(entry: &str) -> RouteResult<DataSourceConfig> {
    match entry.split_once('=') {
        Some((name, url)) if !name.trim().is_empty() && !url.trim().is_empty() => {
            Ok(DataSourceConfig::new(name.trim(), url.trim()))
        }
        _ => Err(RouteError::configuration(format!(
            "malformed replica entry '{}', expected name=url",
            entry
        ))),
    }
}
