//! dsroute types - shared vocabulary of the routing layer
//!
//! These types are used by the configuration layer, the registry and the
//! router. They carry no behaviour beyond parsing and formatting.

// ========== Core Modules ==========
pub mod intent;
pub mod policy;
pub mod target;

// Export commonly used types
pub use intent::{RouteIntent, DEFAULT_INTENT};
pub use policy::SelectionPolicy;
pub use target::{TargetKey, PRIMARY_NAME};

// Error types
pub type RouteResult<T> = Result<T, RouteError>;

/// Routing errors
///
/// Every variant is configuration-class: none of them is transient, so
/// nothing in the routing layer retries on them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// Replica routing requested against an empty or unregistered replica
    /// set, or the configuration itself is invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The registry was asked for a target it never registered
    #[error("Unknown target: {0}")]
    UnknownTarget(TargetKey),
}

impl RouteError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether the error is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
