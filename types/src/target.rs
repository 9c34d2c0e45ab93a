//! Resolved routing targets

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved name of the primary data source
pub const PRIMARY_NAME: &str = "primary";

/// Concrete destination of a routed operation
///
/// `Replica` names are drawn from the replica set configured at startup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKey {
    /// The single writable store of record
    Primary,
    /// A read-only replica, by configured name
    Replica(String),
}

impl TargetKey {
    /// Create a replica key
    pub fn replica(name: impl Into<String>) -> Self {
        Self::Replica(name.into())
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, Self::Primary)
    }

    pub fn is_replica(&self) -> bool {
        matches!(self, Self::Replica(_))
    }

    /// Data-source name this key refers to
    pub fn name(&self) -> &str {
        match self {
            Self::Primary => PRIMARY_NAME,
            Self::Replica(name) => name,
        }
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKey::Primary => write!(f, "{}", PRIMARY_NAME),
            TargetKey::Replica(name) => write!(f, "replica:{}", name),
        }
    }
}
