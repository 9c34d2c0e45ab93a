//! Declared route intent
//!
//! Intent is what the caller wants to do (read or write), not where the
//! operation ends up. The router turns an intent into a [`TargetKey`].
//!
//! [`TargetKey`]: crate::TargetKey

use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller's declared purpose for upcoming operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteIntent {
    /// READ_INTENT: may be served by a replica
    Read,
    /// WRITE_INTENT: must be served by the primary
    Write,
}

/// Intent applied when nobody expressed one.
///
/// Fixed to `Write` so an un-instrumented code path never reads stale
/// replica data. Not configurable.
pub const DEFAULT_INTENT: RouteIntent = RouteIntent::Write;

impl RouteIntent {
    /// Intent of a unit of work with the given read-only flag
    pub fn from_read_only(read_only: bool) -> Self {
        if read_only {
            Self::Read
        } else {
            Self::Write
        }
    }

    pub fn is_read(&self) -> bool {
        matches!(self, Self::Read)
    }
}

impl fmt::Display for RouteIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteIntent::Read => write!(f, "read"),
            RouteIntent::Write => write!(f, "write"),
        }
    }
}
