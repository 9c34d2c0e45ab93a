//! Replica selection policy

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::RouteError;

/// How a replica is picked when a read is routed away from the primary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Uniformly random replica on every pick
    Random,
    /// Cycle through replicas in configured order (default)
    #[default]
    RoundRobin,
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionPolicy::Random => write!(f, "random"),
            SelectionPolicy::RoundRobin => write!(f, "round-robin"),
        }
    }
}

impl FromStr for SelectionPolicy {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "round-robin" | "round_robin" | "roundrobin" => Ok(Self::RoundRobin),
            other => Err(RouteError::configuration(format!(
                "unknown replica selection policy '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_policy() {
        assert_eq!("random".parse::<SelectionPolicy>().unwrap(), SelectionPolicy::Random);
        assert_eq!("round-robin".parse::<SelectionPolicy>().unwrap(), SelectionPolicy::RoundRobin);
        assert_eq!(" Round_Robin ".parse::<SelectionPolicy>().unwrap(), SelectionPolicy::RoundRobin);
    }

    #[test]
    fn test_parse_unknown_policy() {
        let err = "least-loaded".parse::<SelectionPolicy>().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_policy_serde_names() {
        let json = serde_json::to_string(&SelectionPolicy::RoundRobin).unwrap();
        assert_eq!(json, r#""round-robin""#);
        assert_eq!(SelectionPolicy::Random.to_string(), "random");
    }
}
