//! Per-replica observability: replica listing, readiness issues and
//! termination records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::common::{lenient_enum, AsResourceId, Metadata};
use crate::error::{Error, Result};

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaStatus {
    pub public_ip: Option<String>,
    pub node_id: Option<String>,
    pub state: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replica {
    pub metadata: Metadata,
    pub status: Option<ReplicaStatus>,
}

impl AsResourceId for Replica {
    fn resource_id(&self) -> Result<&str> {
        self.metadata
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::validation("replica has no metadata id"))
    }
}

lenient_enum! {
    pub enum ReadinessReason {
        Ready => "Ready",
        InProgress => "InProgress",
        NoCapacity => "NoCapacity",
        UserCodeError => "UserCodeError",
        SystemError => "SystemError",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessIssueEntry {
    pub reason: ReadinessReason,
    #[serde(default)]
    pub message: String,
}

/// Replica id to the issues blocking its readiness.
pub type ReadinessIssue = BTreeMap<String, Vec<ReadinessIssueEntry>>;

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaTermination {
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,
    pub exit_code: Option<i32>,
    pub reason: Option<String>,
    pub message: Option<String>,
}

/// Replica id to its past terminations, oldest first.
pub type DeploymentTerminations = BTreeMap<String, Vec<ReplicaTermination>>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_readiness_map() {
        let issue: ReadinessIssue = serde_json::from_value(json!({
            "web-abc": [{"reason": "NoCapacity", "message": "no gpu"}],
            "web-def": [{"reason": "Sleeping", "message": ""}]
        }))
        .unwrap();
        assert_eq!(issue["web-abc"][0].reason, ReadinessReason::NoCapacity);
        assert_eq!(issue["web-def"][0].reason, ReadinessReason::Unknown);
    }

    #[test]
    fn test_terminations_map() {
        let t: DeploymentTerminations = serde_json::from_value(json!({
            "web-abc": [{"exit_code": 137, "reason": "OOMKilled"}]
        }))
        .unwrap();
        assert_eq!(t["web-abc"][0].exit_code, Some(137));
    }
}
