use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::common::lenient_enum;

lenient_enum! {
    pub enum WorkspaceState {
        Normal => "normal",
        Paused => "paused",
        Terminated => "terminated",
    }
}

lenient_enum! {
    pub enum WorkspaceTier {
        Basic => "basic",
        Standard => "standard",
        Enterprise => "enterprise",
    }
}

/// Workspace-wide resource ceilings. Unset means unlimited.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceQuota {
    pub max_deployments: Option<i64>,
    pub max_jobs: Option<i64>,
    pub max_pods: Option<i64>,
    pub max_photons: Option<i64>,
    pub max_storage_in_gb: Option<i64>,
    pub max_cpu: Option<f64>,
    pub max_memory_in_mb: Option<i64>,
    pub max_accelerators: Option<f64>,
}

/// Result of `GET /workspace`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    #[serde(default)]
    pub build_time: String,
    /// Server version; a semver string on release builds
    #[serde(default)]
    pub git_commit: String,
    pub workspace_name: Option<String>,
    pub workspace_state: Option<WorkspaceState>,
    pub workspace_tier: Option<WorkspaceTier>,
    pub workspace_quota: Option<WorkspaceQuota>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_workspace_info_parse() {
        let info: WorkspaceInfo = serde_json::from_value(json!({
            "build_time": "2024-05-01",
            "git_commit": "0.26.3",
            "workspace_name": "prod",
            "workspace_state": "normal",
            "workspace_tier": "platinum",
            "workspace_quota": {"max_deployments": 10}
        }))
        .unwrap();
        assert_eq!(info.workspace_state, Some(WorkspaceState::Normal));
        assert_eq!(info.workspace_tier, Some(WorkspaceTier::Unknown));
        assert_eq!(info.workspace_quota.unwrap().max_deployments, Some(10));
    }
}
