use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::common::{lenient_enum, AsResourceId, Metadata};
use crate::error::{Error, Result};

lenient_enum! {
    pub enum VolumeFrom {
        Local => "local",
        Remote => "remote",
    }
}

lenient_enum! {
    pub enum AllocationMode {
        Auto => "auto",
        Static => "static",
    }
}

lenient_enum! {
    pub enum NodeGroupOwner {
        Customer => "customer",
        Lepton => "lepton",
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMountOptions {
    pub mount_workload_type: Option<String>,
    pub host_mount_cache_group_net_if: Option<String>,
    pub host_mount_target_cache_disk_num: Option<i64>,
    pub host_mount_cache_size_in_mib: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub from: VolumeFrom,
    pub name: String,
    pub size_in_gb: i64,
    pub mount_options: Option<VolumeMountOptions>,
    pub creation_mode: Option<String>,
    pub from_path: Option<String>,
    pub default_mount_path: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfiguration {
    pub external_endpoint_subdomain: Option<String>,
    pub public_net_interfaces: Option<Vec<String>>,
    pub private_net_interfaces: Option<Vec<String>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedicatedNodeGroupSpec {
    pub workspaces: Option<Vec<String>>,
    pub volumes: Option<Vec<Volume>>,
    #[serde(default)]
    pub allocation_mode: AllocationMode,
    pub infini_band_enabled: Option<bool>,
    pub owner: Option<NodeGroupOwner>,
    pub networking: Option<NetworkConfiguration>,
    pub gpu_product: Option<String>,
    pub desired_nodes: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedicatedNodeGroupStatus {
    #[serde(default)]
    pub ready_nodes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedicatedNodeGroup {
    pub metadata: Metadata,
    pub spec: DedicatedNodeGroupSpec,
    #[serde(default)]
    pub status: DedicatedNodeGroupStatus,
}

impl AsResourceId for DedicatedNodeGroup {
    fn resource_id(&self) -> Result<&str> {
        self.metadata
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::validation("node group has no metadata id"))
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeResourceCpu {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub allocated: Option<f64>,
    pub total: Option<f64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeResourceMemory {
    pub allocated: Option<i64>,
    pub total: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeResourceGpu {
    pub product: Option<String>,
    pub allocated: Option<f64>,
    pub total: Option<f64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeResourceSystem {
    pub os: Option<String>,
    pub kernel_version: Option<String>,
    pub cuda_version: Option<String>,
    pub cuda_driver_version: Option<String>,
}

/// A workload currently placed on a node.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeWorkload {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub id: String,
    pub replica_id: String,
    pub workspace: String,
    pub cpu: Option<f64>,
    pub memory: Option<i64>,
    pub gpu_count: Option<f64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeResource {
    pub cpu: Option<NodeResourceCpu>,
    pub gpu: Option<NodeResourceGpu>,
    pub memory: Option<NodeResourceMemory>,
    pub system: Option<NodeResourceSystem>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub dedicated_node_group: Option<String>,
    pub public_op: Option<String>,
    pub resource: Option<NodeResource>,
    #[serde(default)]
    pub unschedulable: bool,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub status: Option<Vec<String>>,
    pub workloads: Option<Vec<NodeWorkload>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub metadata: Metadata,
    pub spec: NodeSpec,
    pub status: Option<NodeStatus>,
}

impl Node {
    /// Schedulable and running no workloads.
    pub fn is_idle(&self) -> bool {
        !self.spec.unschedulable
            && self
                .status
                .as_ref()
                .and_then(|s| s.workloads.as_ref())
                .map_or(true, |w| w.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_idle() {
        let busy: Node = serde_json::from_value(json!({
            "metadata": {"id": "n1"},
            "spec": {"unschedulable": false},
            "status": {"workloads": [{
                "type": "deployment", "name": "web", "id": "web",
                "replica_id": "r1", "workspace": "ws"
            }]}
        }))
        .unwrap();
        assert!(!busy.is_idle());

        let idle: Node =
            serde_json::from_value(json!({"metadata": {"id": "n2"}, "spec": {}})).unwrap();
        assert!(idle.is_idle());
    }

    #[test]
    fn test_node_group_unknown_owner() {
        let group: DedicatedNodeGroup = serde_json::from_value(json!({
            "metadata": {"id": "h100"},
            "spec": {"allocation_mode": "auto", "owner": "someone-else"},
            "status": {"ready_nodes": 4}
        }))
        .unwrap();
        assert_eq!(group.spec.allocation_mode, AllocationMode::Auto);
        assert_eq!(group.spec.owner, Some(NodeGroupOwner::Unknown));
        assert_eq!(group.status.ready_nodes, 4);
    }
}
