use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::affinity::ResourceAffinity;
use super::common::{impl_resource_id_from_metadata, lenient_enum, Metadata, UserSecurityContext, Validate};
use super::deployment::{validate_replicas, EnvVar, Mount, QueueConfig, ReservationConfig};
use crate::error::Result;

/// Resource shape shared by the head group and every worker group.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RayGroupSpec {
    pub accelerator_fraction: Option<f64>,
    pub accelerator_memory: Option<i64>,
    pub accelerator_num: Option<f64>,
    pub accelerator_pass_all: Option<bool>,
    pub accelerator_type: Option<String>,
    pub affinity: Option<ResourceAffinity>,
    pub cpu: Option<f64>,
    pub memory: Option<i64>,
    pub ephemeral_storage_in_gb: Option<i64>,
    pub shared_memory_size: Option<i64>,
    pub host_network: Option<bool>,
    pub enable_rdma: Option<bool>,
    pub is_adaptive: Option<bool>,
    pub min_replicas: Option<i64>,
    pub max_replicas: Option<i64>,
    pub resource_shape: Option<String>,
    pub envs: Option<Vec<EnvVar>>,
    pub mounts: Option<Vec<Mount>>,
    pub queue_config: Option<QueueConfig>,
    pub user_security_context: Option<UserSecurityContext>,
    pub reservation_config: Option<ReservationConfig>,
}

impl Validate for RayGroupSpec {
    fn validate(&self) -> Result<()> {
        validate_replicas(self.min_replicas, self.max_replicas)?;
        self.envs.validate()
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RayWorkerGroupSpec {
    pub group_name: Option<String>,
    #[serde(flatten)]
    pub group: RayGroupSpec,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RayAutoscaler {
    /// Seconds before an idle worker is removed
    pub ray_worker_idle_timeout: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RayHeadInfo {
    #[serde(rename = "podIP")]
    pub pod_ip: Option<String>,
    pub pod_name: Option<String>,
    #[serde(rename = "serviceIP")]
    pub service_ip: Option<String>,
    pub service_name: Option<String>,
}

/// Kubernetes-style condition reported by the Ray operator.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RayCondition {
    pub last_transition_time: String,
    pub message: String,
    pub reason: String,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub observed_generation: Option<i64>,
}

lenient_enum! {
    pub enum RayClusterState {
        Ready => "Ready",
        NotReady => "Not Ready",
        Starting => "Starting",
        Deleting => "Deleting",
        Scaling => "Scaling",
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RayClusterUserSpec {
    pub image: Option<String>,
    pub image_pull_secrets: Option<Vec<String>>,
    pub ray_version: Option<String>,
    pub suspend: Option<bool>,
    pub head_group_spec: Option<RayGroupSpec>,
    pub worker_group_specs: Option<Vec<RayWorkerGroupSpec>>,
    pub autoscaler: Option<RayAutoscaler>,
}

impl Validate for RayClusterUserSpec {
    fn validate(&self) -> Result<()> {
        self.head_group_spec.validate()?;
        if let Some(workers) = &self.worker_group_specs {
            for worker in workers {
                worker.group.validate()?;
            }
        }
        Ok(())
    }
}

/// Observed cluster status. Quantities are strings because the operator
/// reports Kubernetes int-or-string values.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RayClusterStatus {
    #[serde(rename = "desiredCPU")]
    pub desired_cpu: Option<String>,
    #[serde(rename = "desiredGPU")]
    pub desired_gpu: Option<String>,
    pub desired_memory: Option<String>,
    pub available_worker_replicas: Option<i64>,
    pub desired_worker_replicas: Option<i64>,
    pub max_worker_replicas: Option<i64>,
    pub min_worker_replicas: Option<i64>,
    pub ready_worker_replicas: Option<i64>,
    pub endpoints: Option<BTreeMap<String, String>>,
    pub head: Option<RayHeadInfo>,
    pub last_update_time: Option<String>,
    pub observed_generation: Option<i64>,
    pub state: RayClusterState,
    pub conditions: Option<Vec<RayCondition>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RayCluster {
    pub metadata: Option<Metadata>,
    pub spec: Option<RayClusterUserSpec>,
    pub status: Option<RayClusterStatus>,
}

impl RayCluster {
    pub fn state(&self) -> RayClusterState {
        self.status.as_ref().map(|s| s.state).unwrap_or_default()
    }
}

impl Validate for RayCluster {
    fn validate(&self) -> Result<()> {
        self.spec.validate()
    }
}

impl_resource_id_from_metadata!(RayCluster => "ray cluster");
