//! Typed wire models for the workspace API.
//!
//! Every model follows the same rules:
//!
//! - optional fields are `Option<T>` and are omitted from the JSON when unset
//! - state enums degrade unknown server values to `Unknown` and warn once
//!   per enum type per process
//! - cross-field rules live in [`Validate`] impls, which facades run before
//!   any request leaves the process
//!
//! ```ignore
//! use lepton::types::{Deployment, DeploymentUserSpec, EnvVar, Validate};
//!
//! let spec = DeploymentUserSpec {
//!     photon_id: Some("my-photon-abc".into()),
//!     envs: Some(vec![EnvVar::secret("HF_TOKEN", "hf-token")]),
//!     ..Default::default()
//! };
//! let deployment = Deployment::new("web", spec);
//! deployment.validate()?;
//! ```

pub(crate) mod common;

mod affinity;
mod deployment;
mod events;
mod finetune;
mod ingress;
mod job;
mod kv;
mod nodegroup;
mod photon;
mod raycluster;
mod replica;
mod secret;
mod storage;
mod template;
mod workspace;

pub use self::affinity::ResourceAffinity;
pub use self::common::{AsResourceId, Metadata, UserSecurityContext, Validate};
pub use self::deployment::{
    AutoScaler, AutoScalerStatus, AutoscalerCondition, AutoscalerTargetThroughput, Container,
    ContainerPort, Deployment, DeploymentEndpoint, DeploymentState, DeploymentStatus,
    DeploymentUserSpec, EnvValue, EnvVar, HealthCheck, HealthCheckLiveness, HealthCheckReadiness,
    HealthCheckTcp, LogConfig, Metrics, Mount, MountOptions, Protocol, QueueConfig,
    ReservationConfig, ResourceRequirement, RoutingPolicy, ScaleDown, TokenValue, TokenVar,
};
pub use self::events::{EventType, WorkloadEvent};
pub use self::finetune::{
    CheckpointInfo, FineTuneJob, FineTuneJobSpec, FineTuneJobStatus, FineTuneModelInfo,
    TrainerConfig, TrainerInfo,
};
pub use self::ingress::{Ingress, IngressEndpoint, IngressSpec, IngressStatus};
pub use self::job::{Job, JobQueryMode, JobState, JobStatus, JobUserSpec};
pub use self::kv::{CoordinationState, KvNamespace, PartialKeyList, QueueInfo, QueueLength, QueueMessage};
pub use self::nodegroup::{
    AllocationMode, DedicatedNodeGroup, DedicatedNodeGroupSpec, DedicatedNodeGroupStatus,
    NetworkConfiguration, Node, NodeGroupOwner, NodeResource, NodeResourceCpu, NodeResourceGpu,
    NodeResourceMemory, NodeResourceSystem, NodeSpec, NodeStatus, NodeWorkload, Volume,
    VolumeFrom, VolumeMountOptions,
};
pub use self::photon::{
    validate_photon_name, Photon, PhotonDeploymentTemplate, PHOTON_NAME_MAX_LEN,
};
pub use self::raycluster::{
    RayAutoscaler, RayCluster, RayClusterState, RayClusterStatus, RayClusterUserSpec,
    RayCondition, RayGroupSpec, RayHeadInfo, RayWorkerGroupSpec,
};
pub use self::replica::{
    DeploymentTerminations, ReadinessIssue, ReadinessIssueEntry, ReadinessReason, Replica,
    ReplicaStatus, ReplicaTermination,
};
pub use self::secret::SecretItem;
pub use self::storage::{DirInfo, FileSystem, FileType, ObjectInfo, ObjectList};
pub use self::template::{RenderedTemplate, Template, TemplatePayload, TemplateSpec};
pub use self::workspace::{WorkspaceInfo, WorkspaceQuota, WorkspaceState, WorkspaceTier};
