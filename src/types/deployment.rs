//! Deployment models, plus the container, env and scaling building blocks
//! shared with jobs, pods and Ray clusters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_with::skip_serializing_none;

use super::affinity::ResourceAffinity;
use super::common::{impl_resource_id_from_metadata, lenient_enum, Metadata, UserSecurityContext, Validate};
use crate::error::{Error, Result};

/// Reference to a platform secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvValue {
    pub secret_name_ref: String,
}

/// Environment variable: a literal value or a secret reference, never both.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: Option<String>,
    pub value_from: Option<EnvValue>,
}

impl EnvVar {
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            value_from: None,
        }
    }

    pub fn secret(name: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            value_from: Some(EnvValue {
                secret_name_ref: secret.into(),
            }),
        }
    }
}

impl Validate for EnvVar {
    fn validate(&self) -> Result<()> {
        match (&self.value, &self.value_from) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            _ => Err(Error::validation(format!(
                "env var {} must set exactly one of value or value_from",
                self.name
            ))),
        }
    }
}

/// Reference to a named access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenValue {
    pub token_name_ref: String,
}

/// Deployment access token: a literal value or a token reference, never both.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenVar {
    pub value: Option<String>,
    pub value_from: Option<TokenValue>,
}

impl TokenVar {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            value_from: None,
        }
    }

    /// The workspace token, referenced by name.
    pub fn workspace_token() -> Self {
        Self {
            value: None,
            value_from: Some(TokenValue {
                token_name_ref: "WORKSPACE_TOKEN".to_string(),
            }),
        }
    }
}

impl Validate for TokenVar {
    fn validate(&self) -> Result<()> {
        match (&self.value, &self.value_from) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            _ => Err(Error::validation(
                "api token must set exactly one of value or value_from",
            )),
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountOptions {
    pub local_cache_size_mib: Option<i64>,
    pub read_only: Option<bool>,
}

/// A storage mount. `from` names the storage backend; absent means the
/// workspace's default file system.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mount {
    pub path: String,
    pub mount_path: String,
    pub from: Option<String>,
    pub mount_options: Option<MountOptions>,
}

impl FromStr for Mount {
    type Err = Error;

    /// Parse `SRC:DST[:FROM]`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        let (path, mount_path, from) = match parts.as_slice() {
            [src, dst] => (*src, *dst, None),
            [src, dst, from] => (*src, *dst, Some(*from)),
            _ => {
                return Err(Error::validation(format!(
                    "invalid mount {s:?}: expected SRC:DST[:FROM]"
                )))
            }
        };
        if path.is_empty() || mount_path.is_empty() || from == Some("") {
            return Err(Error::validation(format!(
                "invalid mount {s:?}: empty component"
            )));
        }
        Ok(Self {
            path: path.to_string(),
            mount_path: mount_path.to_string(),
            from: from.map(str::to_string),
            mount_options: None,
        })
    }
}

/// Transport protocol of a container port. Parsing is case-insensitive and
/// serialization is always lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            _ => Err(Error::validation(format!(
                "Invalid protocol: {s}. Protocol must be either tcp or udp."
            ))),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Protocol {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Protocol {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Exposed container port. `u16` bounds the port to 0..=65535.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerPort {
    pub container_port: u16,
    pub protocol: Option<Protocol>,
    pub host_port: Option<u16>,
    pub enable_load_balancer: Option<bool>,
}

impl ContainerPort {
    /// Build from an untyped port number and protocol name.
    pub fn new(port: i64, protocol: Option<&str>) -> Result<Self> {
        let container_port = u16::try_from(port).map_err(|_| {
            Error::validation("Invalid port number. Port must be between 0 and 65535.")
        })?;
        Ok(Self {
            container_port,
            protocol: protocol.map(str::parse).transpose()?,
            host_port: None,
            enable_load_balancer: None,
        })
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub image: Option<String>,
    pub ports: Option<Vec<ContainerPort>>,
    pub command: Option<Vec<String>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub disable_pulling_from_replica: Option<bool>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequirement {
    pub resource_shape: Option<String>,
    /// CPU cores per replica
    pub cpu: Option<f64>,
    /// MiB
    pub memory: Option<i64>,
    pub ephemeral_storage_in_gb: Option<i64>,
    pub accelerator_type: Option<String>,
    /// May be fractional
    pub accelerator_num: Option<f64>,
    /// MiB
    pub shared_memory_size: Option<i64>,
    pub affinity: Option<ResourceAffinity>,
    pub min_replicas: Option<i64>,
    pub max_replicas: Option<i64>,
    pub host_network: Option<bool>,
}

impl Validate for ResourceRequirement {
    fn validate(&self) -> Result<()> {
        validate_replicas(self.min_replicas, self.max_replicas)
    }
}

/// `min >= 0`, and a set `max` needs `min <= max`.
pub(crate) fn validate_replicas(min: Option<i64>, max: Option<i64>) -> Result<()> {
    if let Some(min) = min {
        if min < 0 {
            return Err(Error::validation(format!(
                "min_replicas must be non-negative. Found {min}."
            )));
        }
    }
    if let Some(max) = max {
        if max < 0 {
            return Err(Error::validation(format!(
                "max_replicas must be non-negative. Found {max}."
            )));
        }
        let Some(min) = min else {
            return Err(Error::validation(
                "min_replicas must be specified if max_replicas is specified.",
            ));
        };
        if min > max {
            return Err(Error::validation(format!(
                "min_replicas must be smaller than max_replicas. Found \
                 min_replicas={min}, max_replicas={max}."
            )));
        }
    }
    Ok(())
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleDown {
    /// Seconds without traffic before scaling to zero
    pub no_traffic_timeout: Option<i64>,
    /// Seconds a replica may stay not-ready
    pub not_ready_timeout: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoscalerTargetThroughput {
    pub qpm: Option<f64>,
    pub paths: Option<Vec<String>>,
    pub methods: Option<Vec<String>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoScaler {
    pub scale_down: Option<ScaleDown>,
    pub target_gpu_utilization_percentage: Option<i64>,
    pub target_throughput: Option<AutoscalerTargetThroughput>,
}

impl Validate for AutoScaler {
    fn validate(&self) -> Result<()> {
        if let Some(scale_down) = &self.scale_down {
            for (field, value) in [
                ("no_traffic_timeout", scale_down.no_traffic_timeout),
                ("not_ready_timeout", scale_down.not_ready_timeout),
            ] {
                if let Some(v) = value.filter(|v| *v < 0) {
                    return Err(Error::validation(format!(
                        "{field} must be non-negative. Found {v}."
                    )));
                }
            }
        }
        if let Some(pct) = self.target_gpu_utilization_percentage {
            if !(0..=100).contains(&pct) {
                return Err(Error::validation(format!(
                    "target_gpu_utilization_percentage must be between 0 and 100. Found {pct}."
                )));
            }
        }
        Ok(())
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckReadiness {
    pub require_approval: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckTcp {
    pub port: u16,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckLiveness {
    pub initial_delay_seconds: Option<i64>,
    pub tcp: Option<HealthCheckTcp>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub readiness: Option<HealthCheckReadiness>,
    pub liveness: Option<HealthCheckLiveness>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    pub save_termination_logs: Option<bool>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingPolicy {
    pub enable_header_based_replica_routing: Option<bool>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    pub priority_class: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationConfig {
    pub reservation_id: Option<String>,
}

/// The user-controlled part of a deployment (and of a pod).
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentUserSpec {
    pub photon_namespace: Option<String>,
    pub photon_id: Option<String>,
    pub container: Option<Container>,
    pub resource_requirement: Option<ResourceRequirement>,
    pub auto_scaler: Option<AutoScaler>,
    pub api_tokens: Option<Vec<TokenVar>>,
    pub envs: Option<Vec<EnvVar>>,
    pub mounts: Option<Vec<Mount>>,
    pub image_pull_secrets: Option<Vec<String>>,
    pub health: Option<HealthCheck>,
    pub is_pod: Option<bool>,
    pub privileged: Option<bool>,
    pub log: Option<LogConfig>,
    pub metrics: Option<Metrics>,
    pub routing_policy: Option<RoutingPolicy>,
    pub queue_config: Option<QueueConfig>,
    pub reservation_config: Option<ReservationConfig>,
    pub user_security_context: Option<UserSecurityContext>,
}

impl Validate for DeploymentUserSpec {
    fn validate(&self) -> Result<()> {
        self.resource_requirement.validate()?;
        self.auto_scaler.validate()?;
        self.api_tokens.validate()?;
        self.envs.validate()
    }
}

lenient_enum! {
    pub enum DeploymentState {
        Ready => "Ready",
        NotReady => "Not Ready",
        Starting => "Starting",
        Updating => "Updating",
        Deleting => "Deleting",
        Stopping => "Stopping",
        Stopped => "Stopped",
        Scaling => "Scaling",
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentEndpoint {
    #[serde(default)]
    pub internal_endpoint: String,
    #[serde(default)]
    pub external_endpoint: String,
    pub custom_external_endpoint: Option<Vec<String>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoscalerCondition {
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub last_transition_time: Option<i64>,
    pub message: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoScalerStatus {
    pub desired_replicas: Option<i64>,
    pub last_transition_time: Option<i64>,
    pub conditions: Option<Vec<AutoscalerCondition>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStatus {
    pub state: DeploymentState,
    pub endpoint: Option<DeploymentEndpoint>,
    pub autoscaler_status: Option<AutoScalerStatus>,
    pub with_system_photon: Option<bool>,
    pub is_system: Option<bool>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub metadata: Option<Metadata>,
    pub spec: Option<DeploymentUserSpec>,
    pub status: Option<DeploymentStatus>,
}

impl Deployment {
    pub fn new(name: &str, spec: DeploymentUserSpec) -> Self {
        Self {
            metadata: Some(Metadata::named(name)),
            spec: Some(spec),
            status: None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.name.as_deref())
    }

    pub fn state(&self) -> DeploymentState {
        self.status.as_ref().map(|s| s.state).unwrap_or_default()
    }

    pub fn is_pod(&self) -> bool {
        self.spec.as_ref().and_then(|s| s.is_pod).unwrap_or(false)
    }
}

impl Validate for Deployment {
    fn validate(&self) -> Result<()> {
        self.spec.validate()
    }
}

impl_resource_id_from_metadata!(Deployment => "deployment");
