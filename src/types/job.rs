use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::affinity::ResourceAffinity;
use super::common::{impl_resource_id_from_metadata, lenient_enum, Metadata, UserSecurityContext, Validate};
use super::deployment::{
    Container, EnvVar, LogConfig, Metrics, Mount, QueueConfig, ReservationConfig,
};
use crate::error::{Error, Result};

lenient_enum! {
    pub enum JobState {
        Starting => "Starting",
        Running => "Running",
        Failed => "Failed",
        Completed => "Completed",
        Stopped => "Stopped",
        Stopping => "Stopping",
        Deleting => "Deleting",
        Deleted => "Deleted",
        Restarting => "Restarting",
        Archived => "Archived",
        Queueing => "Queueing",
        Awaiting => "Awaiting",
        PendingRetry => "PendingRetry",
    }
}

impl JobState {
    /// No further state transitions are expected.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Failed
                | JobState::Completed
                | JobState::Stopped
                | JobState::Deleted
                | JobState::Archived
        )
    }
}

/// Which jobs a list/get call considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobQueryMode {
    #[default]
    AliveOnly,
    ArchiveOnly,
    AliveAndArchive,
}

impl JobQueryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobQueryMode::AliveOnly => "alive_only",
            JobQueryMode::ArchiveOnly => "archive_only",
            JobQueryMode::AliveAndArchive => "alive_and_archive",
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobUserSpec {
    pub resource_shape: Option<String>,
    pub affinity: Option<ResourceAffinity>,
    pub container: Option<Container>,
    /// MiB
    pub shared_memory_size: Option<i64>,
    pub completions: Option<i64>,
    pub parallelism: Option<i64>,
    pub max_failure_retry: Option<i64>,
    pub max_job_failure_retry: Option<i64>,
    pub envs: Option<Vec<EnvVar>>,
    pub mounts: Option<Vec<Mount>>,
    pub image_pull_secrets: Option<Vec<String>>,
    pub ttl_seconds_after_finished: Option<i64>,
    pub intra_job_communication: Option<bool>,
    pub privileged: Option<bool>,
    pub metrics: Option<Metrics>,
    pub log: Option<LogConfig>,
    pub queue_config: Option<QueueConfig>,
    pub reservation_config: Option<ReservationConfig>,
    pub stopped: Option<bool>,
    pub user_security_context: Option<UserSecurityContext>,
}

impl Validate for JobUserSpec {
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("completions", self.completions),
            ("parallelism", self.parallelism),
            ("max_failure_retry", self.max_failure_retry),
            ("ttl_seconds_after_finished", self.ttl_seconds_after_finished),
        ] {
            if let Some(v) = value.filter(|v| *v < 0) {
                return Err(Error::validation(format!(
                    "{field} must be non-negative. Found {v}."
                )));
            }
        }
        self.envs.validate()
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub state: JobState,
    pub job_name: Option<String>,
    pub ready: Option<i64>,
    pub active: Option<i64>,
    pub failed: Option<i64>,
    pub succeeded: Option<i64>,
    pub creation_time: Option<i64>,
    pub completion_time: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub metadata: Option<Metadata>,
    pub spec: Option<JobUserSpec>,
    pub status: Option<JobStatus>,
}

impl Job {
    pub fn new(name: &str, spec: JobUserSpec) -> Self {
        Self {
            metadata: Some(Metadata::named(name)),
            spec: Some(spec),
            status: None,
        }
    }

    pub fn state(&self) -> JobState {
        self.status.as_ref().map(|s| s.state).unwrap_or_default()
    }
}

impl Validate for Job {
    fn validate(&self) -> Result<()> {
        self.spec.validate()
    }
}

impl_resource_id_from_metadata!(Job => "job");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::common::AsResourceId;
    use serde_json::json;

    #[test]
    fn test_query_mode_wire_names() {
        assert_eq!(
            serde_json::to_value(JobQueryMode::AliveAndArchive).unwrap(),
            json!("alive_and_archive")
        );
        assert_eq!(JobQueryMode::default().as_str(), "alive_only");
    }

    #[test]
    fn test_job_parse_with_unknown_state() {
        let job: Job = serde_json::from_value(json!({
            "metadata": {"id": "train-1"},
            "spec": {"completions": 2, "parallelism": 2},
            "status": {"state": "Teleporting", "ready": 0}
        }))
        .unwrap();
        assert_eq!(job.state(), JobState::Unknown);
        assert_eq!(job.resource_id().unwrap(), "train-1");
    }

    #[test]
    fn test_negative_completions_rejected() {
        let spec = JobUserSpec {
            completions: Some(-1),
            ..Default::default()
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobState::Completed.is_terminal());
        assert!(!JobState::Running.is_terminal());
    }
}
