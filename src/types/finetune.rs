use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;

use super::common::{impl_resource_id_from_metadata, Metadata, Validate};
use super::job::{JobStatus, JobUserSpec};
use crate::error::Result;

/// Trainer selection plus free-form trainer arguments.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    pub trainer: Option<String>,
    pub model: Option<String>,
    pub dataset: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FineTuneJobSpec {
    #[serde(flatten)]
    pub job: JobUserSpec,
    pub trainer: Option<TrainerConfig>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointInfo {
    pub path: Option<String>,
    pub step: Option<i64>,
    pub created_at: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineTuneJobStatus {
    #[serde(flatten)]
    pub job: JobStatus,
    pub latest_checkpoint: Option<CheckpointInfo>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FineTuneJob {
    pub metadata: Option<Metadata>,
    pub spec: Option<FineTuneJobSpec>,
    pub status: Option<FineTuneJobStatus>,
}

impl Validate for FineTuneJob {
    fn validate(&self) -> Result<()> {
        match &self.spec {
            Some(spec) => spec.job.validate(),
            None => Ok(()),
        }
    }
}

impl_resource_id_from_metadata!(FineTuneJob => "fine-tune job");

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineTuneModelInfo {
    pub model_id: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub trainers: Option<Vec<String>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainerInfo {
    pub name: String,
    pub is_default: Option<bool>,
    pub description: Option<String>,
    pub default_config: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_flattened_spec_shape() {
        let raw = json!({
            "metadata": {"id": "ft-1"},
            "spec": {
                "resource_shape": "gpu.8xh100",
                "completions": 1,
                "trainer": {"trainer": "sft", "model": "llama", "learning_rate": 0.0001}
            },
            "status": {"state": "Running", "latest_checkpoint": {"step": 100}}
        });
        let job: FineTuneJob = serde_json::from_value(raw.clone()).unwrap();
        let spec = job.spec.as_ref().unwrap();
        assert_eq!(spec.job.resource_shape.as_deref(), Some("gpu.8xh100"));
        let trainer = spec.trainer.as_ref().unwrap();
        assert_eq!(trainer.extra.get("learning_rate"), Some(&json!(0.0001)));
        assert_eq!(serde_json::to_value(&job).unwrap(), raw);
    }
}
