use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::common::lenient_enum;

lenient_enum! {
    pub enum EventType {
        Normal => "Normal",
        Warning => "Warning",
    }
}

/// Platform event attached to a deployment or job.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadEvent {
    #[serde(rename = "type", default)]
    pub kind: EventType,
    #[serde(default)]
    pub reason: String,
    pub count: Option<i64>,
    pub last_observed_time: Option<String>,
    pub message: Option<String>,
}
