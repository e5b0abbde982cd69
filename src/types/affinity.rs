use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Placement constraints for a workload.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceAffinity {
    /// Cloud providers the workload may land on
    pub allowed_providers: Option<Vec<String>>,
    /// Dedicated node groups the workload may use
    pub allowed_dedicated_node_groups: Option<Vec<String>>,
    /// Specific nodes within the allowed node group
    pub allowed_nodes_in_node_group: Option<Vec<String>>,
}

impl ResourceAffinity {
    pub fn node_groups<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_dedicated_node_groups: Some(groups.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }
}
