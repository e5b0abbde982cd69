use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::common::{AsResourceId, Metadata};
use super::deployment::Deployment;
use super::job::Job;
use crate::error::{Error, Result};

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_pod: Option<bool>,
    /// Schema of accepted render parameters
    pub parameters: Option<serde_json::Value>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub metadata: Metadata,
    pub spec: Option<TemplateSpec>,
}

impl AsResourceId for Template {
    fn resource_id(&self) -> Result<&str> {
        self.metadata
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::validation("template has no metadata id"))
    }
}

/// Render parameters. Well-known fields are typed; anything else the
/// template accepts goes into `extra` and is sent alongside them.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePayload {
    pub name: Option<String>,
    pub resource_shape: Option<String>,
    pub node_groups: Option<Vec<String>>,
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl TemplatePayload {
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// What a template renders into: pods come back as deployments.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedTemplate {
    Deployment(Deployment),
    Job(Job),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_payload_extra_sits_beside_typed_fields() {
        let payload = TemplatePayload {
            resource_shape: Some("gpu.a10".into()),
            ..Default::default()
        }
        .with_extra("model", "llama-3");
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"resource_shape": "gpu.a10", "model": "llama-3"})
        );
        let back: TemplatePayload = serde_json::from_value(json!({
            "resource_shape": "gpu.a10", "model": "llama-3"
        }))
        .unwrap();
        assert_eq!(back, payload);
    }
}
