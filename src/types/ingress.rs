use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::common::{impl_resource_id_from_metadata, Metadata};

/// A deployment behind an ingress, with its traffic weight.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressEndpoint {
    pub deployment: String,
    pub weight: Option<u32>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressSpec {
    pub domain_name: Option<String>,
    pub endpoints: Option<Vec<IngressEndpoint>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressStatus {
    pub external_endpoint: Option<String>,
    pub message: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingress {
    pub metadata: Option<Metadata>,
    pub spec: Option<IngressSpec>,
    pub status: Option<IngressStatus>,
}

impl_resource_id_from_metadata!(Ingress => "ingress");
