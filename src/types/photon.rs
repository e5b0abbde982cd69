use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::common::{AsResourceId, Validate};
use super::deployment::HealthCheck;
use crate::error::{Error, Result};

/// Longest accepted photon name.
pub const PHOTON_NAME_MAX_LEN: usize = 32;

fn photon_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z]([-a-z0-9]*[a-z0-9])?$").expect("Invalid photon name regex"))
}

/// Check a photon name: lowercase alphanumerics and dashes, starting with a
/// letter, not ending with a dash, at most 32 characters.
pub fn validate_photon_name(name: &str) -> Result<()> {
    if name.len() > PHOTON_NAME_MAX_LEN || !photon_name_regex().is_match(name) {
        return Err(Error::validation(format!(
            "Invalid photon name {name:?}: a name must consist of lower case alphanumeric \
             characters or '-', start with an alphabetical character, end with an \
             alphanumeric character, and be at most {PHOTON_NAME_MAX_LEN} characters long."
        )));
    }
    Ok(())
}

/// Default resources and env a photon suggests for its deployments.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotonDeploymentTemplate {
    pub resource_shape: Option<String>,
    pub env: Option<BTreeMap<String, String>>,
    pub secret: Option<Vec<String>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Photon {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub model: String,
    pub image: Option<String>,
    pub entrypoint: Option<String>,
    pub exposed_ports: Option<Vec<u16>>,
    pub container_args: Option<Vec<String>>,
    pub cmd: Option<Vec<String>>,
    /// Python requirements, in install order
    pub requirement_dependency: Option<Vec<String>>,
    pub system_dependency: Option<Vec<String>>,
    pub vcs_url: Option<String>,
    pub deployment_template: Option<PhotonDeploymentTemplate>,
    pub health_check: Option<HealthCheck>,
    pub created_at: Option<i64>,
}

impl Validate for Photon {
    fn validate(&self) -> Result<()> {
        validate_photon_name(&self.name)
    }
}

impl AsResourceId for Photon {
    fn resource_id(&self) -> Result<&str> {
        self.id.resource_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photon_name_rules() {
        for good in ["a", "my-photon", "p1", "a-b-c-9"] {
            assert!(validate_photon_name(good).is_ok(), "{good}");
        }
        for bad in ["", "1abc", "-abc", "abc-", "Abc", "a_b", &"a".repeat(33)] {
            assert!(validate_photon_name(bad).is_err(), "{bad}");
        }
        assert!(validate_photon_name(&"a".repeat(32)).is_ok());
    }
}
