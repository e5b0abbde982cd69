use serde::{Deserialize, Serialize};

/// Secret as written to the platform. Listing returns names only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretItem {
    pub name: String,
    pub value: String,
}

impl SecretItem {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
