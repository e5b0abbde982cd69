use crate::client::{ensure_ok, ensure_type, Client};
use crate::error::{Error, Result};
use crate::types::SecretItem;

/// `/secrets`. Values are write-only; listing returns names.
pub struct SecretApi<'a> {
    client: &'a Client,
}

impl<'a> SecretApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list_all(&self) -> Result<Vec<String>> {
        ensure_type(self.client.get("/secrets").send()?)
    }

    /// Create or overwrite one or more secrets in a single request.
    pub fn create(&self, secrets: &[SecretItem]) -> Result<()> {
        if secrets.is_empty() {
            return Err(Error::validation("no secrets to create"));
        }
        if let Some(unnamed) = secrets.iter().position(|s| s.name.is_empty()) {
            return Err(Error::validation(format!("secret #{unnamed} has an empty name")));
        }
        ensure_ok(self.client.post("/secrets").json(secrets).send()?)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        ensure_ok(self.client.delete(&format!("/secrets/{name}")).send()?)
    }
}
