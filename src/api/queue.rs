use serde_json::json;

use crate::client::{ensure_list, ensure_ok, ensure_type, Client};
use crate::config::KV_MAX_VALUE_LEN;
use crate::error::{Error, Result};
use crate::types::{QueueInfo, QueueLength, QueueMessage};

/// `/queue`
pub struct QueueApi<'a> {
    client: &'a Client,
}

impl<'a> QueueApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list_all(&self) -> Result<Vec<QueueInfo>> {
        ensure_list(self.client.get("/queue").send()?)
    }

    pub fn create(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::validation("queue name must not be empty"));
        }
        ensure_ok(self.client.post("/queue").json(&json!({ "name": name })).send()?)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        ensure_ok(self.client.delete(&format!("/queue/{name}")).send()?)
    }

    pub fn length(&self, name: &str) -> Result<u64> {
        let length: QueueLength =
            ensure_type(self.client.get(&format!("/queue/{name}/length")).send()?)?;
        Ok(length.length)
    }

    /// Pop pending messages. The server currently returns at most one.
    pub fn receive(&self, name: &str) -> Result<Vec<QueueMessage>> {
        ensure_list(self.client.get(&format!("/queue/{name}/messages")).send()?)
    }

    pub fn send(&self, name: &str, message: &str) -> Result<()> {
        if message.len() > KV_MAX_VALUE_LEN {
            return Err(Error::validation(format!(
                "message is {} bytes, above the {KV_MAX_VALUE_LEN} byte limit",
                message.len()
            )));
        }
        let request = self
            .client
            .post(&format!("/queue/{name}/messages"))
            .json(&json!({ "message": message }));
        ensure_ok(request.send()?)
    }
}
