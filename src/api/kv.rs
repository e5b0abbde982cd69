use reqwest::blocking::multipart::{Form, Part};
use serde_json::json;

use crate::client::{check_status, ensure_list, ensure_ok, ensure_type, Client};
use crate::config::{KV_MAX_KEY_LEN, KV_MAX_VALUE_LEN};
use crate::error::{Error, Result};
use crate::types::{KvNamespace, PartialKeyList};

/// `/kv/namespaces`
pub struct KvApi<'a> {
    client: &'a Client,
}

impl<'a> KvApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list_namespaces(&self) -> Result<Vec<KvNamespace>> {
        ensure_list(self.client.get("/kv/namespaces").send()?)
    }

    pub fn get_namespace(&self, name: &str) -> Result<KvNamespace> {
        ensure_type(self.client.get(&format!("/kv/namespaces/{name}")).send()?)
    }

    pub fn create_namespace(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::validation("KV namespace name must not be empty"));
        }
        let request = self.client.post("/kv/namespaces").json(&json!({ "name": name }));
        ensure_ok(request.send()?)
    }

    pub fn delete_namespace(&self, name: &str) -> Result<()> {
        ensure_ok(self.client.delete(&format!("/kv/namespaces/{name}")).send()?)
    }

    /// Raw value of `key`; [`Error::KeyNotFound`] when it does not exist.
    pub fn get(&self, namespace: &str, key: &str) -> Result<Vec<u8>> {
        check_key(key)?;
        let response = self.client.get(&value_path(namespace, key)).send()?;
        match check_status(response) {
            Ok(response) => Ok(response.bytes()?.to_vec()),
            Err(e) if e.status() == Some(404) => Err(Error::KeyNotFound(key.to_string())),
            Err(e) => Err(e),
        }
    }

    /// Store `value` under `key`, sent as multipart field `value`.
    pub fn put(&self, namespace: &str, key: &str, value: impl Into<Vec<u8>>) -> Result<()> {
        check_key(key)?;
        let value = value.into();
        if value.len() > KV_MAX_VALUE_LEN {
            return Err(Error::validation(format!(
                "value for key {key} is {} bytes, above the {KV_MAX_VALUE_LEN} byte limit",
                value.len()
            )));
        }
        let form = Form::new().part("value", Part::bytes(value));
        let request = self.client.post(&value_path(namespace, key)).multipart(form);
        ensure_ok(request.send()?)
    }

    pub fn delete(&self, namespace: &str, key: &str) -> Result<()> {
        check_key(key)?;
        ensure_ok(self.client.delete(&value_path(namespace, key)).send()?)
    }

    /// One page of keys. Pass the returned cursor back to continue.
    pub fn list_keys(
        &self,
        namespace: &str,
        cursor: Option<i64>,
        limit: Option<u32>,
        prefix: Option<&str>,
    ) -> Result<PartialKeyList> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor.to_string()));
        }
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
            params.push(("prefix", prefix.to_string()));
        }
        let path = format!("/kv/namespaces/{namespace}/keys");
        ensure_type(self.client.get(&path).query(&params).send()?)
    }
}

fn value_path(namespace: &str, key: &str) -> String {
    format!("/kv/namespaces/{namespace}/values/{key}")
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::validation("KV key must not be empty"));
    }
    if key.len() > KV_MAX_KEY_LEN {
        return Err(Error::validation(format!(
            "KV key is {} bytes, above the {KV_MAX_KEY_LEN} byte limit",
            key.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_limits() {
        assert!(check_key("k").is_ok());
        assert!(check_key("").is_err());
        assert!(check_key(&"k".repeat(KV_MAX_KEY_LEN)).is_ok());
        assert!(check_key(&"k".repeat(KV_MAX_KEY_LEN + 1)).is_err());
    }
}
