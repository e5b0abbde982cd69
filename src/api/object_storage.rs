use std::path::Path;

use reqwest::blocking::multipart::Form;
use reqwest::header::LOCATION;

use super::visibility;
use crate::client::{check_status, ensure_bytes, ensure_ok, ensure_type, stream_to_file, Client};
use crate::error::{Error, Result};
use crate::types::{ObjectInfo, ObjectList};

/// `/object_storage/{public|private}`
pub struct ObjectStorageApi<'a> {
    client: &'a Client,
}

impl<'a> ObjectStorageApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list(&self, prefix: Option<&str>, public: bool) -> Result<Vec<ObjectInfo>> {
        let mut request = self.client.get(&format!("/object_storage/{}", visibility(public)));
        if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
            request = request.query(&[("prefix", prefix)]);
        }
        let list: ObjectList = ensure_type(request.send()?)?;
        Ok(list.items)
    }

    /// Object content.
    pub fn get(&self, key: &str, public: bool) -> Result<Vec<u8>> {
        ensure_bytes(self.client.get(&object_path(key, public)).no_timeout().send()?)
    }

    /// Stream an object to `local`. Returns the number of bytes written.
    pub fn get_to_file(&self, key: &str, public: bool, local: &Path) -> Result<u64> {
        let response = self.client.get(&object_path(key, public)).no_timeout().send()?;
        stream_to_file(response, local)
    }

    /// URL of an object. Private objects get a presigned URL that expires
    /// after 15 minutes.
    pub fn get_url(&self, key: &str, public: bool) -> Result<String> {
        let path = format!(
            "/object_storage/{}_presigned/{}",
            visibility(public),
            key.trim_start_matches('/')
        );
        let response = check_status(self.client.get(&path).send()?)?;
        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        match location {
            Some(location) => Ok(location),
            None => Err(Error::Programming {
                status,
                body: response.text().unwrap_or_default(),
                details: "response has no Location header".to_string(),
            }),
        }
    }

    /// Upload `local` under `key`, overwriting any existing object, and
    /// return its URL.
    pub fn put(&self, key: &str, local: &Path, public: bool) -> Result<String> {
        if !local.is_file() {
            return Err(Error::validation(format!(
                "Local file not found: {}",
                local.display()
            )));
        }
        let form = Form::new().file("file", local)?;
        let request = self.client.put(&object_path(key, public)).multipart(form).no_timeout();
        ensure_ok(request.send()?)?;
        self.get_url(key, public)
    }

    /// Deleting a missing key is not an error.
    pub fn delete(&self, key: &str, public: bool) -> Result<()> {
        ensure_ok(self.client.delete(&object_path(key, public)).send()?)
    }
}

fn object_path(key: &str, public: bool) -> String {
    format!(
        "/object_storage/{}/{}",
        visibility(public),
        key.trim_start_matches('/')
    )
}
