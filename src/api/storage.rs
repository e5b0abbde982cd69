use std::path::Path;

use reqwest::blocking::multipart::Form;

use crate::client::{check_status, ensure_list, ensure_ok, ensure_type, stream_to_file, Client};
use crate::error::{Error, Result};
use crate::types::{DirInfo, FileSystem, FileType};

/// Volume every path below lives on.
const DEFAULT_VOLUME: &str = "default";

/// POSIX-like remote file tree under `/storage/default`.
pub struct StorageApi<'a> {
    client: &'a Client,
}

fn volume_path(remote: &str) -> String {
    let remote = remote.trim_start_matches('/');
    format!("/storage/{DEFAULT_VOLUME}/{remote}")
}

/// Parent directory and base name of a remote path, ignoring trailing `/`.
fn split_remote(remote: &str) -> (String, String) {
    let trimmed = remote.trim_end_matches('/');
    let trimmed = format!("/{}", trimmed.trim_start_matches('/'));
    match trimmed.rsplit_once('/') {
        Some(("", base)) => ("/".to_string(), base.to_string()),
        Some((parent, base)) => (parent.to_string(), base.to_string()),
        None => ("/".to_string(), trimmed.clone()),
    }
}

impl<'a> StorageApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list_storage(&self) -> Result<Vec<FileSystem>> {
        ensure_list(self.client.get("/storage").send()?)
    }

    pub fn get_dir(&self, remote: &str) -> Result<Vec<DirInfo>> {
        ensure_list(self.client.get(&volume_path(remote)).send()?)
    }

    /// `File` or `Dir` for an existing path, `None` when the parent listing
    /// does not contain it.
    pub fn get_file_type(&self, remote: &str) -> Result<Option<FileType>> {
        let (parent, base) = split_remote(remote);
        Ok(self
            .get_dir(&parent)?
            .into_iter()
            .find(|entry| entry.name == base)
            .map(|entry| entry.kind))
    }

    /// Stream a remote file to `local`. Returns the number of bytes written.
    pub fn get_file(&self, remote: &str, local: &Path) -> Result<u64> {
        let response = self.client.get(&volume_path(remote)).no_timeout().send()?;
        stream_to_file(response, local)
    }

    /// Upload `local` to `remote` as multipart field `file`.
    pub fn create_file(&self, local: &Path, remote: &str) -> Result<()> {
        if !local.is_file() {
            return Err(Error::validation(format!(
                "Local file not found: {}",
                local.display()
            )));
        }
        let form = Form::new().file("file", local)?;
        let request = self.client.post(&volume_path(remote)).multipart(form).no_timeout();
        ensure_ok(request.send()?)
    }

    pub fn create_dir(&self, remote: &str) -> Result<()> {
        ensure_ok(self.client.put(&volume_path(remote)).send()?)
    }

    pub fn delete_file_or_dir(&self, remote: &str) -> Result<()> {
        ensure_ok(self.client.delete(&volume_path(remote)).send()?)
    }

    /// `HEAD` the path; 404 means it does not exist.
    pub fn check_exists(&self, remote: &str) -> Result<bool> {
        match check_status(self.client.head(&volume_path(remote)).send()?) {
            Ok(_) => Ok(true),
            Err(e) if e.status() == Some(404) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn total_file_system_usage_bytes(&self) -> Result<FileSystem> {
        ensure_type(self.client.get("/storage/du").send()?)
    }

    pub fn enable_rsync(&self) -> Result<()> {
        ensure_ok(self.client.post("/storage/rsync").send()?)
    }

    pub fn disable_rsync(&self) -> Result<()> {
        ensure_ok(self.client.delete("/storage/rsync").send()?)
    }
}
