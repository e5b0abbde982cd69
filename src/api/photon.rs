use std::fs;
use std::path::{Path, PathBuf};

use reqwest::blocking::multipart::Form;
use tracing::debug;

use super::{safe_json, visibility};
use crate::client::{ensure_list, ensure_ok, ensure_type, stream_to_file, Client};
use crate::error::{Error, Result};
use crate::paths;
use crate::photon::{LocalPhoton, LocalPhotonDb};
use crate::types::{validate_photon_name, AsResourceId, Deployment, Photon, Validate};

/// `/photons/{public|private}` plus the local photon index.
pub struct PhotonApi<'a> {
    client: &'a Client,
}

fn photons_path(public: bool) -> String {
    format!("/photons/{}", visibility(public))
}

/// Photon ids end up in cache file names; they must stay a single component.
fn check_local_id(id: &str) -> Result<()> {
    if id.contains(['/', '\\']) || id.contains("..") {
        return Err(Error::validation(format!(
            "Invalid photon id {id:?}: must not contain path separators or '..'"
        )));
    }
    Ok(())
}

impl<'a> PhotonApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list_all(&self, public: bool) -> Result<Vec<Photon>> {
        ensure_list(self.client.get(&photons_path(public)).send()?)
    }

    pub fn get(&self, id: &(impl AsResourceId + ?Sized), public: bool) -> Result<Photon> {
        let path = format!("{}/{}", photons_path(public), id.resource_id()?);
        ensure_type(self.client.get(&path).send()?)
    }

    /// Upload a packaged photon file as multipart field `file`.
    pub fn create(&self, local: &Path, public: bool) -> Result<()> {
        if !local.is_file() {
            return Err(Error::validation(format!(
                "Photon file not found: {}",
                local.display()
            )));
        }
        let form = Form::new().file("file", local)?;
        let request = self.client.post(&photons_path(public)).multipart(form).no_timeout();
        ensure_ok(request.send()?)
    }

    /// Download a photon's content.
    ///
    /// With `local` the file lands there as-is. Without it the photon is
    /// saved to `<cache>/<name>.<id>.photon` and recorded in the local
    /// index. Both the id and the server-reported name must be valid
    /// file name components. Returns the final path.
    pub fn download(
        &self,
        id: &(impl AsResourceId + ?Sized),
        local: Option<&Path>,
        public: bool,
    ) -> Result<PathBuf> {
        let id = id.resource_id()?;
        let content = format!("{}/{id}/content", photons_path(public));

        if let Some(local) = local {
            let response = self.client.get(&content).no_timeout().send()?;
            stream_to_file(response, local)?;
            return Ok(local.to_path_buf());
        }

        check_local_id(id)?;
        let photon = self.get(id, public)?;
        validate_photon_name(&photon.name)?;
        paths::ensure_cache_dir()?;
        let tmp = paths::photon_tmp_path(id);
        let response = self.client.get(&content).no_timeout().send()?;
        let written = stream_to_file(response, &tmp)?;

        let target = paths::photon_download_path(&photon.name, id);
        fs::rename(&tmp, &target)?;
        debug!(id, bytes = written, path = %target.display(), "downloaded photon");

        LocalPhotonDb::open_default()?.add(id, &photon.name, &photon.model, &target)?;
        Ok(target)
    }

    pub fn delete(&self, id: &(impl AsResourceId + ?Sized), public: bool) -> Result<()> {
        let path = format!("{}/{}", photons_path(public), id.resource_id()?);
        ensure_ok(self.client.delete(&path).send()?)
    }

    /// Deploy a photon: POST the deployment spec to `/deployments`.
    pub fn run(&self, deployment: &Deployment) -> Result<()> {
        deployment.validate()?;
        let body = safe_json(deployment)?;
        ensure_ok(self.client.post("/deployments").json(&body).send()?)
    }

    /// Photons in the local index, newest first.
    pub fn list_local(&self) -> Result<Vec<LocalPhoton>> {
        LocalPhotonDb::open_default()?.list()
    }

    pub fn delete_local(&self, name: &str, remove_all: bool) -> Result<Vec<LocalPhoton>> {
        LocalPhotonDb::open_default()?.remove(name, remove_all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_id_must_be_single_component() {
        assert!(check_local_id("ph-1").is_ok());
        assert!(check_local_id("chat.v2").is_ok());
        for bad in ["../up", "a/b", "a\\b", ".."] {
            assert!(matches!(check_local_id(bad), Err(Error::Validation(_))), "{bad}");
        }
    }
}
