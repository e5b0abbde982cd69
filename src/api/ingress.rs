use super::safe_json;
use crate::client::{ensure_list, ensure_ok, ensure_type, Client};
use crate::error::Result;
use crate::types::{AsResourceId, Ingress, IngressEndpoint};

/// `/ingress`
pub struct IngressApi<'a> {
    client: &'a Client,
}

impl<'a> IngressApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list_all(&self) -> Result<Vec<Ingress>> {
        ensure_list(self.client.get("/ingress").send()?)
    }

    pub fn get(&self, id: &(impl AsResourceId + ?Sized)) -> Result<Ingress> {
        let path = format!("/ingress/{}", id.resource_id()?);
        ensure_type(self.client.get(&path).send()?)
    }

    pub fn create(&self, ingress: &Ingress) -> Result<()> {
        let body = safe_json(ingress)?;
        ensure_ok(self.client.post("/ingress").json(&body).send()?)
    }

    pub fn update(&self, id: &(impl AsResourceId + ?Sized), ingress: &Ingress) -> Result<Ingress> {
        let path = format!("/ingress/{}", id.resource_id()?);
        let body = safe_json(ingress)?;
        ensure_type(self.client.patch(&path).json(&body).send()?)
    }

    pub fn delete(&self, id: &(impl AsResourceId + ?Sized)) -> Result<()> {
        let path = format!("/ingress/{}", id.resource_id()?);
        ensure_ok(self.client.delete(&path).send()?)
    }

    pub fn list_endpoints(&self, id: &(impl AsResourceId + ?Sized)) -> Result<Vec<IngressEndpoint>> {
        let path = format!("/ingress/{}/endpoints", id.resource_id()?);
        ensure_list(self.client.get(&path).send()?)
    }
}
