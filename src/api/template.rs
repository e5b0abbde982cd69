use super::{safe_json, visibility};
use crate::client::{ensure_list, ensure_type, Client};
use crate::error::Result;
use crate::types::{AsResourceId, RenderedTemplate, Template, TemplatePayload};

/// `/templates/{public|private}`
pub struct TemplateApi<'a> {
    client: &'a Client,
}

impl<'a> TemplateApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list_all(&self, public: bool) -> Result<Vec<Template>> {
        let path = format!("/templates/{}", visibility(public));
        ensure_list(self.client.get(&path).send()?)
    }

    pub fn get(&self, id: &(impl AsResourceId + ?Sized), public: bool) -> Result<Template> {
        let path = format!("/templates/{}/{}", visibility(public), id.resource_id()?);
        ensure_type(self.client.get(&path).send()?)
    }

    /// Render a template into a deployment (`is_pod`) or a job.
    ///
    /// Without an explicit `is_private`, the template is looked up among the
    /// public templates and rendered from there if found, privately
    /// otherwise.
    pub fn render(
        &self,
        id: &(impl AsResourceId + ?Sized),
        payload: &TemplatePayload,
        is_private: Option<bool>,
        is_pod: bool,
    ) -> Result<RenderedTemplate> {
        let id = id.resource_id()?;
        let is_private = match is_private {
            Some(is_private) => is_private,
            None => !self
                .list_all(true)?
                .iter()
                .any(|t| t.metadata.id.as_deref() == Some(id)),
        };
        let path = format!("/templates/{}/{id}/render", visibility(!is_private));
        let body = safe_json(payload)?;
        let response = self.client.post(&path).json(&body).send()?;
        if is_pod {
            Ok(RenderedTemplate::Deployment(ensure_type(response)?))
        } else {
            Ok(RenderedTemplate::Job(ensure_type(response)?))
        }
    }
}
