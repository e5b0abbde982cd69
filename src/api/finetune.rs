use super::{safe_json, JobListQuery};
use crate::client::{ensure_list, ensure_list_at, ensure_ok, ensure_type, Client};
use crate::error::Result;
use crate::types::{AsResourceId, FineTuneJob, FineTuneModelInfo, JobQueryMode, TrainerInfo, Validate};

/// `/finetune`
pub struct FineTuneApi<'a> {
    client: &'a Client,
}

impl<'a> FineTuneApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list_all(&self, query: &JobListQuery) -> Result<Vec<FineTuneJob>> {
        query.fetch(|params| {
            let response = self.client.get("/finetune/jobs").query(params).send()?;
            ensure_list_at(response, "finetune_jobs")
        })
    }

    pub fn create(&self, job: &FineTuneJob) -> Result<FineTuneJob> {
        job.validate()?;
        let body = safe_json(job)?;
        ensure_type(self.client.post("/finetune/jobs").json(&body).send()?)
    }

    pub fn get(&self, id: &(impl AsResourceId + ?Sized), mode: JobQueryMode) -> Result<FineTuneJob> {
        let path = format!("/finetune/jobs/{}", id.resource_id()?);
        let request = self.client.get(&path).query(&[("job_query_mode", mode.as_str())]);
        ensure_type(request.send()?)
    }

    pub fn update(&self, id: &(impl AsResourceId + ?Sized), job: &FineTuneJob) -> Result<()> {
        job.validate()?;
        let path = format!("/finetune/jobs/{}", id.resource_id()?);
        let body = safe_json(job)?;
        ensure_ok(self.client.patch(&path).json(&body).send()?)
    }

    pub fn delete(&self, id: &(impl AsResourceId + ?Sized), mode: JobQueryMode) -> Result<()> {
        let path = format!("/finetune/jobs/{}", id.resource_id()?);
        let request = self.client.delete(&path).query(&[("job_query_mode", mode.as_str())]);
        ensure_ok(request.send()?)
    }

    pub fn list_supported_models(&self) -> Result<Vec<FineTuneModelInfo>> {
        ensure_list(self.client.get("/finetune/supported-models").send()?)
    }

    pub fn list_trainers(&self, default_only: bool) -> Result<Vec<TrainerInfo>> {
        let request = self
            .client
            .get("/finetune/trainers")
            .query(&[("default_only", default_only.to_string())]);
        ensure_list(request.send()?)
    }
}
