use std::time::Duration;

use serde_json::Value;

use super::safe_json;
use crate::client::{ensure_json, ensure_list, ensure_ok, ensure_type, Client, LogStream};
use crate::error::Result;
use crate::types::{
    AsResourceId, Deployment, DeploymentTerminations, ReadinessIssue, Replica, Validate,
    WorkloadEvent,
};

/// `/deployments`
pub struct DeploymentApi<'a> {
    client: &'a Client,
}

impl<'a> DeploymentApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list_all(&self) -> Result<Vec<Deployment>> {
        ensure_list(self.client.get("/deployments").send()?)
    }

    pub fn create(&self, deployment: &Deployment) -> Result<()> {
        deployment.validate()?;
        let body = safe_json(deployment)?;
        ensure_ok(self.client.post("/deployments").json(&body).send()?)
    }

    pub fn get(&self, id: &(impl AsResourceId + ?Sized)) -> Result<Deployment> {
        let path = format!("/deployments/{}", id.resource_id()?);
        ensure_type(self.client.get(&path).send()?)
    }

    /// Merge-patch: only the fields set in `deployment` are sent.
    pub fn update(
        &self,
        id: &(impl AsResourceId + ?Sized),
        deployment: &Deployment,
    ) -> Result<Deployment> {
        deployment.validate()?;
        let path = format!("/deployments/{}", id.resource_id()?);
        let body = safe_json(deployment)?;
        ensure_type(self.client.patch(&path).json(&body).send()?)
    }

    pub fn delete(&self, id: &(impl AsResourceId + ?Sized)) -> Result<()> {
        let path = format!("/deployments/{}", id.resource_id()?);
        ensure_ok(self.client.delete(&path).send()?)
    }

    pub fn restart(&self, id: &(impl AsResourceId + ?Sized)) -> Result<Deployment> {
        let path = format!("/deployments/{}/restart", id.resource_id()?);
        ensure_type(self.client.put(&path).send()?)
    }

    pub fn get_readiness(&self, id: &(impl AsResourceId + ?Sized)) -> Result<ReadinessIssue> {
        let path = format!("/deployments/{}/readiness", id.resource_id()?);
        ensure_type(self.client.get(&path).send()?)
    }

    pub fn get_termination(
        &self,
        id: &(impl AsResourceId + ?Sized),
    ) -> Result<DeploymentTerminations> {
        let path = format!("/deployments/{}/termination", id.resource_id()?);
        ensure_type(self.client.get(&path).send()?)
    }

    pub fn get_replicas(&self, id: &(impl AsResourceId + ?Sized)) -> Result<Vec<Replica>> {
        let path = format!("/deployments/{}/replicas", id.resource_id()?);
        ensure_list(self.client.get(&path).send()?)
    }

    /// Stream a replica's log. Without a timeout the stream stays open until
    /// the server closes it or the caller drops it.
    pub fn get_log(
        &self,
        id: &(impl AsResourceId + ?Sized),
        replica: &(impl AsResourceId + ?Sized),
        timeout: Option<Duration>,
    ) -> Result<LogStream> {
        let path = format!(
            "/deployments/{}/replicas/{}/log",
            id.resource_id()?,
            replica.resource_id()?
        );
        let request = match timeout {
            Some(timeout) => self.client.get(&path).timeout(timeout),
            None => self.client.get(&path).no_timeout(),
        };
        LogStream::from_response(request.send()?)
    }

    pub fn get_events(&self, id: &(impl AsResourceId + ?Sized)) -> Result<Vec<WorkloadEvent>> {
        let path = format!("/deployments/{}/events", id.resource_id()?);
        ensure_list(self.client.get(&path).send()?)
    }

    /// Requests per second, overall or broken down by path. Raw monitoring JSON.
    pub fn get_qps(&self, id: &(impl AsResourceId + ?Sized), by_path: bool) -> Result<Value> {
        let metric = if by_path { "FastAPIQPSByPath" } else { "FastAPIQPS" };
        self.monitoring(id.resource_id()?, metric)
    }

    /// Request latency, overall or broken down by path. Raw monitoring JSON.
    pub fn get_latency(&self, id: &(impl AsResourceId + ?Sized), by_path: bool) -> Result<Value> {
        let metric = if by_path {
            "FastAPILatencyByPath"
        } else {
            "FastAPILatency"
        };
        self.monitoring(id.resource_id()?, metric)
    }

    fn monitoring(&self, id: &str, metric: &str) -> Result<Value> {
        let path = format!("/deployments/{id}/monitoring/{metric}");
        ensure_json(self.client.get(&path).send()?)
    }
}
