use std::time::Duration;

use super::safe_json;
use crate::client::{ensure_list, ensure_ok, Client, LogStream};
use crate::error::{Error, Result};
use crate::types::{
    AsResourceId, Deployment, DeploymentTerminations, DeploymentUserSpec, ReadinessIssue,
    Validate,
};

/// Pods are single-replica deployments with `is_pod` set. They share the
/// `/deployments` endpoints.
pub struct PodApi<'a> {
    client: &'a Client,
}

/// Clear the fields that have no effect on a pod, returning one warning per
/// cleared field. A spec that is not marked as a pod is rejected.
pub fn sanitize_pod_spec(spec: &mut Option<DeploymentUserSpec>) -> Result<Vec<String>> {
    let mut warnings = Vec::new();
    let Some(spec) = spec.as_mut() else {
        warnings.push("You have not specified a pod spec - is that intentional?".to_string());
        return Ok(warnings);
    };
    if spec.is_pod != Some(true) {
        return Err(Error::validation("The spec is not a pod spec."));
    }

    if spec.photon_namespace.is_some() || spec.photon_id.is_some() {
        warnings.push("Photon fields do not take effect in pod spec.".to_string());
        spec.photon_namespace = None;
        spec.photon_id = None;
    }
    if let Some(container) = spec.container.as_mut() {
        if container.ports.is_some() || container.command.is_some() {
            warnings.push(
                "Container port and command fields do not take effect in pod spec.".to_string(),
            );
            container.ports = None;
            container.command = None;
        }
    }
    if let Some(requirement) = spec.resource_requirement.as_mut() {
        if !matches!(requirement.min_replicas, None | Some(1)) {
            warnings.push("min_replicas does not take effect in pod spec.".to_string());
            requirement.min_replicas = Some(1);
        }
        if !matches!(requirement.max_replicas, None | Some(1)) {
            warnings.push("max_replicas does not take effect in pod spec.".to_string());
            requirement.max_replicas = Some(1);
        }
    }
    if spec.auto_scaler.is_some() {
        warnings.push("Auto scaler does not take effect in pod spec.".to_string());
        spec.auto_scaler = None;
    }
    if spec.api_tokens.is_some() {
        warnings.push("API tokens do not take effect in pod spec.".to_string());
        spec.api_tokens = None;
    }
    Ok(warnings)
}

impl<'a> PodApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Deployments marked as pods.
    pub fn list_all(&self) -> Result<Vec<Deployment>> {
        let deployments: Vec<Deployment> = ensure_list(self.client.get("/deployments").send()?)?;
        Ok(deployments.into_iter().filter(Deployment::is_pod).collect())
    }

    /// Sanitize and create. Returns the sanitization warnings, which are
    /// also logged.
    pub fn create(&self, mut pod: Deployment) -> Result<Vec<String>> {
        let warnings = sanitize_pod_spec(&mut pod.spec)?;
        for warning in &warnings {
            tracing::warn!("{warning}");
        }
        pod.validate()?;
        let body = safe_json(&pod)?;
        ensure_ok(self.client.post("/deployments").json(&body).send()?)?;
        Ok(warnings)
    }

    pub fn get(&self, id: &(impl AsResourceId + ?Sized)) -> Result<Deployment> {
        self.client.deployment().get(id)
    }

    /// Always fails: updating a pod loses its local storage.
    pub fn update(
        &self,
        _id: &(impl AsResourceId + ?Sized),
        _pod: &Deployment,
    ) -> Result<Deployment> {
        Err(Error::validation(
            "Updating a pod is not supported. Updating a pod will cause all pod resources \
             (including local storage) to be lost, and we strongly recommend you to be \
             careful in doing so.",
        ))
    }

    pub fn delete(&self, id: &(impl AsResourceId + ?Sized)) -> Result<()> {
        self.client.deployment().delete(id)
    }

    pub fn restart(&self, id: &(impl AsResourceId + ?Sized)) -> Result<Deployment> {
        self.client.deployment().restart(id)
    }

    pub fn get_readiness(&self, id: &(impl AsResourceId + ?Sized)) -> Result<ReadinessIssue> {
        self.client.deployment().get_readiness(id)
    }

    pub fn get_termination(
        &self,
        id: &(impl AsResourceId + ?Sized),
    ) -> Result<DeploymentTerminations> {
        self.client.deployment().get_termination(id)
    }

    /// Log of the pod's only replica.
    pub fn get_log(
        &self,
        id: &(impl AsResourceId + ?Sized),
        timeout: Option<Duration>,
    ) -> Result<LogStream> {
        let deployments = self.client.deployment();
        let replicas = deployments.get_replicas(id)?;
        let [replica] = replicas.as_slice() else {
            return Err(Error::Programming {
                status: 200,
                body: format!("{} replicas", replicas.len()),
                details: "number of replicas should be 1 for pods".to_string(),
            });
        };
        deployments.get_log(id, replica, timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AutoScaler, Container, ResourceRequirement, TokenVar};

    fn pod_spec() -> DeploymentUserSpec {
        DeploymentUserSpec {
            is_pod: Some(true),
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_spec_has_no_warnings() {
        let mut spec = Some(DeploymentUserSpec {
            resource_requirement: Some(ResourceRequirement {
                min_replicas: Some(1),
                ..Default::default()
            }),
            ..pod_spec()
        });
        assert!(sanitize_pod_spec(&mut spec).unwrap().is_empty());
    }

    #[test]
    fn test_one_warning_per_cleared_field() {
        let mut spec = Some(DeploymentUserSpec {
            photon_id: Some("p".into()),
            container: Some(Container {
                command: Some(vec!["sleep".into()]),
                ..Default::default()
            }),
            resource_requirement: Some(ResourceRequirement {
                min_replicas: Some(3),
                max_replicas: Some(3),
                ..Default::default()
            }),
            auto_scaler: Some(AutoScaler::default()),
            api_tokens: Some(vec![TokenVar::workspace_token()]),
            ..pod_spec()
        });
        let warnings = sanitize_pod_spec(&mut spec).unwrap();
        assert_eq!(warnings.len(), 6);

        let spec = spec.unwrap();
        assert_eq!(spec.photon_id, None);
        assert_eq!(spec.container.unwrap().command, None);
        let requirement = spec.resource_requirement.unwrap();
        assert_eq!(requirement.min_replicas, Some(1));
        assert_eq!(requirement.max_replicas, Some(1));
        assert!(spec.auto_scaler.is_none());
        assert!(spec.api_tokens.is_none());
    }

    #[test]
    fn test_non_pod_spec_rejected() {
        let mut spec = Some(DeploymentUserSpec::default());
        assert!(matches!(
            sanitize_pod_spec(&mut spec),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_missing_spec_warns() {
        let mut spec = None;
        assert_eq!(sanitize_pod_spec(&mut spec).unwrap().len(), 1);
    }
}
