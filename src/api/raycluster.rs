use serde_json::{Map, Value};

use super::safe_json;
use crate::client::{ensure_list, ensure_ok, ensure_type, Client};
use crate::error::{Error, Result};
use crate::types::{AsResourceId, RayCluster, Validate};

/// Which ray cluster updates are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RayUpdatePolicy {
    /// One worker group; only `group_name` and a positive `min_replicas`.
    #[default]
    Strict,
    /// Any number of worker groups with `min_replicas` and an optional
    /// positive `max_replicas`, and/or a `suspend` flag.
    Extended,
}

/// `/rayclusters`
pub struct RayClusterApi<'a> {
    client: &'a Client,
}

impl<'a> RayClusterApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list_all(&self) -> Result<Vec<RayCluster>> {
        ensure_list(self.client.get("/rayclusters").send()?)
    }

    pub fn create(&self, cluster: &RayCluster) -> Result<()> {
        cluster.validate()?;
        let body = safe_json(cluster)?;
        ensure_ok(self.client.post("/rayclusters").json(&body).send()?)
    }

    pub fn get(&self, id: &(impl AsResourceId + ?Sized)) -> Result<RayCluster> {
        let path = format!("/rayclusters/{}", id.resource_id()?);
        ensure_type(self.client.get(&path).send()?)
    }

    /// Update under [`RayUpdatePolicy::Strict`].
    pub fn update(&self, id: &(impl AsResourceId + ?Sized), cluster: &RayCluster) -> Result<RayCluster> {
        self.update_with(id, cluster, RayUpdatePolicy::Strict)
    }

    pub fn update_with(
        &self,
        id: &(impl AsResourceId + ?Sized),
        cluster: &RayCluster,
        policy: RayUpdatePolicy,
    ) -> Result<RayCluster> {
        if cluster.spec.is_none() {
            return Err(Error::validation("RayCluster.spec must not be None for update."));
        }
        self.update_raw(id, safe_json(cluster)?, policy)
    }

    /// Validate an untyped payload and send it verbatim.
    pub fn update_raw(
        &self,
        id: &(impl AsResourceId + ?Sized),
        payload: Value,
        policy: RayUpdatePolicy,
    ) -> Result<RayCluster> {
        validate_update_payload(&payload, policy)?;
        let path = format!("/rayclusters/{}", id.resource_id()?);
        ensure_type(self.client.patch(&path).json(&payload).send()?)
    }

    pub fn delete(&self, id: &(impl AsResourceId + ?Sized)) -> Result<()> {
        let path = format!("/rayclusters/{}", id.resource_id()?);
        ensure_ok(self.client.delete(&path).send()?)
    }
}

/// Check an update payload before it is sent. Every rejection names the
/// offending field.
pub fn validate_update_payload(payload: &Value, policy: RayUpdatePolicy) -> Result<()> {
    let top = as_object(payload, "Update payload")?;
    let unexpected = unexpected_keys(top, &["spec"]);
    if !unexpected.is_empty() {
        return Err(Error::validation(format!(
            "Only updating via top-level 'spec' is supported. Unexpected fields in payload: {unexpected}"
        )));
    }
    let spec = match top.get("spec") {
        Some(Value::Object(spec)) => spec,
        _ => {
            return Err(Error::validation(
                "Update payload must include top-level 'spec' object.",
            ))
        }
    };

    match policy {
        RayUpdatePolicy::Strict => validate_strict_spec(spec),
        RayUpdatePolicy::Extended => validate_extended_spec(spec),
    }
}

fn validate_strict_spec(spec: &Map<String, Value>) -> Result<()> {
    let unexpected = unexpected_keys(spec, &["worker_group_specs"]);
    if !unexpected.is_empty() {
        return Err(Error::validation(format!(
            "Only updating worker_group_specs.min_replicas is supported. Unexpected fields in spec: {unexpected}"
        )));
    }
    let groups = match spec.get("worker_group_specs") {
        Some(Value::Array(groups)) => groups,
        Some(_) => {
            return Err(Error::validation(
                "spec.worker_group_specs must be a list of group specs",
            ))
        }
        None => return Err(Error::validation("spec.worker_group_specs is required")),
    };
    let [group] = groups.as_slice() else {
        return Err(Error::validation(format!(
            "spec.worker_group_specs must contain exactly one group, found {}",
            groups.len()
        )));
    };

    let field = "spec.worker_group_specs[0]";
    let group = as_object(group, field)?;
    let unexpected = unexpected_keys(group, &["group_name", "min_replicas"]);
    if !unexpected.is_empty() {
        return Err(Error::validation(format!(
            "{field} may only include group_name and min_replicas. Unexpected fields: {unexpected}"
        )));
    }
    validate_group_name(group, field, false)?;
    match group.get("min_replicas").and_then(Value::as_i64) {
        Some(min) if min > 0 => Ok(()),
        Some(_) => Err(Error::validation(format!(
            "{field}.min_replicas must be a positive integer"
        ))),
        None => Err(Error::validation(format!(
            "{field}.min_replicas is required and must be an integer"
        ))),
    }
}

fn validate_extended_spec(spec: &Map<String, Value>) -> Result<()> {
    let unexpected = unexpected_keys(spec, &["worker_group_specs", "suspend"]);
    if !unexpected.is_empty() {
        return Err(Error::validation(format!(
            "Only updating worker_group_specs.(min_replicas,max_replicas) and 'suspend' is \
             supported. Unexpected fields in spec: {unexpected}"
        )));
    }
    if !spec.contains_key("worker_group_specs") && !spec.contains_key("suspend") {
        return Err(Error::validation(
            "spec must include at least one of 'worker_group_specs' or 'suspend'",
        ));
    }
    if let Some(suspend) = spec.get("suspend") {
        if !suspend.is_boolean() {
            return Err(Error::validation("spec.suspend must be a boolean value"));
        }
    }
    let Some(groups) = spec.get("worker_group_specs") else {
        return Ok(());
    };
    let Value::Array(groups) = groups else {
        return Err(Error::validation(
            "spec.worker_group_specs must be a list of group specs",
        ));
    };
    if groups.is_empty() {
        return Err(Error::validation(
            "spec.worker_group_specs must contain at least one group to update",
        ));
    }

    for (idx, group) in groups.iter().enumerate() {
        let field = format!("spec.worker_group_specs[{idx}]");
        let group = as_object(group, &field)?;
        let unexpected = unexpected_keys(group, &["group_name", "min_replicas", "max_replicas"]);
        if !unexpected.is_empty() {
            return Err(Error::validation(format!(
                "{field} may only include group_name, min_replicas and max_replicas. \
                 Unexpected fields: {unexpected}"
            )));
        }
        match group.get("min_replicas") {
            None => return Err(Error::validation(format!("{field}.min_replicas is required"))),
            Some(value) => match value.as_i64() {
                Some(min) if min >= 0 => {}
                Some(_) => {
                    return Err(Error::validation(format!(
                        "{field}.min_replicas must be a non-negative integer"
                    )))
                }
                None => {
                    return Err(Error::validation(format!(
                        "{field}.min_replicas must be an integer"
                    )))
                }
            },
        }
        if let Some(max) = group.get("max_replicas").filter(|v| !v.is_null()) {
            match max.as_i64() {
                Some(max) if max > 0 => {}
                Some(_) => {
                    return Err(Error::validation(format!(
                        "{field}.max_replicas must be a positive integer"
                    )))
                }
                None => {
                    return Err(Error::validation(format!(
                        "{field}.max_replicas must be an integer"
                    )))
                }
            }
        }
        validate_group_name(group, &field, true)?;
    }
    Ok(())
}

fn validate_group_name(group: &Map<String, Value>, field: &str, required: bool) -> Result<()> {
    match group.get("group_name") {
        None if required => Err(Error::validation(format!("{field}.group_name is required"))),
        None | Some(Value::Null) | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(Error::validation(format!("{field}.group_name must be a string"))),
    }
}

fn as_object<'v>(value: &'v Value, field: &str) -> Result<&'v Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::validation(format!("{field} must be an object")))
}

/// Sorted, comma separated keys of `map` outside `allowed`; empty when none.
fn unexpected_keys(map: &Map<String, Value>, allowed: &[&str]) -> String {
    let mut keys: Vec<&str> = map
        .keys()
        .map(String::as_str)
        .filter(|k| !allowed.contains(k))
        .collect();
    keys.sort_unstable();
    keys.join(", ")
}
