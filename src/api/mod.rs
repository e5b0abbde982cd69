//! Resource facades
//!
//! Each facade borrows the [`Client`] and owns nothing else. Methods accept
//! anything implementing [`AsResourceId`], so a bare id and a typed entity
//! are interchangeable:
//!
//! ```ignore
//! let client = Client::current()?;
//! let web = client.deployment().get("web")?;
//! client.deployment().restart(&web)?;
//! ```
//!
//! Transport and HTTP errors are returned as-is; facades never retry.
//!
//! [`AsResourceId`]: crate::types::AsResourceId

mod deployment;
mod finetune;
mod ingress;
mod job;
mod kv;
mod nodegroup;
mod object_storage;
mod photon;
mod pod;
mod queue;
mod raycluster;
mod secret;
mod storage;
mod template;

use serde::Serialize;
use serde_json::Value;

use crate::client::Client;
use crate::error::Result;

pub use deployment::DeploymentApi;
pub use finetune::FineTuneApi;
pub use ingress::IngressApi;
pub use job::{JobApi, JobListQuery};
pub use kv::KvApi;
pub use nodegroup::NodeGroupApi;
pub use object_storage::ObjectStorageApi;
pub use photon::PhotonApi;
pub use pod::{sanitize_pod_spec, PodApi};
pub use queue::QueueApi;
pub use raycluster::{validate_update_payload, RayClusterApi, RayUpdatePolicy};
pub use secret::SecretApi;
pub use storage::StorageApi;
pub use template::TemplateApi;

impl Client {
    pub fn photon(&self) -> PhotonApi<'_> {
        PhotonApi::new(self)
    }

    pub fn deployment(&self) -> DeploymentApi<'_> {
        DeploymentApi::new(self)
    }

    pub fn pod(&self) -> PodApi<'_> {
        PodApi::new(self)
    }

    pub fn job(&self) -> JobApi<'_> {
        JobApi::new(self)
    }

    pub fn finetune(&self) -> FineTuneApi<'_> {
        FineTuneApi::new(self)
    }

    pub fn raycluster(&self) -> RayClusterApi<'_> {
        RayClusterApi::new(self)
    }

    pub fn template(&self) -> TemplateApi<'_> {
        TemplateApi::new(self)
    }

    pub fn storage(&self) -> StorageApi<'_> {
        StorageApi::new(self)
    }

    pub fn object_storage(&self) -> ObjectStorageApi<'_> {
        ObjectStorageApi::new(self)
    }

    pub fn kv(&self) -> KvApi<'_> {
        KvApi::new(self)
    }

    pub fn queue(&self) -> QueueApi<'_> {
        QueueApi::new(self)
    }

    pub fn secret(&self) -> SecretApi<'_> {
        SecretApi::new(self)
    }

    pub fn nodegroup(&self) -> NodeGroupApi<'_> {
        NodeGroupApi::new(self)
    }

    pub fn ingress(&self) -> IngressApi<'_> {
        IngressApi::new(self)
    }
}

/// JSON body with every null leaf removed, at any depth.
pub(crate) fn safe_json<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    let mut json = serde_json::to_value(value)?;
    strip_nulls(&mut json);
    Ok(json)
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

/// Fetch pages `1, 2, ...` of `page_size` items until one comes back empty.
pub(crate) fn paginate<T, F>(page_size: u32, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(u32, u32) -> Result<Vec<T>>,
{
    let mut all = Vec::new();
    let mut page = 1;
    loop {
        let items = fetch(page, page_size)?;
        if items.is_empty() {
            return Ok(all);
        }
        all.extend(items);
        page += 1;
    }
}

/// `public` / `private` path segment.
pub(crate) fn visibility(public: bool) -> &'static str {
    if public {
        "public"
    } else {
        "private"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_safe_json_strips_nested_nulls() {
        let value = json!({"a": null, "b": {"c": null, "d": 1}, "e": [{"f": null}]});
        assert_eq!(safe_json(&value).unwrap(), json!({"b": {"d": 1}, "e": [{}]}));
    }

    #[test]
    fn test_paginate_stops_at_first_empty_page() {
        let pages = [vec![1, 2], vec![3], vec![], vec![4]];
        let mut calls = Vec::new();
        let all = paginate(2, |page, size| {
            calls.push((page, size));
            Ok(pages[(page - 1) as usize].clone())
        })
        .unwrap();
        assert_eq!(all, vec![1, 2, 3]);
        assert_eq!(calls, vec![(1, 2), (2, 2), (3, 2)]);
    }
}
