use std::time::Duration;

use super::{paginate, safe_json};
use crate::client::{ensure_list, ensure_list_at, ensure_ok, ensure_type, Client, LogStream};
use crate::config::AUTO_PAGE_SIZE;
use crate::error::{Error, Result};
use crate::types::{AsResourceId, Job, JobQueryMode, Replica, Validate, WorkloadEvent};

/// Filters shared by the job and fine-tune list endpoints.
///
/// Leaving both `page` and `page_size` unset fetches every page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobListQuery {
    pub query_mode: JobQueryMode,
    pub q: Option<String>,
    pub query: Option<String>,
    pub status: Vec<String>,
    pub node_groups: Vec<String>,
    pub created_by: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl JobListQuery {
    pub fn mode(query_mode: JobQueryMode) -> Self {
        Self {
            query_mode,
            ..Default::default()
        }
    }

    /// Query pairs without paging; repeated keys for list filters.
    pub(crate) fn filter_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("job_query_mode", self.query_mode.as_str().to_string())];
        if let Some(q) = self.q.as_ref().filter(|q| !q.is_empty()) {
            params.push(("q", q.clone()));
        }
        if let Some(query) = self.query.as_ref().filter(|q| !q.is_empty()) {
            params.push(("query", query.clone()));
        }
        params.extend(self.status.iter().map(|s| ("status", s.clone())));
        params.extend(self.node_groups.iter().map(|g| ("node_groups", g.clone())));
        if let Some(created_by) = self.created_by.as_ref().filter(|c| !c.is_empty()) {
            params.push(("created_by", created_by.clone()));
        }
        params
    }

    pub(crate) fn is_paged(&self) -> bool {
        self.page.is_some() || self.page_size.is_some()
    }

    /// Single request for an explicit page, or every page in turn.
    pub(crate) fn fetch<T, F>(&self, mut fetch_page: F) -> Result<Vec<T>>
    where
        F: FnMut(&[(&'static str, String)]) -> Result<Vec<T>>,
    {
        let base = self.filter_params();
        if self.is_paged() {
            let mut params = base;
            if let Some(page) = self.page {
                params.push(("page", page.to_string()));
            }
            if let Some(page_size) = self.page_size {
                params.push(("page_size", page_size.to_string()));
            }
            return fetch_page(&params);
        }
        paginate(AUTO_PAGE_SIZE, |page, page_size| {
            let mut params = base.clone();
            params.push(("page", page.to_string()));
            params.push(("page_size", page_size.to_string()));
            fetch_page(&params)
        })
    }
}

/// `/jobs`
pub struct JobApi<'a> {
    client: &'a Client,
}

impl<'a> JobApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list_all(&self, query: &JobListQuery) -> Result<Vec<Job>> {
        query.fetch(|params| ensure_list_at(self.client.get("/jobs").query(params).send()?, "jobs"))
    }

    pub fn create(&self, job: &Job) -> Result<Job> {
        job.validate()?;
        let body = safe_json(job)?;
        ensure_type(self.client.post("/jobs").json(&body).send()?)
    }

    pub fn get(&self, id: &(impl AsResourceId + ?Sized)) -> Result<Job> {
        self.get_with_mode(id, JobQueryMode::AliveOnly)
    }

    pub fn get_with_mode(
        &self,
        id: &(impl AsResourceId + ?Sized),
        mode: JobQueryMode,
    ) -> Result<Job> {
        let path = format!("/jobs/{}", id.resource_id()?);
        let request = self.client.get(&path).query(&[("job_query_mode", mode.as_str())]);
        ensure_type(request.send()?)
    }

    /// Jobs cannot be changed once submitted.
    pub fn update(&self, _id: &(impl AsResourceId + ?Sized), _job: &Job) -> Result<Job> {
        Err(Error::validation("updating a job is not supported"))
    }

    pub fn delete(&self, id: &(impl AsResourceId + ?Sized)) -> Result<()> {
        let path = format!("/jobs/{}", id.resource_id()?);
        ensure_ok(self.client.delete(&path).send()?)
    }

    pub fn get_events(&self, id: &(impl AsResourceId + ?Sized)) -> Result<Vec<WorkloadEvent>> {
        let path = format!("/jobs/{}/events", id.resource_id()?);
        ensure_list(self.client.get(&path).send()?)
    }

    pub fn get_replicas(&self, id: &(impl AsResourceId + ?Sized)) -> Result<Vec<Replica>> {
        let path = format!("/jobs/{}/replicas", id.resource_id()?);
        ensure_list(self.client.get(&path).send()?)
    }

    pub fn get_log(
        &self,
        id: &(impl AsResourceId + ?Sized),
        replica: &(impl AsResourceId + ?Sized),
        timeout: Option<Duration>,
    ) -> Result<LogStream> {
        let path = format!(
            "/jobs/{}/replicas/{}/log",
            id.resource_id()?,
            replica.resource_id()?
        );
        let request = match timeout {
            Some(timeout) => self.client.get(&path).timeout(timeout),
            None => self.client.get(&path).no_timeout(),
        };
        LogStream::from_response(request.send()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_params_repeat_list_filters() {
        let query = JobListQuery {
            q: Some("train".into()),
            status: vec!["Running".into(), "Failed".into()],
            node_groups: vec!["ng".into()],
            ..JobListQuery::mode(JobQueryMode::AliveAndArchive)
        };
        let params = query.filter_params();
        assert_eq!(
            params,
            vec![
                ("job_query_mode", "alive_and_archive".to_string()),
                ("q", "train".to_string()),
                ("status", "Running".to_string()),
                ("status", "Failed".to_string()),
                ("node_groups", "ng".to_string()),
            ]
        );
    }

    #[test]
    fn test_explicit_page_is_single_request() {
        let query = JobListQuery {
            page: Some(3),
            ..Default::default()
        };
        let mut calls = 0;
        let items: Vec<u8> = query
            .fetch(|params| {
                calls += 1;
                assert!(params.contains(&("page", "3".to_string())));
                assert!(!params.iter().any(|(k, _)| *k == "page_size"));
                Ok(vec![1])
            })
            .unwrap();
        assert_eq!(items, vec![1]);
        assert_eq!(calls, 1);
    }
}
