use std::io;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::client::{ensure_list, ensure_type, Client};
use crate::config::DEFAULT_NODE_FETCH_CONCURRENCY;
use crate::error::{Error, Result};
use crate::types::{AsResourceId, DedicatedNodeGroup, Node};

/// `/dedicated-node-groups`
pub struct NodeGroupApi<'a> {
    client: &'a Client,
}

impl<'a> NodeGroupApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list_all(&self) -> Result<Vec<DedicatedNodeGroup>> {
        ensure_list(self.client.get("/dedicated-node-groups").send()?)
    }

    pub fn get(&self, id: &(impl AsResourceId + ?Sized)) -> Result<DedicatedNodeGroup> {
        let path = format!("/dedicated-node-groups/{}", id.resource_id()?);
        ensure_type(self.client.get(&path).send()?)
    }

    pub fn list_nodes(&self, id: &(impl AsResourceId + ?Sized)) -> Result<Vec<Node>> {
        let path = format!("/dedicated-node-groups/{}/nodes", id.resource_id()?);
        ensure_list(self.client.get(&path).send()?)
    }

    /// Nodes that are schedulable and run no workloads.
    pub fn list_idle_nodes(&self, id: &(impl AsResourceId + ?Sized)) -> Result<Vec<Node>> {
        let nodes = self.list_nodes(id)?;
        Ok(nodes.into_iter().filter(Node::is_idle).collect())
    }

    /// Nodes of every group, in input order, with at most `concurrency`
    /// requests in flight (default 8). The first failure is returned and
    /// groups not yet started are skipped.
    pub fn batch_fetch_nodes<G>(
        &self,
        groups: &[G],
        concurrency: Option<usize>,
    ) -> Result<Vec<Vec<Node>>>
    where
        G: AsResourceId + Sync,
    {
        let pool = fetch_pool(concurrency)?;
        pool.install(|| groups.par_iter().map(|g| self.list_nodes(g)).collect())
    }

    /// Like [`batch_fetch_nodes`](Self::batch_fetch_nodes), but every group
    /// is fetched and failures are returned in place.
    pub fn batch_fetch_nodes_each<G>(
        &self,
        groups: &[G],
        concurrency: Option<usize>,
    ) -> Result<Vec<Result<Vec<Node>>>>
    where
        G: AsResourceId + Sync,
    {
        let pool = fetch_pool(concurrency)?;
        Ok(pool.install(|| groups.par_iter().map(|g| self.list_nodes(g)).collect()))
    }
}

fn fetch_pool(concurrency: Option<usize>) -> Result<ThreadPool> {
    let threads = concurrency.unwrap_or(DEFAULT_NODE_FETCH_CONCURRENCY).max(1);
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("lepton-node-fetch-{i}"))
        .build()
        .map_err(|e| Error::Io(io::Error::other(e)))
}
