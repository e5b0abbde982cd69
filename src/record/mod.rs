//! Local workspace record
//!
//! One YAML document under the cache directory holds every workspace the
//! user has logged into and which one is current:
//!
//! ```yaml
//! workspaces:
//!   my-ws:
//!     id: my-ws
//!     url: https://gateway.dgxc-lepton.nvidia.com/api/v2/workspaces/my-ws
//!     display_name: My Workspace
//!     auth_token: ...
//!     workspace_origin_url: https://gateway.dgxc-lepton.nvidia.com/api/v2/workspaces/my-ws
//!     is_lepton_classic: false
//!     token_expires_at: 1767225600
//! current_workspace: my-ws
//! ```
//!
//! Invariants after every operation:
//! - `current_workspace`, when set, is a key of `workspaces`
//! - every entry's `id` equals its key
//!
//! ```ignore
//! use lepton::record::{LoginParams, WorkspaceRecord};
//!
//! let record = WorkspaceRecord::global()?;
//! record.set(LoginParams::new("my-ws").token("secret"))?;
//! let client = record.client(None)?;
//! ```

mod internal;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::resolver::WorkspaceFlavor;

pub use internal::WorkspaceRecord;

/// One recorded workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalWorkspaceInfo {
    /// Equals the map key; back-filled from it for records written before
    /// the field existed
    #[serde(default)]
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub workspace_origin_url: Option<String>,
    #[serde(default)]
    pub is_lepton_classic: Option<bool>,
    #[serde(default)]
    pub token_expires_at: Option<i64>,
}

impl LocalWorkspaceInfo {
    pub fn flavor(&self) -> WorkspaceFlavor {
        WorkspaceFlavor::resolve(None, self.is_lepton_classic, Some(&self.url))
    }
}

/// On-disk shape of the record file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RecordFile {
    #[serde(default)]
    pub workspaces: BTreeMap<String, LocalWorkspaceInfo>,
    #[serde(default)]
    pub current_workspace: Option<String>,
}

impl RecordFile {
    /// Restore the invariants on a freshly parsed file.
    pub fn normalize(&mut self) {
        for (key, info) in self.workspaces.iter_mut() {
            if info.id.is_empty() {
                info.id = key.clone();
            }
        }
        if let Some(current) = &self.current_workspace {
            if !self.workspaces.contains_key(current) {
                tracing::warn!("current workspace {current} is not in the record, clearing it");
                self.current_workspace = None;
            }
        }
    }
}

/// Arguments to [`WorkspaceRecord::set`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginParams {
    pub workspace_id: String,
    pub token: Option<String>,
    pub url: Option<String>,
    pub origin_url: Option<String>,
    pub flavor: Option<WorkspaceFlavor>,
    /// Discard any recorded token expiry; the token may have been rotated
    pub could_be_new_token: bool,
}

impl LoginParams {
    pub fn new(workspace_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            ..Default::default()
        }
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into()).filter(|t| !t.is_empty());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into()).filter(|u| !u.is_empty());
        self
    }

    pub fn origin_url(mut self, origin_url: impl Into<String>) -> Self {
        self.origin_url = Some(origin_url.into()).filter(|u| !u.is_empty());
        self
    }

    pub fn flavor(mut self, flavor: WorkspaceFlavor) -> Self {
        self.flavor = Some(flavor);
        self
    }

    pub fn could_be_new_token(mut self, value: bool) -> Self {
        self.could_be_new_token = value;
        self
    }
}

/// Dashboard base URL for a unified API URL: the `gateway` host becomes
/// `dashboard`, the `/api/v2` prefix is dropped and `/workspaces` becomes
/// `/workspace`. Each replacement applies to the first occurrence only.
pub fn dashboard_base_url(api_url: &str) -> String {
    api_url
        .replacen("://gateway", "://dashboard", 1)
        .replacen("/api/v2", "", 1)
        .replacen("/workspaces", "/workspace", 1)
}

/// Guidance printed when a workspace exists but has not been set up.
pub fn not_created_yet_message(workspace_id: &str) -> String {
    format!(
        "Workspace {workspace_id} is registered, but not set up yet. To set it up, \
         Please visit\n  {}/workspace/{workspace_id}/setup\n After that, you can log \
         in here and use the workspace via CLI or API.",
        crate::config::DASHBOARD_URL
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_base_url() {
        assert_eq!(
            dashboard_base_url("https://gateway.dgxc-lepton.nvidia.com/api/v2/workspaces/ws1"),
            "https://dashboard.dgxc-lepton.nvidia.com/workspace/ws1"
        );
    }

    #[test]
    fn test_normalize_backfills_ids() {
        let mut file: RecordFile = serde_yaml::from_str(
            "workspaces:\n  old-ws:\n    url: https://x/api/v1\ncurrent_workspace: gone\n",
        )
        .unwrap();
        file.normalize();
        assert_eq!(file.workspaces["old-ws"].id, "old-ws");
        assert_eq!(file.current_workspace, None);
    }

    #[test]
    fn test_login_params_drop_empty_values() {
        let params = LoginParams::new("ws").token("").url("https://u");
        assert_eq!(params.token, None);
        assert_eq!(params.url.as_deref(), Some("https://u"));
    }
}
