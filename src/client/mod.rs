//! Typed workspace client
//!
//! A [`Client`] is a long-lived handle on one workspace: its id, API base
//! URL, optional bearer token and a persistent HTTP session. Each identity
//! field is taken from the first source that has it:
//!
//! 1. explicit builder argument
//! 2. `LEPTON_WORKSPACE_*` environment variables
//! 3. the workspace record entry for the resolved id
//! 4. (url only) the resolver
//!
//! An id of the form `<id>:<token>` is split when no token was given
//! explicitly.
//!
//! ```ignore
//! use lepton::client::Client;
//!
//! let client = Client::builder().workspace_id("my-ws").token("secret").build()?;
//! for deployment in client.deployment().list_all()? {
//!     println!("{}", deployment.name().unwrap_or("-"));
//! }
//! ```

mod request;
mod response;
mod session;
mod stream;

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use regex::Regex;
use reqwest::blocking::Client as HttpClient;
use reqwest::Method;

use crate::config::{EnvConfig, DEFAULT_TIMEOUT};
use crate::error::{Error, Result, WorkspaceContext};
use crate::record::{dashboard_base_url, WorkspaceRecord};
use crate::resolver::{self, origin_url_for, Resolver, WorkspaceFlavor};
use crate::types::WorkspaceInfo;

pub use request::Request;
pub use response::{
    check_status, ensure_bytes, ensure_json, ensure_list, ensure_list_at, ensure_list_strict,
    ensure_ok, ensure_text, ensure_type,
};
pub use stream::{stream_to_file, LogStream};

fn semver_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)").expect("Invalid semver regex"))
}

/// Handle on one workspace's API.
#[derive(Clone)]
pub struct Client {
    workspace_id: String,
    url: String,
    token: Option<String>,
    origin_url: Option<String>,
    flavor: WorkspaceFlavor,
    display_name: Option<String>,
    timeout: Option<Duration>,
    http: HttpClient,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("workspace_id", &self.workspace_id)
            .field("url", &self.url)
            .field("flavor", &self.flavor)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl Client {
    pub fn builder<'a>() -> ClientBuilder<'a> {
        ClientBuilder::default()
    }

    /// Client for the current workspace of the global record.
    pub fn current() -> Result<Self> {
        Self::builder().build()
    }

    pub fn get(&self, path: &str) -> Request {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> Request {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> Request {
        self.request(Method::PUT, path)
    }

    pub fn patch(&self, path: &str) -> Request {
        self.request(Method::PATCH, path)
    }

    pub fn delete(&self, path: &str) -> Request {
        self.request(Method::DELETE, path)
    }

    pub fn head(&self, path: &str) -> Request {
        self.request(Method::HEAD, path)
    }

    /// `path` is appended to the API base URL verbatim.
    pub fn request(&self, method: Method, path: &str) -> Request {
        let url = format!("{}{}", self.url, path);
        let label = format!("{method} {url}");
        let builder = self.http.request(method, &url);
        Request::new(builder, self.timeout, self.token.is_some(), label)
    }

    /// Same client with a different default request timeout; `None` waits
    /// indefinitely.
    pub fn with_timeout(&self, timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    /// `GET /workspace`. Auth failures map to workspace-level errors.
    pub fn info(&self) -> Result<WorkspaceInfo> {
        let response = self.get("/workspace").send()?;
        let context = || {
            WorkspaceContext::new(
                Some(&self.workspace_id),
                Some(&self.url),
                self.token.as_deref(),
            )
        };
        match response.status().as_u16() {
            401 => Err(Error::WorkspaceUnauthorized(context())),
            403 => Err(Error::WorkspaceForbidden(context())),
            404 => Err(Error::WorkspaceNotFound(context())),
            _ => ensure_type(response),
        }
    }

    /// Server version parsed from the `git_commit` the workspace reports.
    pub fn version(&self) -> Result<Option<(u32, u32, u32)>> {
        let info = self.info()?;
        Ok(parse_version(&info.git_commit))
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn get_workspace_id(&self) -> &str {
        &self.workspace_id
    }

    /// Display name recorded for this workspace at login.
    pub fn get_workspace_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn origin_url(&self) -> Option<&str> {
        self.origin_url.as_deref()
    }

    pub fn flavor(&self) -> WorkspaceFlavor {
        self.flavor
    }

    pub fn get_dashboard_base_url(&self) -> Option<String> {
        if self.flavor.is_classic() {
            return None;
        }
        Some(dashboard_base_url(&self.url))
    }
}

fn parse_version(git_commit: &str) -> Option<(u32, u32, u32)> {
    let caps = semver_regex().captures(git_commit)?;
    let part = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();
    Some((part(1)?, part(2)?, part(3)?))
}

#[derive(Default)]
enum RecordSource<'a> {
    #[default]
    Global,
    Given(&'a WorkspaceRecord),
    Disabled,
}

/// Builder for [`Client`]. Unset fields fall through the precedence chain
/// described in the module docs.
#[derive(Default)]
pub struct ClientBuilder<'a> {
    workspace_id: Option<String>,
    token: Option<String>,
    url: Option<String>,
    origin_url: Option<String>,
    flavor: Option<WorkspaceFlavor>,
    env: Option<EnvConfig>,
    record: RecordSource<'a>,
    resolver: Option<Arc<Resolver>>,
    timeout: Option<Option<Duration>>,
}

impl<'a> ClientBuilder<'a> {
    pub fn workspace_id(mut self, id: impl Into<String>) -> Self {
        self.workspace_id = Some(id.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn origin_url(mut self, origin_url: impl Into<String>) -> Self {
        self.origin_url = Some(origin_url.into());
        self
    }

    pub fn flavor(mut self, flavor: WorkspaceFlavor) -> Self {
        self.flavor = Some(flavor);
        self
    }

    /// Use this environment snapshot instead of reading the process env.
    pub fn env(mut self, env: EnvConfig) -> Self {
        self.env = Some(env);
        self
    }

    pub fn record(mut self, record: &'a WorkspaceRecord) -> Self {
        self.record = RecordSource::Given(record);
        self
    }

    /// Skip the workspace record entirely.
    pub fn without_record(mut self) -> Self {
        self.record = RecordSource::Disabled;
        self
    }

    pub fn resolver(mut self, resolver: Arc<Resolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Default per-request timeout; `None` waits indefinitely.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<Client> {
        let env = self.env.unwrap_or_else(EnvConfig::from_env);
        let record = match self.record {
            RecordSource::Given(record) => Some(record),
            RecordSource::Disabled => None,
            RecordSource::Global => match WorkspaceRecord::global() {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Ignoring the workspace record, it could not be loaded: {e}");
                    None
                }
            },
        };

        let mut token = non_empty(self.token);
        let mut workspace_id = non_empty(self.workspace_id)
            .or_else(|| env.workspace_id.clone())
            .or_else(|| record.and_then(|r| r.current_workspace_id()));
        if token.is_none() {
            if let Some((id, secret)) = workspace_id.as_deref().and_then(|c| c.split_once(':')) {
                token = Some(secret.to_string());
                workspace_id = Some(id.to_string());
            }
        }
        let workspace_id = non_empty(workspace_id).ok_or_else(|| {
            Error::configuration(
                "No workspace id found. Pass one explicitly, set LEPTON_WORKSPACE_ID or log in first.",
            )
        })?;

        let entry = record.and_then(|r| r.get(&workspace_id));
        let token = non_empty(
            token
                .or_else(|| env.token.clone())
                .or_else(|| entry.as_ref().and_then(|e| e.auth_token.clone())),
        );
        let url = non_empty(self.url)
            .or_else(|| env.url.clone())
            .or_else(|| entry.as_ref().map(|e| e.url.clone()));
        let flavor = WorkspaceFlavor::resolve(
            self.flavor,
            entry.as_ref().and_then(|e| e.is_lepton_classic),
            url.as_deref(),
        );
        let url = match non_empty(url) {
            Some(url) => url,
            None => {
                let resolver = match (self.resolver, record) {
                    (Some(resolver), _) => resolver,
                    (None, Some(record)) => record.resolver().clone(),
                    (None, None) => resolver::global()?,
                };
                resolver.resolve_api_url(&workspace_id, flavor)?
            }
        };
        let origin_url = non_empty(self.origin_url)
            .or_else(|| env.origin_url.clone())
            .or_else(|| entry.as_ref().and_then(|e| e.workspace_origin_url.clone()))
            .or_else(|| origin_url_for(&url));

        let debug_headers = env.parsed_debug_headers()?;
        let headers =
            session::default_headers(token.as_deref(), origin_url.as_deref(), &debug_headers)?;
        let http = session::build(headers)?;

        Ok(Client {
            workspace_id,
            url: url.trim_end_matches('/').to_string(),
            token,
            origin_url,
            flavor,
            display_name: entry.and_then(|e| e.display_name),
            timeout: self.timeout.unwrap_or(Some(DEFAULT_TIMEOUT)),
            http,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline() -> ClientBuilder<'static> {
        Client::builder().env(EnvConfig::default()).without_record()
    }

    #[test]
    fn test_credential_split() {
        let client = offline()
            .workspace_id("wsA:tok-xyz")
            .url("http://127.0.0.1:1/api/v1")
            .build()
            .unwrap();
        assert_eq!(client.get_workspace_id(), "wsA");
        assert_eq!(client.token(), Some("tok-xyz"));
    }

    #[test]
    fn test_explicit_token_prevents_split() {
        let client = offline()
            .workspace_id("wsA:tok-xyz")
            .token("other")
            .url("http://127.0.0.1:1/api/v1")
            .build()
            .unwrap();
        assert_eq!(client.get_workspace_id(), "wsA:tok-xyz");
        assert_eq!(client.token(), Some("other"));
    }

    #[test]
    fn test_missing_id_is_configuration_error() {
        assert!(matches!(
            offline().build(),
            Err(Error::WorkspaceConfiguration { .. })
        ));
    }

    #[test]
    fn test_env_fills_unset_fields() {
        let env = EnvConfig {
            workspace_id: Some("env-ws".into()),
            token: Some("env-tok".into()),
            url: Some("https://env.example/api".into()),
            ..Default::default()
        };
        let client = Client::builder().env(env).without_record().build().unwrap();
        assert_eq!(client.get_workspace_id(), "env-ws");
        assert_eq!(client.token(), Some("env-tok"));
        assert_eq!(client.url(), "https://env.example/api");
    }

    #[test]
    fn test_unified_url_needs_no_network() {
        let client = offline()
            .workspace_id("ws1")
            .flavor(WorkspaceFlavor::Unified)
            .resolver(Arc::new(Resolver::new(Default::default()).unwrap()))
            .build()
            .unwrap();
        assert_eq!(
            client.url(),
            "https://gateway.dgxc-lepton.nvidia.com/api/v2/workspaces/ws1"
        );
        assert_eq!(client.origin_url(), Some(client.url()));
        assert_eq!(
            client.get_dashboard_base_url().as_deref(),
            Some("https://dashboard.dgxc-lepton.nvidia.com/workspace/ws1")
        );
    }

    #[test]
    fn test_malformed_debug_headers_fail_construction() {
        let env = EnvConfig {
            debug_headers: Some("broken".into()),
            ..Default::default()
        };
        let result = Client::builder()
            .env(env)
            .without_record()
            .workspace_id("ws1")
            .url("http://127.0.0.1:1")
            .build();
        assert!(matches!(result, Err(Error::WorkspaceConfiguration { .. })));
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("release-0.26.3-abcdef"), Some((0, 26, 3)));
        assert_eq!(parse_version("abcdef"), None);
    }
}
