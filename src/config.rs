//! Platform constants and environment configuration.
//!
//! Environment variables are read once into an [`EnvConfig`] snapshot when a
//! client or record operation starts, never per request.

use std::time::Duration;

use crate::error::{Error, Result};

/// Workspace id; may embed the token as `id:token`.
pub const ENV_WORKSPACE_ID: &str = "LEPTON_WORKSPACE_ID";
/// Bearer token.
pub const ENV_WORKSPACE_TOKEN: &str = "LEPTON_WORKSPACE_TOKEN";
/// Override for the resolved API base URL.
pub const ENV_WORKSPACE_URL: &str = "LEPTON_WORKSPACE_URL";
/// Override for the origin URL.
pub const ENV_WORKSPACE_ORIGIN_URL: &str = "LEPTON_WORKSPACE_ORIGIN_URL";
/// Comma separated `k=v` pairs injected into every request.
pub const ENV_DEBUG_HEADERS: &str = "LEPTON_DEBUG_HEADERS";
/// Log filter for the CLI.
pub const ENV_LOG: &str = "LEPTON_LOG";

/// Resolver endpoint for classic workspaces.
pub const CLASSIC_RESOLVER_URL: &str = "https://portal.lepton.ai/api/workspace";
/// API path appended to a classic workspace gateway URL.
pub const CLASSIC_API_PATH: &str = "/api/v1";
/// Fixed API base for unified workspaces.
pub const UNIFIED_API_BASE: &str = "https://gateway.dgxc-lepton.nvidia.com";
/// API path for unified workspaces; the workspace id is appended.
pub const UNIFIED_API_PATH: &str = "/api/v2/workspaces/";

/// Dashboard shown when a workspace exists but is not set up.
pub const DASHBOARD_URL: &str = "https://dashboard.lepton.ai";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
/// Default parallelism for `batch_fetch_nodes`.
pub const DEFAULT_NODE_FETCH_CONCURRENCY: usize = 8;
/// Page size used when list endpoints are auto-paginated.
pub const AUTO_PAGE_SIZE: u32 = 500;

/// Maximum KV key length in bytes.
pub const KV_MAX_KEY_LEN: usize = 256;
/// Maximum KV value (and queue message) length in bytes.
pub const KV_MAX_VALUE_LEN: usize = 256 * 1024;

/// Endpoints the resolver talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Classic resolver (`GET` with `{"id": ..}` body)
    pub classic_resolver_url: String,
    /// Base for unified workspaces (`<base><unified_api_path><id>`)
    pub unified_api_base: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            classic_resolver_url: CLASSIC_RESOLVER_URL.to_string(),
            unified_api_base: UNIFIED_API_BASE.to_string(),
        }
    }
}

impl ResolverConfig {
    /// Resolver config whose endpoints all live under one base URL (tests, private installs).
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            classic_resolver_url: format!("{base}/api/workspace"),
            unified_api_base: base.to_string(),
        }
    }

    /// `<unified base>/api/v2/workspaces/<id>`
    pub fn unified_workspace_url(&self, workspace_id: &str) -> String {
        format!("{}{}{}", self.unified_api_base, UNIFIED_API_PATH, workspace_id)
    }
}

/// Snapshot of the `LEPTON_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    pub workspace_id: Option<String>,
    pub token: Option<String>,
    pub url: Option<String>,
    pub origin_url: Option<String>,
    pub debug_headers: Option<String>,
}

impl EnvConfig {
    /// Read the process environment. Empty values count as unset.
    pub fn from_env() -> Self {
        Self {
            workspace_id: non_empty_var(ENV_WORKSPACE_ID),
            token: non_empty_var(ENV_WORKSPACE_TOKEN),
            url: non_empty_var(ENV_WORKSPACE_URL),
            origin_url: non_empty_var(ENV_WORKSPACE_ORIGIN_URL),
            debug_headers: non_empty_var(ENV_DEBUG_HEADERS),
        }
    }

    /// Parsed `LEPTON_DEBUG_HEADERS`, empty when unset.
    pub fn parsed_debug_headers(&self) -> Result<Vec<(String, String)>> {
        match &self.debug_headers {
            Some(raw) => parse_debug_headers(raw),
            None => Ok(Vec::new()),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Parse `k=v,k=v,...`. Every pair must contain exactly one `=` and a non-empty key.
pub fn parse_debug_headers(raw: &str) -> Result<Vec<(String, String)>> {
    let mut headers = Vec::new();
    for pair in raw.split(',') {
        let mut parts = pair.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) if !key.trim().is_empty() => {
                headers.push((key.trim().to_string(), value.trim().to_string()));
            }
            _ => {
                return Err(Error::configuration(format!(
                    "{ENV_DEBUG_HEADERS} should be in the format of comma separated \
                     header_key=header_value pairs. Got {raw}"
                )))
            }
        }
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_debug_headers() {
        let headers = parse_debug_headers("x-a=1,x-b=two").unwrap();
        assert_eq!(
            headers,
            vec![
                ("x-a".to_string(), "1".to_string()),
                ("x-b".to_string(), "two".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_debug_headers_malformed() {
        for raw in ["x-a", "x-a=1,broken", "a=b=c", "=v"] {
            let err = parse_debug_headers(raw).unwrap_err();
            assert!(matches!(err, Error::WorkspaceConfiguration { .. }), "{raw}");
            assert!(err.to_string().contains(ENV_DEBUG_HEADERS));
        }
    }

    #[test]
    fn test_resolver_config_with_base() {
        let cfg = ResolverConfig::with_base("http://127.0.0.1:9000/");
        assert_eq!(cfg.classic_resolver_url, "http://127.0.0.1:9000/api/workspace");
        assert_eq!(
            cfg.unified_workspace_url("ws1"),
            "http://127.0.0.1:9000/api/v2/workspaces/ws1"
        );
    }
}
