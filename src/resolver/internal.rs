//! Resolver HTTP calls and the classic URL cache

use std::collections::HashMap;

use parking_lot::Mutex;
use reqwest::blocking::{Client as HttpClient, Response};
use serde_json::{json, Value};

use super::WorkspaceFlavor;
use crate::config::{ResolverConfig, CLASSIC_API_PATH, DEFAULT_TIMEOUT};
use crate::error::{Error, Result, WorkspaceContext};

/// Resolves workspace ids into API URLs, display names and token expiry.
pub struct Resolver {
    config: ResolverConfig,
    http: HttpClient,
    /// Classic gateway URLs by workspace id
    cache: Mutex<HashMap<String, String>>,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Result<Self> {
        let http = HttpClient::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            config,
            http,
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// API base URL for a workspace.
    ///
    /// Unified workspaces need no network call. Classic workspaces ask the
    /// resolver endpoint once per process; later calls reuse the cached
    /// gateway unless it no longer parses as an http(s) URL.
    pub fn resolve_api_url(&self, workspace_id: &str, flavor: WorkspaceFlavor) -> Result<String> {
        match flavor {
            WorkspaceFlavor::Unified => Ok(self.config.unified_workspace_url(workspace_id)),
            WorkspaceFlavor::Classic => {
                let gateway = self.classic_gateway(workspace_id)?;
                Ok(format!("{gateway}{CLASSIC_API_PATH}"))
            }
        }
    }

    /// Drop the cached classic gateway so the next resolution asks again.
    pub fn invalidate(&self, workspace_id: &str) {
        self.cache.lock().remove(workspace_id);
    }

    fn classic_gateway(&self, workspace_id: &str) -> Result<String> {
        if let Some(url) = self.cache.lock().get(workspace_id) {
            if is_valid_url(url) {
                return Ok(url.clone());
            }
            tracing::debug!("cached url for {workspace_id} is invalid, resolving again");
        }

        let resolver_url = &self.config.classic_resolver_url;
        let context = WorkspaceContext::new(Some(workspace_id), Some(resolver_url), None);
        let response = self
            .http
            .get(resolver_url)
            .json(&json!({ "id": workspace_id }))
            .send()?;
        let body = checked_body(response, &context)?;
        if body.trim().is_empty() {
            return Err(Error::WorkspaceNotCreatedYet {
                workspace_id: workspace_id.to_string(),
            });
        }

        let content = parse_object(&body, &context)?;
        let url = match content.get("url") {
            Some(Value::String(url)) => url.clone(),
            _ => {
                return Err(Error::workspace(
                    format!("Resolver response has no url field: {body}"),
                    None,
                    context,
                ))
            }
        };
        if url.is_empty() {
            return Err(Error::WorkspaceNotCreatedYet {
                workspace_id: workspace_id.to_string(),
            });
        }

        self.cache.lock().insert(workspace_id.to_string(), url.clone());
        Ok(url)
    }

    /// Human-readable workspace name.
    ///
    /// Classic workspaces ask the resolver endpoint with `{"id": ..}`; unified
    /// ones read the workspace resource with the bearer token. `url`
    /// overrides the endpoint in both cases.
    pub fn resolve_display_name(
        &self,
        workspace_id: &str,
        url: Option<&str>,
        flavor: WorkspaceFlavor,
        token: Option<&str>,
    ) -> Result<Option<String>> {
        let endpoint = match (url, flavor) {
            (Some(url), _) => url.to_string(),
            (None, WorkspaceFlavor::Classic) => self.config.classic_resolver_url.clone(),
            (None, WorkspaceFlavor::Unified) => self.config.unified_workspace_url(workspace_id),
        };
        let context = WorkspaceContext::new(Some(workspace_id), Some(&endpoint), token);

        let request = match flavor {
            WorkspaceFlavor::Classic => self.http.get(&endpoint).json(&json!({ "id": workspace_id })),
            WorkspaceFlavor::Unified => with_bearer(self.http.get(&endpoint), token),
        };
        let body = checked_body(request.send()?, &context)?;
        if body.trim().is_empty() {
            return Err(Error::workspace(
                format!("Cannot find the workspace with id {workspace_id}."),
                None,
                context,
            ));
        }

        let content = parse_object(&body, &context)?;
        match content.get("display_name") {
            Some(Value::String(name)) => Ok(Some(name.clone())),
            Some(Value::Null) => Ok(None),
            _ => Err(Error::workspace(
                format!("Workspace response has no display_name field: {body}"),
                None,
                context,
            )),
        }
    }

    /// Expiry (unix seconds) of `token`, matched against the workspace's
    /// masked token list. Returns `None` when there is no token or no entry
    /// matches.
    pub fn resolve_token_expiry(
        &self,
        workspace_id: &str,
        url: Option<&str>,
        token: Option<&str>,
    ) -> Result<Option<i64>> {
        let base = match url {
            Some(url) => url.to_string(),
            None => self.config.unified_workspace_url(workspace_id),
        };
        let endpoint = format!("{}/tokens", base.trim_end_matches('/'));
        let context = WorkspaceContext::new(Some(workspace_id), Some(&endpoint), token);

        let body = checked_body(with_bearer(self.http.get(&endpoint), token).send()?, &context)?;
        let entries: Value = serde_json::from_str(&body).map_err(|e| {
            Error::workspace(format!("Unable to parse tokens info: {e}"), None, context.clone())
        })?;
        let Value::Array(entries) = entries else {
            return Err(Error::workspace("Unable to get tokens info.", None, context));
        };

        Ok(token.and_then(|token| match_token_expiry(&entries, token)))
    }
}

/// Minimum `expires_at` among entries whose `masked_value` (`left...right`)
/// is a prefix/suffix match for `token`. Malformed entries are skipped.
pub(crate) fn match_token_expiry(entries: &[Value], token: &str) -> Option<i64> {
    entries
        .iter()
        .filter_map(|entry| {
            let masked = entry.get("masked_value")?.as_str()?;
            let expires_at = entry.get("expires_at")?.as_i64()?;
            let (left, right) = masked.split_once("...")?;
            (token.len() >= left.len() + right.len()
                && token.starts_with(left)
                && token.ends_with(right))
            .then_some(expires_at)
        })
        .min()
}

fn is_valid_url(url: &str) -> bool {
    reqwest::Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .unwrap_or(false)
}

fn with_bearer(
    request: reqwest::blocking::RequestBuilder,
    token: Option<&str>,
) -> reqwest::blocking::RequestBuilder {
    match token.filter(|t| !t.is_empty()) {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Body of a 2xx response, or a `Workspace` error carrying status and body.
fn checked_body(response: Response, context: &WorkspaceContext) -> Result<String> {
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(Error::workspace(
            format!("Lepton server returned an error: {} {}.", status.as_u16(), body),
            Some(status.as_u16()),
            context.clone(),
        ));
    }
    Ok(body)
}

fn parse_object(body: &str, context: &WorkspaceContext) -> Result<serde_json::Map<String, Value>> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(Error::workspace(
            format!("Resolver response is not a JSON object: {body}"),
            None,
            context.clone(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_token_expiry_picks_minimum() {
        let entries = vec![
            json!({"masked_value": "ab...yz", "expires_at": 300}),
            json!({"masked_value": "ab...yz", "expires_at": 100}),
            json!({"masked_value": "cd...yz", "expires_at": 50}),
        ];
        assert_eq!(match_token_expiry(&entries, "ab-secret-yz"), Some(100));
    }

    #[test]
    fn test_match_token_expiry_skips_malformed() {
        let entries = vec![
            json!("not-an-object"),
            json!({"masked_value": "abyz", "expires_at": 10}),
            json!({"masked_value": "ab...yz", "expires_at": "soon"}),
            json!({"masked_value": "ab...yz"}),
        ];
        assert_eq!(match_token_expiry(&entries, "ab-secret-yz"), None);
    }

    #[test]
    fn test_match_token_expiry_needs_room_for_both_ends() {
        let entries = vec![json!({"masked_value": "aba...aba", "expires_at": 10})];
        assert_eq!(match_token_expiry(&entries, "aba"), None);
        assert_eq!(match_token_expiry(&entries, "aba--aba"), Some(10));
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://gw.lepton.ai"));
        assert!(!is_valid_url("gw.lepton.ai"));
        assert!(!is_valid_url("ftp://gw.lepton.ai"));
        assert!(!is_valid_url(""));
    }
}
