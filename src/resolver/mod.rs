//! Workspace URL and identity resolution
//!
//! Two deployment styles exist:
//! - **Classic**: a resolver endpoint maps the id to a per-workspace gateway,
//!   and the API lives under `<gateway>/api/v1`
//! - **Unified**: a fixed gateway serves every workspace at
//!   `<base>/api/v2/workspaces/<id>`
//!
//! ```ignore
//! use lepton::resolver::{self, WorkspaceFlavor};
//!
//! let url = resolver::global()?.resolve_api_url("my-ws", WorkspaceFlavor::Unified)?;
//! ```

mod internal;

use std::sync::{Arc, OnceLock};

use crate::config::{ResolverConfig, CLASSIC_API_PATH};
use crate::error::Result;

pub use internal::Resolver;

/// Which deployment style a workspace belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkspaceFlavor {
    Classic,
    #[default]
    Unified,
}

impl WorkspaceFlavor {
    pub fn from_classic_flag(is_classic: bool) -> Self {
        if is_classic {
            WorkspaceFlavor::Classic
        } else {
            WorkspaceFlavor::Unified
        }
    }

    pub fn is_classic(&self) -> bool {
        matches!(self, WorkspaceFlavor::Classic)
    }

    /// Guess the flavor from an API URL: `dgxc` hosts are unified, URLs
    /// ending in the classic API path are classic, anything else is unified.
    pub fn sniff(url: &str) -> Self {
        if url.contains("dgxc") {
            WorkspaceFlavor::Unified
        } else if url.trim_end_matches('/').ends_with(CLASSIC_API_PATH) {
            WorkspaceFlavor::Classic
        } else {
            WorkspaceFlavor::Unified
        }
    }

    /// Explicit choice, then the recorded flag, then the URL, then unified.
    pub fn resolve(explicit: Option<Self>, recorded: Option<bool>, url: Option<&str>) -> Self {
        explicit
            .or_else(|| recorded.map(Self::from_classic_flag))
            .or_else(|| url.map(Self::sniff))
            .unwrap_or_default()
    }
}

/// Origin header value for a workspace URL. Only unified (`dgxc`) gateways
/// need one.
pub fn origin_url_for(url: &str) -> Option<String> {
    url.contains("dgxc").then(|| url.to_string())
}

static GLOBAL: OnceLock<Arc<Resolver>> = OnceLock::new();

/// Process-wide resolver for the production endpoints.
pub fn global() -> Result<Arc<Resolver>> {
    if let Some(resolver) = GLOBAL.get() {
        return Ok(resolver.clone());
    }
    let resolver = Arc::new(Resolver::new(ResolverConfig::default())?);
    Ok(GLOBAL.get_or_init(|| resolver).clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_flavor() {
        assert_eq!(
            WorkspaceFlavor::sniff("https://gateway.dgxc-lepton.nvidia.com/api/v2/workspaces/x"),
            WorkspaceFlavor::Unified
        );
        assert_eq!(
            WorkspaceFlavor::sniff("https://ws1.cloud.lepton.ai/api/v1"),
            WorkspaceFlavor::Classic
        );
        assert_eq!(
            WorkspaceFlavor::sniff("http://127.0.0.1:8080/api/v2/workspaces/x"),
            WorkspaceFlavor::Unified
        );
    }

    #[test]
    fn test_resolve_precedence() {
        let classic_url = Some("https://ws1.cloud.lepton.ai/api/v1");
        assert_eq!(
            WorkspaceFlavor::resolve(Some(WorkspaceFlavor::Unified), Some(true), classic_url),
            WorkspaceFlavor::Unified
        );
        assert_eq!(
            WorkspaceFlavor::resolve(None, Some(false), classic_url),
            WorkspaceFlavor::Unified
        );
        assert_eq!(
            WorkspaceFlavor::resolve(None, None, classic_url),
            WorkspaceFlavor::Classic
        );
        assert_eq!(WorkspaceFlavor::resolve(None, None, None), WorkspaceFlavor::Unified);
    }

    #[test]
    fn test_origin_url_for() {
        let url = "https://gateway.dgxc-lepton.nvidia.com/api/v2/workspaces/x";
        assert_eq!(origin_url_for(url).as_deref(), Some(url));
        assert_eq!(origin_url_for("https://ws1.cloud.lepton.ai/api/v1"), None);
    }
}
