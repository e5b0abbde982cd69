//! Error taxonomy for every transport and workspace outcome.
//!
//! Each HTTP outcome maps to exactly one variant. Workspace-level variants
//! carry a [`WorkspaceContext`] whose token is already masked, so an error can
//! be printed verbatim without leaking credentials.

use std::fmt;

use thiserror::Error;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Identity details attached to workspace-level errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceContext {
    pub workspace_id: Option<String>,
    pub workspace_url: Option<String>,
    /// Masked form of the token, never the raw value
    pub auth_token: Option<String>,
}

impl WorkspaceContext {
    pub fn new(id: Option<&str>, url: Option<&str>, token: Option<&str>) -> Self {
        Self {
            workspace_id: id.filter(|s| !s.is_empty()).map(str::to_string),
            workspace_url: url.filter(|s| !s.is_empty()).map(str::to_string),
            auth_token: token.filter(|s| !s.is_empty()).map(mask_token),
        }
    }

    pub fn id(id: &str) -> Self {
        Self::new(Some(id), None, None)
    }
}

impl fmt::Display for WorkspaceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let details: Vec<String> = [
            ("Workspace Id", &self.workspace_id),
            ("Workspace Url", &self.workspace_url),
            ("Auth Token", &self.auth_token),
        ]
        .iter()
        .filter_map(|(label, value)| value.as_ref().map(|v| format!("{label}: {v}")))
        .collect();

        if details.is_empty() {
            Ok(())
        } else {
            write!(f, " ({})", details.join(", "))
        }
    }
}

/// Mask a token as `ab***yz`. Short tokens are fully hidden.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "***".to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}***{tail}")
}

#[derive(Debug, Error)]
pub enum Error {
    /// HTTP 4xx from a resource call.
    #[error("Client error during API call: {status} {body}")]
    Client { status: u16, body: String },

    /// HTTP 5xx from a resource call.
    #[error("Server error during API call: {status} {body}")]
    Server { status: u16, body: String },

    /// 401 on `info()`.
    #[error("Unauthorized access to the workspace{0}")]
    WorkspaceUnauthorized(WorkspaceContext),

    /// 404 on `info()`.
    #[error(
        "Workspace not found. If the workspace was just created, please wait for 10 \
         minutes. Contact us if the workspace remains unavailable after 10 minutes.{0}"
    )]
    WorkspaceNotFound(WorkspaceContext),

    /// 403 on `info()`.
    #[error("Forbidden access to the workspace{0}")]
    WorkspaceForbidden(WorkspaceContext),

    /// The resolver knows the id but returned an empty URL.
    #[error("Workspace {workspace_id} is not created yet.")]
    WorkspaceNotCreatedYet { workspace_id: String },

    /// Missing id/token/url, malformed debug headers, unknown local workspace.
    #[error("{message}{context}")]
    WorkspaceConfiguration {
        message: String,
        context: WorkspaceContext,
    },

    /// Resolver returned non-2xx or a malformed body.
    #[error("{message}{context}")]
    Workspace {
        message: String,
        status: Option<u16>,
        context: WorkspaceContext,
    },

    /// A 2xx body that cannot be decoded. Not recoverable; report it.
    #[error(
        "You encountered a programming error. Please report this, and include the \
         following debug info:\n*** begin of debug info ***\nresponse returned status \
         {status}, but the content cannot be decoded as expected.\nresponse.text: \
         {body}\n\nexception details:\n{details}\n*** end of debug info ***"
    )]
    Programming {
        status: u16,
        body: String,
        details: String,
    },

    /// Invalid model value or request shape, raised before any HTTP call.
    #[error("{0}")]
    Validation(String),

    /// KV lookup of a key that does not exist.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Connection, TLS or timeout failure before a status was received.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read workspace record: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("local photon index error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::WorkspaceConfiguration {
            message: message.into(),
            context: WorkspaceContext::default(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub(crate) fn workspace(
        message: impl Into<String>,
        status: Option<u16>,
        context: WorkspaceContext,
    ) -> Self {
        Error::Workspace {
            message: message.into(),
            status,
            context,
        }
    }

    /// Classify a non-2xx status. Returns `None` for success and informational codes.
    pub fn from_status(status: u16, body: String) -> Option<Self> {
        match status {
            400..=499 => Some(Error::Client { status, body }),
            500..=u16::MAX => Some(Error::Server { status, body }),
            _ => None,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Client { status, .. }
            | Error::Server { status, .. }
            | Error::Programming { status, .. } => Some(*status),
            Error::Workspace { status, .. } => *status,
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::WorkspaceNotFound(_) | Error::KeyNotFound(_))
            || matches!(self, Error::Client { status: 404, .. })
    }

    /// Expected end-user outcomes that a CLI reports with guidance and exit code 1.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::WorkspaceNotCreatedYet { .. } | Error::WorkspaceConfiguration { .. }
        )
    }
}
