pub mod auth;
pub mod deployment;
pub mod job;
pub mod kv;
pub mod node;
pub mod photon;
pub mod pod;
pub mod secret;
pub mod storage;
pub mod workspace;

use anyhow::{Context, Result};
use lepton::record::not_created_yet_message;
use lepton::types::Metadata;
use lepton::{Client, Error};

/// Client for the current workspace.
pub(crate) fn client() -> Result<Client> {
    Client::current().context("No workspace to talk to. Run 'lep login' first.")
}

/// `name (id)`, or whichever of the two is known.
pub(crate) fn label(metadata: Option<&Metadata>) -> String {
    let name = metadata.and_then(|m| m.name.as_deref());
    let id = metadata.and_then(|m| m.id.as_deref());
    match (name, id) {
        (Some(name), Some(id)) if name != id => format!("{name} ({id})"),
        (Some(name), _) => name.to_string(),
        (None, Some(id)) => id.to_string(),
        (None, None) => "-".to_string(),
    }
}

/// What to tell the user for an error they can act on.
pub(crate) fn guidance(err: &Error) -> String {
    match err {
        Error::WorkspaceNotCreatedYet { workspace_id } => not_created_yet_message(workspace_id),
        Error::WorkspaceConfiguration { .. } => {
            format!("{err}\nRun 'lep login' to select a workspace.")
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_prefers_name_and_id() {
        let mut metadata = Metadata::default();
        assert_eq!(label(None), "-");
        metadata.id = Some("web-1".into());
        assert_eq!(label(Some(&metadata)), "web-1");
        metadata.name = Some("web".into());
        assert_eq!(label(Some(&metadata)), "web (web-1)");
        metadata.id = Some("web".into());
        assert_eq!(label(Some(&metadata)), "web");
    }
}
