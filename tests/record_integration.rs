//! Workspace record and resolver behaviour against a mock resolver.

mod common;

use std::fs;
use std::sync::Arc;

use common::{MockServer, Reply};
use lepton::config::{EnvConfig, ResolverConfig};
use lepton::record::LoginParams;
use lepton::resolver::{Resolver, WorkspaceFlavor};
use lepton::{Error, WorkspaceRecord};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

fn open_record(server: &MockServer, dir: &TempDir) -> WorkspaceRecord {
    let resolver = Arc::new(Resolver::new(ResolverConfig::with_base(&server.url())).unwrap());
    WorkspaceRecord::open(dir.path().join("workspace_info.yaml"), resolver).unwrap()
}

#[test]
fn test_classic_login_resolves_url_and_display_name() {
    let server = MockServer::start();
    let gateway = format!("{}/gw", server.url());
    server.route(
        "GET",
        "/api/workspace",
        Reply::json(200, json!({"url": gateway, "display_name": "Classic Team"})),
    );
    let dir = TempDir::new().unwrap();
    let record = open_record(&server, &dir);

    record
        .set(LoginParams::new("cw").token("secret-token").flavor(WorkspaceFlavor::Classic))
        .unwrap();

    let info = record.current().unwrap();
    assert_eq!(info.id, "cw");
    assert_eq!(info.url, format!("{gateway}/api/v1"));
    assert_eq!(info.display_name.as_deref(), Some("Classic Team"));
    assert_eq!(info.is_lepton_classic, Some(true));
    assert_eq!(info.token_expires_at, None);
    assert_eq!(record.get_dashboard_base_url(None), None);

    // The resolver was asked with the workspace id in the body
    let asked = server.requests_to("GET", "/api/workspace");
    assert!(asked.iter().all(|r| r.json() == json!({"id": "cw"})));
}

#[test]
fn test_empty_resolver_body_means_not_created_yet() {
    let server = MockServer::start();
    server.route("GET", "/api/workspace", Reply::text(200, ""));
    let dir = TempDir::new().unwrap();
    let record = open_record(&server, &dir);

    let err = record
        .set(LoginParams::new("fresh").token("t").flavor(WorkspaceFlavor::Classic))
        .unwrap_err();
    assert!(matches!(err, Error::WorkspaceNotCreatedYet { ref workspace_id } if workspace_id == "fresh"));
    assert!(err.is_user_facing());
    assert!(!record.has("fresh"));
    assert!(record.current_workspace_id().is_none());
}

#[test]
fn test_unified_login_records_token_expiry() {
    let server = MockServer::start();
    let url = format!("{}/api/v2/workspaces/uw", server.url());
    server.route(
        "GET",
        "/api/v2/workspaces/uw",
        Reply::json(200, json!({"display_name": "Unified Team"})),
    );
    server.route(
        "GET",
        "/api/v2/workspaces/uw/tokens",
        Reply::json(
            200,
            json!([
                {"masked_value": "ab...yz", "expires_at": 1_800_000_000},
                {"masked_value": "ab...yz", "expires_at": 1_700_000_000},
                {"masked_value": "zz...zz", "expires_at": 5},
            ]),
        ),
    );
    let dir = TempDir::new().unwrap();
    let record = open_record(&server, &dir);

    record.set(LoginParams::new("uw").token("abcdefyz").url(&url)).unwrap();

    let info = record.get("uw").unwrap();
    assert_eq!(info.display_name.as_deref(), Some("Unified Team"));
    assert_eq!(info.token_expires_at, Some(1_700_000_000));
    assert_eq!(info.is_lepton_classic, Some(false));

    let tokens = server.requests_to("GET", "/api/v2/workspaces/uw/tokens");
    assert_eq!(tokens[0].header("authorization"), Some("Bearer abcdefyz"));

    // A recorded expiry is reused without asking again
    assert_eq!(record.refresh_token_expires_at(Some("uw"), true), Some(1_700_000_000));
    assert_eq!(server.requests_to("GET", "/api/v2/workspaces/uw/tokens").len(), 1);
}

#[test]
fn test_set_is_idempotent_and_survives_reload() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let record = open_record(&server, &dir);
    let url = format!("{}/ws/api/v1", server.url());

    let params = LoginParams::new("ws").token("tok").url(&url);
    record.set(params.clone()).unwrap();
    let first = fs::read_to_string(record.path()).unwrap();
    record.set(params).unwrap();
    let second = fs::read_to_string(record.path()).unwrap();
    assert_eq!(first, second);

    let reopened = open_record(&server, &dir);
    assert_eq!(reopened.current(), record.current());
    assert_eq!(reopened.workspaces().len(), 1);
}

#[test]
fn test_remove_and_logout() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let record = open_record(&server, &dir);
    for id in ["a", "b"] {
        let url = format!("{}/{id}/api/v1", server.url());
        record.set(LoginParams::new(id).token("tok").url(url)).unwrap();
    }
    assert_eq!(record.current_workspace_id().as_deref(), Some("b"));

    record.remove("b").unwrap();
    assert!(record.current_workspace_id().is_none());
    assert!(matches!(
        record.remove("b"),
        Err(Error::WorkspaceConfiguration { .. })
    ));
    assert!(matches!(
        record.logout(false),
        Err(Error::WorkspaceConfiguration { .. })
    ));

    let url = format!("{}/a/api/v1", server.url());
    record.set(LoginParams::new("a").token("tok").url(url)).unwrap();
    record.logout(true).unwrap();
    assert!(record.workspaces().is_empty());
}

#[test]
fn test_missing_ids_are_backfilled_on_load() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("workspace_info.yaml");
    fs::write(
        &path,
        "workspaces:\n  old:\n    url: http://127.0.0.1:9/old/api/v1\n    auth_token: t\ncurrent_workspace: gone\n",
    )
    .unwrap();

    let record = open_record(&server, &dir);
    assert_eq!(record.get("old").unwrap().id, "old");
    // A current id without an entry is dropped
    assert!(record.current_workspace_id().is_none());
}

#[test]
fn test_entry_without_classic_flag_uses_url_flavor() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("workspace_info.yaml");
    let classic_url = format!("{}/old/api/v1", server.url());
    fs::write(
        &path,
        format!(
            "workspaces:\n  old:\n    id: old\n    url: {classic_url}\n    auth_token: t\ncurrent_workspace: old\n"
        ),
    )
    .unwrap();

    let record = open_record(&server, &dir);
    assert_eq!(record.get("old").unwrap().is_lepton_classic, None);
    assert_eq!(record.get_dashboard_base_url(None), None);
    assert_eq!(record.refresh_token_expires_at(Some("old"), false), None);
    // Classic workspaces have no token listing to ask
    assert!(server.requests().is_empty());
}

#[test]
fn test_client_from_record_entry() {
    let server = MockServer::start();
    server.route("GET", "/ws/api/v1/secrets", Reply::json(200, json!(["HF_TOKEN"])));
    let dir = TempDir::new().unwrap();
    let record = open_record(&server, &dir);
    let url = format!("{}/ws/api/v1", server.url());
    record.set(LoginParams::new("ws").token("record-tok").url(url)).unwrap();

    let client = record.client(None).unwrap();
    assert_eq!(client.secret().list_all().unwrap(), vec!["HF_TOKEN".to_string()]);
    let seen = server.requests_to("GET", "/ws/api/v1/secrets");
    assert_eq!(seen[0].header("authorization"), Some("Bearer record-tok"));
}

#[test]
fn test_login_with_env_requires_id() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let record = open_record(&server, &dir);

    let err = record.login_with(&EnvConfig::default()).unwrap_err();
    assert!(matches!(err, Error::WorkspaceConfiguration { .. }));

    let env = EnvConfig {
        workspace_id: Some("envws".into()),
        token: Some("env-tok".into()),
        url: Some(format!("{}/envws/api/v1", server.url())),
        ..Default::default()
    };
    record.login_with(&env).unwrap();
    let info = record.current().unwrap();
    assert_eq!(info.id, "envws");
    assert_eq!(info.auth_token.as_deref(), Some("env-tok"));
}

#[cfg(unix)]
#[test]
fn test_record_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let record = open_record(&server, &dir);
    let url = format!("{}/ws/api/v1", server.url());
    record.set(LoginParams::new("ws").token("tok").url(url)).unwrap();

    let mode = fs::metadata(record.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
