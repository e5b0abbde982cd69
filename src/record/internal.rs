//! Record persistence and credential lifecycle

use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::SystemTime;

use parking_lot::{Mutex, RwLock};

use super::{dashboard_base_url, not_created_yet_message, LocalWorkspaceInfo, LoginParams, RecordFile};
use crate::client::Client;
use crate::config::EnvConfig;
use crate::error::{Error, Result};
use crate::paths;
use crate::resolver::{self, origin_url_for, Resolver, WorkspaceFlavor};

/// Serializes file reads and writes across every record in the process.
static DISK_LOCK: Mutex<()> = Mutex::new(());

static GLOBAL: OnceLock<WorkspaceRecord> = OnceLock::new();

#[derive(Default)]
struct State {
    file: RecordFile,
    /// mtime of the file when it was last read or written by us
    mtime: Option<SystemTime>,
}

/// The local workspace record.
///
/// Reads are served from memory after the initial load. Every mutation
/// rewrites the whole file while holding the write lock.
pub struct WorkspaceRecord {
    path: PathBuf,
    resolver: Arc<Resolver>,
    state: RwLock<State>,
}

impl WorkspaceRecord {
    /// Open the record at `path`; a missing file is an empty record.
    pub fn open(path: impl Into<PathBuf>, resolver: Arc<Resolver>) -> Result<Self> {
        let record = Self {
            path: path.into(),
            resolver,
            state: RwLock::new(State::default()),
        };
        record.reload()?;
        Ok(record)
    }

    /// Open the record in the cache directory with the production resolver.
    pub fn open_default() -> Result<Self> {
        Self::open(paths::workspace_record_path(), resolver::global()?)
    }

    /// Process-wide record, loaded on first use.
    pub fn global() -> Result<&'static WorkspaceRecord> {
        if let Some(record) = GLOBAL.get() {
            return Ok(record);
        }
        let record = Self::open_default()?;
        Ok(GLOBAL.get_or_init(|| record))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    /// Re-read the file from disk, discarding the in-memory copy.
    pub fn reload(&self) -> Result<()> {
        let mut state = self.state.write();
        let _disk = DISK_LOCK.lock();
        let (file, mtime) = read_file(&self.path)?;
        state.file = file;
        state.mtime = mtime;
        Ok(())
    }

    /// Alias for [`reload`](Self::reload).
    pub fn load(&self) -> Result<()> {
        self.reload()
    }

    pub fn has(&self, workspace_id: &str) -> bool {
        self.state.read().file.workspaces.contains_key(workspace_id)
    }

    pub fn get(&self, workspace_id: &str) -> Option<LocalWorkspaceInfo> {
        self.state.read().file.workspaces.get(workspace_id).cloned()
    }

    pub fn current_workspace_id(&self) -> Option<String> {
        self.state.read().file.current_workspace.clone()
    }

    pub fn current(&self) -> Option<LocalWorkspaceInfo> {
        let state = self.state.read();
        let id = state.file.current_workspace.as_ref()?;
        state.file.workspaces.get(id).cloned()
    }

    /// All entries, ordered by id.
    pub fn workspaces(&self) -> Vec<LocalWorkspaceInfo> {
        self.state.read().file.workspaces.values().cloned().collect()
    }

    /// Record a login and make it the current workspace.
    ///
    /// A missing URL is resolved (and may fail with
    /// [`Error::WorkspaceNotCreatedYet`]). Display name and token expiry are
    /// fetched best-effort; their failures are traced and ignored.
    pub fn set(&self, params: LoginParams) -> Result<()> {
        let id = params.workspace_id.trim().to_string();
        if id.is_empty() {
            return Err(Error::configuration("Workspace id must not be empty."));
        }
        let flavor = params
            .flavor
            .or_else(|| params.url.as_deref().map(WorkspaceFlavor::sniff))
            .unwrap_or_default();
        let token = params.token.as_deref();
        let existing = self.get(&id);

        let mut display_name = existing.as_ref().and_then(|e| e.display_name.clone());
        if display_name.is_none() {
            display_name = self
                .resolver
                .resolve_display_name(&id, params.url.as_deref(), flavor, token)
                .unwrap_or_else(|e| {
                    tracing::trace!(
                        "Failed to fetch workspace display name (workspace_id={id}, url={:?}, \
                         classic={}): {e}",
                        params.url,
                        flavor.is_classic()
                    );
                    None
                });
        }

        let mut token_expires_at = existing
            .as_ref()
            .filter(|_| !params.could_be_new_token)
            .and_then(|e| e.token_expires_at);
        if token_expires_at.is_none() && !flavor.is_classic() {
            token_expires_at = self
                .resolver
                .resolve_token_expiry(&id, params.url.as_deref(), token)
                .unwrap_or_else(|e| {
                    tracing::trace!(
                        "Failed to fetch token expiration (workspace_id={id}, url={:?}): {e}",
                        params.url
                    );
                    None
                });
        }

        let url = match params.url {
            Some(url) => url,
            None => self.resolver.resolve_api_url(&id, flavor)?,
        };
        let workspace_origin_url = params.origin_url.or_else(|| origin_url_for(&url));

        let info = LocalWorkspaceInfo {
            id: id.clone(),
            url,
            display_name,
            auth_token: params.token,
            workspace_origin_url,
            is_lepton_classic: Some(flavor.is_classic()),
            token_expires_at,
        };
        self.mutate(|file| {
            file.workspaces.insert(id.clone(), info);
            file.current_workspace = Some(id);
            Ok(())
        })
    }

    /// [`set`](Self::set) for CLI callers: a workspace that is not set up yet
    /// prints guidance and exits the process with status 1.
    pub fn set_or_exit(&self, params: LoginParams) -> Result<()> {
        let id = params.workspace_id.clone();
        match self.set(params) {
            Err(Error::WorkspaceNotCreatedYet { .. }) => {
                eprintln!("{}", not_created_yet_message(&id));
                std::process::exit(1);
            }
            other => other,
        }
    }

    /// Log in with the `LEPTON_WORKSPACE_*` environment variables.
    pub fn login_with_env(&self) -> Result<()> {
        self.login_with(&EnvConfig::from_env())
    }

    /// Log in from an environment snapshot; the workspace id is required.
    pub fn login_with(&self, env: &EnvConfig) -> Result<()> {
        let Some(id) = env.workspace_id.as_deref() else {
            return Err(Error::configuration(format!(
                "{} is not set. Set it or log in with an explicit workspace id.",
                crate::config::ENV_WORKSPACE_ID
            )));
        };
        let mut params = LoginParams::new(id);
        params.token = env.token.clone();
        params.url = env.url.clone();
        params.origin_url = env.origin_url.clone();
        self.set(params)
    }

    /// Clear the current workspace; `purge` also removes its entry.
    pub fn logout(&self, purge: bool) -> Result<()> {
        self.mutate(|file| {
            let Some(current) = file.current_workspace.take() else {
                return Err(Error::configuration("No workspace is currently logged in."));
            };
            if purge {
                file.workspaces.remove(&current);
            }
            Ok(())
        })
    }

    /// Delete an entry, clearing the current workspace if it was this one.
    pub fn remove(&self, workspace_id: &str) -> Result<()> {
        self.mutate(|file| {
            if file.workspaces.remove(workspace_id).is_none() {
                return Err(Error::configuration(format!(
                    "Workspace {workspace_id} does not exist in the local record."
                )));
            }
            if file.current_workspace.as_deref() == Some(workspace_id) {
                file.current_workspace = None;
            }
            Ok(())
        })
    }

    /// Build a fresh client from a stored entry, or the current one.
    pub fn client(&self, workspace_id: Option<&str>) -> Result<Client> {
        let info = self.entry(workspace_id)?;
        let mut builder = Client::builder()
            .workspace_id(&info.id)
            .url(&info.url)
            .flavor(info.flavor())
            .resolver(self.resolver.clone())
            .record(self);
        if let Some(token) = &info.auth_token {
            builder = builder.token(token);
        }
        if let Some(origin) = &info.workspace_origin_url {
            builder = builder.origin_url(origin);
        }
        builder.build()
    }

    /// Dashboard base URL of a stored workspace. Classic workspaces have none.
    pub fn get_dashboard_base_url(&self, workspace_id: Option<&str>) -> Option<String> {
        let info = match workspace_id {
            Some(id) => self.get(id),
            None => self.current(),
        }?;
        if info.flavor().is_classic() {
            return None;
        }
        Some(dashboard_base_url(&info.url))
    }

    /// Re-resolve the token expiry of a stored workspace and persist it.
    ///
    /// Returns the recorded value untouched when `skip_if_exists` is set and
    /// one exists. Failures are traced and yield `None`.
    pub fn refresh_token_expires_at(
        &self,
        workspace_id: Option<&str>,
        skip_if_exists: bool,
    ) -> Option<i64> {
        let info = self.entry(workspace_id).ok()?;
        if skip_if_exists && info.token_expires_at.is_some() {
            return info.token_expires_at;
        }
        if info.flavor().is_classic() {
            return None;
        }

        let expires_at = match self.resolver.resolve_token_expiry(
            &info.id,
            Some(&info.url),
            info.auth_token.as_deref(),
        ) {
            Ok(value) => value,
            Err(e) => {
                tracing::trace!("Failed to refresh token expiration for {}: {e}", info.id);
                return None;
            }
        };

        let saved = self.mutate(|file| {
            if let Some(entry) = file.workspaces.get_mut(&info.id) {
                entry.token_expires_at = expires_at;
            }
            Ok(())
        });
        if let Err(e) = saved {
            tracing::trace!("Failed to save token expiration for {}: {e}", info.id);
        }
        expires_at
    }

    fn entry(&self, workspace_id: Option<&str>) -> Result<LocalWorkspaceInfo> {
        let id = match workspace_id {
            Some(id) => id.to_string(),
            None => self.current_workspace_id().ok_or_else(|| {
                Error::configuration(
                    "No workspace id given and no current workspace. Log in first.",
                )
            })?,
        };
        self.get(&id).ok_or_else(|| {
            Error::configuration(format!("Workspace {id} does not exist in the local record."))
        })
    }

    /// Apply `change` to the in-memory record and rewrite the file. The
    /// in-memory copy is left untouched when `change` or the write fails.
    fn mutate<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut RecordFile) -> Result<()>,
    {
        let mut state = self.state.write();
        let mut file = state.file.clone();
        change(&mut file)?;

        let _disk = DISK_LOCK.lock();
        if modified_time(&self.path) != state.mtime {
            tracing::warn!(
                "{} changed on disk since it was loaded; overwriting it",
                self.path.display()
            );
        }
        write_file(&self.path, &file)?;
        state.mtime = modified_time(&self.path);
        state.file = file;
        Ok(())
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn read_file(path: &Path) -> Result<(RecordFile, Option<SystemTime>)> {
    if !path.exists() {
        return Ok((RecordFile::default(), None));
    }
    let content = fs::read_to_string(path)?;
    let mut file: RecordFile = if content.trim().is_empty() {
        RecordFile::default()
    } else {
        serde_yaml::from_str(&content)?
    };
    file.normalize();
    Ok((file, modified_time(path)))
}

fn write_file(path: &Path, file: &RecordFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_yaml::to_string(file)?;
    fs::write(path, content)?;

    // Owner-only; the record holds bearer tokens
    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use tempfile::TempDir;

    fn offline_record(dir: &TempDir) -> WorkspaceRecord {
        // Port 9 (discard) refuses connections, so best-effort calls fail fast
        let resolver = Resolver::new(ResolverConfig::with_base("http://127.0.0.1:9")).unwrap();
        WorkspaceRecord::open(dir.path().join("workspace_info.yaml"), Arc::new(resolver)).unwrap()
    }

    fn classic_login(id: &str) -> LoginParams {
        LoginParams::new(id)
            .token("tok-123456")
            .url(format!("http://127.0.0.1:9/{id}/api/v1"))
    }

    #[test]
    fn test_missing_file_is_empty_record() {
        let dir = TempDir::new().unwrap();
        let record = offline_record(&dir);
        assert!(record.workspaces().is_empty());
        assert!(record.current().is_none());
    }

    #[test]
    fn test_set_persists_and_sets_current() {
        let dir = TempDir::new().unwrap();
        let record = offline_record(&dir);
        record.set(classic_login("ws1")).unwrap();

        let info = record.current().unwrap();
        assert_eq!(info.id, "ws1");
        assert_eq!(info.auth_token.as_deref(), Some("tok-123456"));
        assert_eq!(info.is_lepton_classic, Some(true));
        assert_eq!(info.display_name, None);

        let reopened = offline_record(&dir);
        assert_eq!(reopened.current(), Some(info));
    }

    #[test]
    fn test_remove_current_clears_it() {
        let dir = TempDir::new().unwrap();
        let record = offline_record(&dir);
        record.set(classic_login("ws1")).unwrap();
        record.set(classic_login("ws2")).unwrap();

        record.remove("ws1").unwrap();
        assert_eq!(record.current_workspace_id().as_deref(), Some("ws2"));
        record.remove("ws2").unwrap();
        assert_eq!(record.current_workspace_id(), None);
        assert!(record.remove("ws2").is_err());
    }

    #[test]
    fn test_logout_requires_current() {
        let dir = TempDir::new().unwrap();
        let record = offline_record(&dir);
        assert!(matches!(
            record.logout(false),
            Err(Error::WorkspaceConfiguration { .. })
        ));

        record.set(classic_login("ws1")).unwrap();
        record.logout(false).unwrap();
        assert!(record.has("ws1"));
        assert_eq!(record.current_workspace_id(), None);

        record.set(classic_login("ws1")).unwrap();
        record.logout(true).unwrap();
        assert!(!record.has("ws1"));
    }

    #[test]
    fn test_empty_id_rejected() {
        let dir = TempDir::new().unwrap();
        let record = offline_record(&dir);
        assert!(matches!(
            record.set(LoginParams::new("  ")),
            Err(Error::WorkspaceConfiguration { .. })
        ));
    }

    #[test]
    fn test_dashboard_url_none_for_classic() {
        let dir = TempDir::new().unwrap();
        let record = offline_record(&dir);
        record.set(classic_login("ws1")).unwrap();
        assert_eq!(record.get_dashboard_base_url(Some("ws1")), None);
        assert_eq!(record.get_dashboard_base_url(Some("missing")), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_record_file_is_owner_only() {
        let dir = TempDir::new().unwrap();
        let record = offline_record(&dir);
        record.set(classic_login("ws1")).unwrap();
        let mode = fs::metadata(record.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
