//! Single source of truth for the local filesystem layout.
//!
//! This module defines WHERE data lives. It has no I/O beyond directory
//! creation on demand, no validation and no business logic.
//!
//! ```text
//! $LEPTON_CACHE_DIR (default ~/.cache/lepton)/
//! ├── workspace_info.yaml      # Workspace record (ids, urls, tokens)
//! ├── lepton.db                # Local photon index (SQLite)
//! ├── logs/                    # CLI logs
//! └── *.photon                 # Downloaded photons
//! ```

use std::fs;
use std::io;
use std::path::PathBuf;

/// Environment variable overriding the cache root.
pub const ENV_CACHE_DIR: &str = "LEPTON_CACHE_DIR";

/// Cache root: `$LEPTON_CACHE_DIR` or `~/.cache/lepton`
pub fn cache_dir() -> PathBuf {
    match std::env::var_os(ENV_CACHE_DIR) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cache")
            .join("lepton"),
    }
}

/// Workspace record: `<cache>/workspace_info.yaml`
pub fn workspace_record_path() -> PathBuf {
    cache_dir().join("workspace_info.yaml")
}

/// Local photon index: `<cache>/lepton.db`
pub fn photon_db_path() -> PathBuf {
    cache_dir().join("lepton.db")
}

/// CLI logs: `<cache>/logs/`
pub fn logs_dir() -> PathBuf {
    cache_dir().join("logs")
}

/// Download target for a photon before its name is known: `<cache>/tmp.<id>.photon`
pub fn photon_tmp_path(id: &str) -> PathBuf {
    cache_dir().join(format!("tmp.{id}.photon"))
}

/// Final location of a downloaded photon: `<cache>/<name>.<id>.photon`
pub fn photon_download_path(name: &str, id: &str) -> PathBuf {
    cache_dir().join(format!("{name}.{id}.photon"))
}

/// Create the cache directory if it does not exist yet.
pub fn ensure_cache_dir() -> io::Result<PathBuf> {
    let dir = cache_dir();
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_cache_dir_env_override() {
        std::env::set_var(ENV_CACHE_DIR, "/tmp/lepton-cache-test");
        assert_eq!(cache_dir(), PathBuf::from("/tmp/lepton-cache-test"));
        assert_eq!(
            workspace_record_path(),
            PathBuf::from("/tmp/lepton-cache-test/workspace_info.yaml")
        );
        assert_eq!(
            photon_db_path(),
            PathBuf::from("/tmp/lepton-cache-test/lepton.db")
        );
        std::env::remove_var(ENV_CACHE_DIR);
    }

    #[test]
    #[serial]
    fn test_cache_dir_default_under_home() {
        std::env::remove_var(ENV_CACHE_DIR);
        let dir = cache_dir();
        assert!(dir.ends_with(".cache/lepton"));
    }

    #[test]
    #[serial]
    fn test_photon_paths() {
        std::env::set_var(ENV_CACHE_DIR, "/c");
        assert_eq!(photon_tmp_path("abc"), PathBuf::from("/c/tmp.abc.photon"));
        assert_eq!(
            photon_download_path("llm", "abc"),
            PathBuf::from("/c/llm.abc.photon")
        );
        std::env::remove_var(ENV_CACHE_DIR);
    }
}
