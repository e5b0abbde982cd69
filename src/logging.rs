//! Logging setup and one-shot warnings.
//!
//! The library only emits `tracing` events. The `lep` binary installs a
//! stderr subscriber filtered by `LEPTON_LOG` (default `warn`).

use std::collections::HashSet;
use std::sync::LazyLock;

use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::ENV_LOG;

static WARNED: LazyLock<Mutex<HashSet<String>>> = LazyLock::new(|| Mutex::new(HashSet::new()));

/// Install the stderr subscriber. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Emit `message` as a warning the first time `key` is seen in this process.
///
/// Returns true when the warning was emitted.
pub fn warn_once(key: &str, message: &str) -> bool {
    let first = WARNED.lock().insert(key.to_string());
    if first {
        tracing::warn!("{message}");
    }
    first
}
