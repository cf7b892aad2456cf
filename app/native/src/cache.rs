//! Cache directory utilities.
//!
//! The bridge socket and the event record store both live in the
//! application's cache directory: `~/.cache/tether/` on Linux,
//! `~/Library/Caches/tether/` on macOS, with a fallback to `/tmp/tether/`
//! when no cache directory is available.

use std::path::PathBuf;

use crate::constants::{APP_NAME, EVENT_LOG_FILENAME, SOCKET_FILENAME};

/// Returns the root cache directory for the application.
#[must_use]
pub fn get_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map_or_else(|| PathBuf::from(format!("/tmp/{APP_NAME}")), |cache| cache.join(APP_NAME))
}

/// Returns a cache subdirectory for the given component.
#[must_use]
pub fn get_cache_subdir(subdir: &str) -> PathBuf { get_cache_dir().join(subdir) }

/// Default path of the bridge socket.
#[must_use]
pub fn default_socket_path() -> PathBuf { get_cache_dir().join(SOCKET_FILENAME) }

/// Default path of the append-only event record store.
#[must_use]
pub fn default_event_log_path() -> PathBuf { get_cache_dir().join(EVENT_LOG_FILENAME) }
