//! Tilde expansion for user-supplied paths.

use std::path::PathBuf;

/// Expands a leading `~` to the home directory.
///
/// Surrounding whitespace is trimmed; a blank input yields an empty path so
/// callers can fall back to their default. Absolute and relative paths are
/// returned unchanged.
#[must_use]
pub fn expand(path: &str) -> PathBuf {
    let path = path.trim();
    if path.is_empty() {
        return PathBuf::new();
    }

    PathBuf::from(shellexpand::tilde(path).as_ref())
}
