// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::{Path, PathBuf};

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if `path` does not live under `root`. `root` itself maps
/// to the empty string.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

/// Find the most specific root containing `path` and relativize against it.
///
/// Roots may be nested (e.g. the project dir plus one of its subdirectories
/// given on the command line); the longest match wins so that relative
/// patterns are evaluated against the closest root.
pub fn relative_to_roots<'a>(
    roots: &'a [PathBuf],
    path: &Path,
) -> Option<(&'a Path, String)> {
    roots
        .iter()
        .filter(|root| path.starts_with(root))
        .max_by_key(|root| root.components().count())
        .and_then(|root| relative_str(root, path).map(|rel| (root.as_path(), rel)))
}

/// True if any segment of a relative path starts with `.`.
pub fn has_hidden_segment(rel: &str) -> bool {
    rel.split('/')
        .any(|seg| seg.starts_with('.') && seg != "." && seg != "..")
}
