// src/watch/fingerprint.rs

//! Per-path change fingerprints.
//!
//! With `change_detection = "mtime"` or `"hash"` the orchestrator remembers a
//! fingerprint for every relevant path it has seen an event for, and drops
//! events whose fingerprint did not change since the previous one (e.g. a
//! `chmod`, or an editor rewriting identical bytes).

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

use crate::fs::FileSystem;
use crate::types::ChangeDetection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fingerprint {
    Modified(SystemTime),
    Content(String),
}

/// Compute the hash of a single file.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file = fs
        .open_read(path)
        .with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Compute the fingerprint of `path` for the given mode.
///
/// Returns `Ok(None)` for [`ChangeDetection::None`].
pub fn fingerprint(
    fs: &dyn FileSystem,
    path: &Path,
    mode: ChangeDetection,
) -> Result<Option<Fingerprint>> {
    match mode {
        ChangeDetection::None => Ok(None),
        ChangeDetection::Mtime => Ok(Some(Fingerprint::Modified(fs.modified(path)?))),
        ChangeDetection::Hash => Ok(Some(Fingerprint::Content(compute_file_hash(fs, path)?))),
    }
}

/// Last fingerprint seen per path.
#[derive(Debug)]
pub struct FingerprintCache {
    mode: ChangeDetection,
    seen: HashMap<PathBuf, Fingerprint>,
}

impl FingerprintCache {
    pub fn new(mode: ChangeDetection) -> Self {
        Self {
            mode,
            seen: HashMap::new(),
        }
    }

    /// Record the current fingerprint of `path` and report whether it differs
    /// from the previously recorded one.
    ///
    /// Paths that cannot be fingerprinted (removed, unreadable) always count
    /// as changed and are forgotten, so a file that comes back is compared
    /// from scratch.
    pub fn changed(&mut self, fs: &dyn FileSystem, path: &Path) -> bool {
        if self.mode == ChangeDetection::None {
            return true;
        }

        match fingerprint(fs, path, self.mode) {
            Ok(Some(current)) => match self.seen.insert(path.to_path_buf(), current.clone()) {
                Some(previous) if previous == current => {
                    debug!(?path, "fingerprint unchanged");
                    false
                }
                _ => true,
            },
            Ok(None) => true,
            Err(err) => {
                debug!(?path, error = %err, "cannot fingerprint path; treating as changed");
                self.seen.remove(path);
                true
            }
        }
    }

    /// Drop fingerprints for everything under `dir`.
    pub fn forget_under(&mut self, dir: &Path) {
        self.seen.retain(|p, _| !p.starts_with(dir));
    }
}
