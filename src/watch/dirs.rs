// src/watch/dirs.rs

//! Which directories get watched.
//!
//! At startup every root is expanded (in recursive mode) into itself plus
//! every admitted descendant directory. The same rules decide whether a
//! directory created later is added to the watch set.
//!
//! A directory is admitted unless, relative to the root it lives under,
//! - one of its segments starts with `.` (and `include_hidden` is off), or
//! - it, or one of its ancestors, matches an `exclude` glob.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::fs::FileSystem;
use crate::status::StatusSink;
use crate::watch::path_utils::{has_hidden_segment, relative_to_roots};

#[derive(Clone)]
pub struct DirectoryRules {
    roots: Vec<PathBuf>,
    include_hidden: bool,
    exclude: Option<GlobSet>,
    exclude_patterns: Vec<String>,
}

impl fmt::Debug for DirectoryRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryRules")
            .field("roots", &self.roots)
            .field("include_hidden", &self.include_hidden)
            .field("exclude", &self.exclude_patterns)
            .finish()
    }
}

impl DirectoryRules {
    pub fn new(roots: Vec<PathBuf>, include_hidden: bool, exclude: &[String]) -> Result<Self> {
        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(exclude).context("building exclude globset")?)
        };

        Ok(Self {
            roots,
            include_hidden,
            exclude: exclude_set,
            exclude_patterns: exclude.to_vec(),
        })
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Whether `dir` may be part of the watch set.
    pub fn admits_dir(&self, dir: &Path) -> bool {
        let Some((_, rel)) = relative_to_roots(&self.roots, dir) else {
            return false;
        };
        if rel.is_empty() {
            return true;
        }
        if !self.include_hidden && has_hidden_segment(&rel) {
            return false;
        }
        !self.excluded_rel(&rel)
    }

    /// Whether `path` (file or directory) matches an exclude glob, directly
    /// or through one of its ancestors below the root.
    pub fn is_excluded(&self, path: &Path) -> bool {
        match relative_to_roots(&self.roots, path) {
            Some((_, rel)) if !rel.is_empty() => self.excluded_rel(&rel),
            _ => false,
        }
    }

    fn excluded_rel(&self, rel: &str) -> bool {
        let Some(set) = &self.exclude else {
            return false;
        };
        let mut prefix = String::with_capacity(rel.len());
        for seg in rel.split('/') {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(seg);
            if set.is_match(prefix.as_str()) {
                return true;
            }
        }
        false
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Walk `dir` and return it plus every admitted descendant directory.
///
/// Unreadable directories are reported as a warning and skipped; the walk
/// carries on with the rest of the tree. Symlink loops are cut by
/// remembering canonical paths.
pub fn expand_dir(
    fs: &dyn FileSystem,
    rules: &DirectoryRules,
    dir: &Path,
    sink: &dyn StatusSink,
) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut stack = vec![dir.to_path_buf()];

    while let Some(current) = stack.pop() {
        if !rules.admits_dir(&current) {
            debug!(dir = ?current, "skipping directory");
            continue;
        }

        let canonical = fs.canonicalize(&current).unwrap_or_else(|_| current.clone());
        if !seen.insert(canonical) {
            continue;
        }

        match fs.read_dir(&current) {
            Ok(entries) => {
                for entry in entries {
                    if fs.is_dir(&entry) {
                        stack.push(entry);
                    }
                }
            }
            Err(err) => {
                sink.warning(&format!("cannot walk {}: {err:#}", current.display()));
            }
        }

        found.push(current);
    }

    found.sort();
    found
}

/// Resolve the initial watch set for all roots.
pub fn expand_roots(
    fs: &dyn FileSystem,
    rules: &DirectoryRules,
    recursive: bool,
    sink: &dyn StatusSink,
) -> BTreeSet<PathBuf> {
    let mut dirs = BTreeSet::new();
    for root in rules.roots() {
        if !fs.is_dir(root) {
            sink.warning(&format!("watch root {} is not a directory", root.display()));
            continue;
        }
        if recursive {
            dirs.extend(expand_dir(fs, rules, root, sink));
        } else {
            dirs.insert(root.clone());
        }
    }
    dirs
}
