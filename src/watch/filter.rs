// src/watch/filter.rs

//! Path predicates applied to every event before it may trigger a rebuild.
//!
//! - [`ExtensionFilter`]: exact, case-sensitive suffix match against the
//!   configured extensions.
//! - [`TransientMarkers`]: names that editors use while saving (swap files,
//!   atomic-save staging files, lock files). Such paths never trigger,
//!   whatever their suffix.

use std::path::Path;

use regex::RegexSet;

/// Extension watched when the configuration does not name any.
pub const DEFAULT_EXTENSION: &str = ".go";

/// Temp-file patterns recognised out of the box.
pub const DEFAULT_TRANSIENT_MARKERS: &[&str] = &[
    // JetBrains "safe write"
    r"___jb_(tmp|old|bak)___$",
    // backup copies (`main.go~`)
    r"~$",
    // vim swap files and its `4913` write-test file
    r"\.sw[a-px]$",
    r"(^|[/\\])4913$",
    // emacs lock files (`.#main.go`)
    r"(^|[/\\])\.#",
    // generic staging files (`main.go.tmp`, `main.go.tmp.1234`)
    r"\.tmp(\.[0-9]+)?$",
    // GNOME/gvfs atomic save
    r"(^|[/\\])\.goutputstream-",
    // kate swap files
    r"\.kate-swp$",
];

/// Returns true iff `path` ends with one of `extensions`.
///
/// No glob semantics and no case folding: `".go"` matches `main.go` but not
/// `main.GO`.
pub fn is_watched(path: &Path, extensions: &[String]) -> bool {
    let path = path.to_string_lossy();
    extensions.iter().any(|ext| path.ends_with(ext.as_str()))
}

pub fn default_extensions() -> Vec<String> {
    vec![DEFAULT_EXTENSION.to_string()]
}

/// The resolved, never-empty extension list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}

impl ExtensionFilter {
    /// Build a filter from configured suffixes.
    ///
    /// Empty entries are dropped; if nothing is left, the default
    /// single-extension list is used instead.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut extensions: Vec<String> = extensions
            .into_iter()
            .map(Into::into)
            .filter(|ext| !ext.is_empty())
            .collect();

        if extensions.is_empty() {
            extensions = default_extensions();
        }

        Self { extensions }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn is_watched(&self, path: &Path) -> bool {
        is_watched(path, &self.extensions)
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(default_extensions())
    }
}

/// Compiled set of temp-file patterns.
#[derive(Debug, Clone)]
pub struct TransientMarkers {
    set: RegexSet,
}

impl TransientMarkers {
    /// Built-in markers plus the given extra regexes.
    pub fn new<I, S>(extra: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns: Vec<String> = DEFAULT_TRANSIENT_MARKERS
            .iter()
            .map(|p| p.to_string())
            .collect();
        patterns.extend(extra.into_iter().map(|p| p.as_ref().to_string()));

        Ok(Self {
            set: RegexSet::new(patterns)?,
        })
    }

    pub fn is_transient(&self, path: &Path) -> bool {
        self.set.is_match(&path.to_string_lossy())
    }
}

impl Default for TransientMarkers {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>()).unwrap_or_else(|_| Self {
            set: RegexSet::empty(),
        })
    }
}
