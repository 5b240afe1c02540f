// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::exec::BuildSpec;
use crate::types::ChangeDetection;

/// Configuration file as read from TOML.
///
/// ```toml
/// [watch]
/// paths = ["../shared"]
/// extensions = [".go", ".tmpl"]
/// exclude = ["vendor"]
/// debounce = "300ms"
///
/// [build]
/// output = "myapp"
///
/// [run]
/// args = ["--port", "8080"]
/// ```
///
/// Every section and key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: RawWatchSection,

    #[serde(default)]
    pub build: RawBuildSection,

    #[serde(default)]
    pub run: RawRunSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawWatchSection {
    /// Extra roots, relative to the project directory. The project directory
    /// itself is always watched.
    #[serde(default)]
    pub paths: Vec<String>,

    pub recursive: Option<bool>,

    /// File suffixes that trigger a rebuild. Empty means `[".go"]`.
    pub extensions: Option<Vec<String>>,

    pub include_hidden: Option<bool>,

    /// Glob patterns, matched against paths relative to their root.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Extra regexes for editor temp files.
    #[serde(default)]
    pub transient_markers: Vec<String>,

    /// Duration string such as `"1ms"` or `"2s"`.
    pub debounce: Option<String>,

    pub change_detection: Option<ChangeDetection>,
}

/// `[build]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawBuildSection {
    pub command: Option<String>,

    /// Full argument list. When empty, `["build", "-o", <output>, <main...>]`.
    #[serde(default)]
    pub args: Vec<String>,

    /// Main files appended to the default argument list.
    #[serde(default)]
    pub main: Vec<String>,

    pub output: Option<String>,

    pub serialize: Option<bool>,

    pub initial: Option<bool>,
}

/// `[run]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRunSection {
    #[serde(default)]
    pub args: Vec<String>,
}

/// Values given on the command line; they win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Extra roots, already absolute.
    pub paths: Vec<PathBuf>,
    pub recursive: Option<bool>,
    pub extensions: Vec<String>,
    pub output: Option<String>,
    pub main: Vec<String>,
    pub build_command: Option<String>,
    pub build_args: Vec<String>,
    pub run_args: Vec<String>,
    pub debounce: Option<String>,
    pub initial: Option<bool>,
}

/// Validated settings the rest of the crate runs on.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Where the build runs and the program is started.
    pub project_dir: PathBuf,
    pub watch: WatchSettings,
    pub build: BuildSettings,
    pub run: RunSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchSettings {
    /// Absolute roots, deduplicated, project directory first.
    pub roots: Vec<PathBuf>,
    pub recursive: bool,
    /// Never empty.
    pub extensions: Vec<String>,
    pub include_hidden: bool,
    pub exclude: Vec<String>,
    pub transient_markers: Vec<String>,
    pub debounce: Duration,
    pub change_detection: ChangeDetection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildSettings {
    pub spec: BuildSpec,
    pub serialize: bool,
    pub initial: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSettings {
    pub args: Vec<String>,
}
