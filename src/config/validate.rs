// src/config/validate.rs

use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};

use globset::Glob;

use crate::config::model::{
    BuildSettings, Overrides, RawBuildSection, RawConfigFile, RawWatchSection, RunSettings,
    Settings, WatchSettings,
};
use crate::errors::{LivereloadError, Result};
use crate::exec::BuildSpec;
use crate::watch::debounce::parse_duration;
use crate::watch::filter::default_extensions;
use crate::watch::{TransientMarkers, DEFAULT_DEBOUNCE_WINDOW};

pub const DEFAULT_BUILD_COMMAND: &str = "go";

/// Everything settings are resolved from.
#[derive(Debug, Clone)]
pub struct ConfigSources {
    /// Absolute project directory.
    pub project_dir: PathBuf,
    pub file: RawConfigFile,
    pub overrides: Overrides,
}

impl TryFrom<ConfigSources> for Settings {
    type Error = LivereloadError;

    fn try_from(sources: ConfigSources) -> std::result::Result<Self, Self::Error> {
        let ConfigSources {
            project_dir,
            file,
            overrides,
        } = sources;

        let watch = resolve_watch(&project_dir, file.watch, &overrides)?;
        let build = resolve_build(&project_dir, file.build, &overrides)?;
        let run = RunSettings {
            args: pick_list(overrides.run_args, file.run.args),
        };

        Ok(Settings {
            project_dir,
            watch,
            build,
            run,
        })
    }
}

/// Command-line list if given, file list otherwise.
fn pick_list(cli: Vec<String>, file: Vec<String>) -> Vec<String> {
    if cli.is_empty() { file } else { cli }
}

fn config_error(msg: impl Into<String>) -> LivereloadError {
    LivereloadError::ConfigError(msg.into())
}

fn resolve_watch(
    project_dir: &Path,
    raw: RawWatchSection,
    overrides: &Overrides,
) -> Result<WatchSettings> {
    let mut roots = vec![project_dir.to_path_buf()];
    roots.extend(raw.paths.iter().map(|p| project_dir.join(p)));
    roots.extend(overrides.paths.iter().cloned());
    let roots = dedupe_roots(roots);

    let extensions = if overrides.extensions.is_empty() {
        raw.extensions.unwrap_or_default()
    } else {
        overrides.extensions.clone()
    };
    if extensions.iter().any(|ext| ext.is_empty()) {
        return Err(config_error("[watch].extensions entries must be non-empty"));
    }
    let extensions = if extensions.is_empty() {
        default_extensions()
    } else {
        extensions
    };

    let debounce = match overrides.debounce.as_deref().or(raw.debounce.as_deref()) {
        Some(s) => parse_duration(s).map_err(|e| config_error(format!("[watch].debounce: {e}")))?,
        None => DEFAULT_DEBOUNCE_WINDOW,
    };

    for pattern in &raw.exclude {
        Glob::new(pattern)
            .map_err(|e| config_error(format!("[watch].exclude: invalid glob {pattern:?}: {e}")))?;
    }
    TransientMarkers::new(&raw.transient_markers)
        .map_err(|e| config_error(format!("[watch].transient_markers: {e}")))?;

    Ok(WatchSettings {
        roots,
        recursive: overrides.recursive.or(raw.recursive).unwrap_or(true),
        extensions,
        include_hidden: raw.include_hidden.unwrap_or(false),
        exclude: raw.exclude,
        transient_markers: raw.transient_markers,
        debounce,
        change_detection: raw.change_detection.unwrap_or_default(),
    })
}

/// Canonicalize where possible and drop duplicates, keeping first-seen order.
///
/// Roots that do not exist are kept as given; expansion reports them.
fn dedupe_roots(roots: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::with_capacity(roots.len());
    for root in roots {
        let root = std::fs::canonicalize(&root).unwrap_or(root);
        if !out.contains(&root) {
            out.push(root);
        }
    }
    out
}

fn resolve_build(
    project_dir: &Path,
    raw: RawBuildSection,
    overrides: &Overrides,
) -> Result<BuildSettings> {
    let command = overrides
        .build_command
        .clone()
        .or(raw.command)
        .unwrap_or_else(|| DEFAULT_BUILD_COMMAND.to_string());
    if command.trim().is_empty() {
        return Err(config_error("[build].command must not be empty"));
    }

    let output = match overrides.output.clone().or(raw.output) {
        Some(output) => output,
        None => default_output(project_dir)?,
    };
    if output.trim().is_empty() {
        return Err(config_error("[build].output must not be empty"));
    }
    let output = with_exe_suffix(output);

    let main = pick_list(overrides.main.clone(), raw.main);
    let mut args = pick_list(overrides.build_args.clone(), raw.args);
    if args.is_empty() {
        args = vec!["build".to_string(), "-o".to_string(), output.clone()];
        args.extend(main);
    }

    Ok(BuildSettings {
        spec: BuildSpec {
            command,
            args,
            output: PathBuf::from(output),
            working_dir: Some(project_dir.to_path_buf()),
        },
        serialize: raw.serialize.unwrap_or(true),
        initial: overrides.initial.or(raw.initial).unwrap_or(true),
    })
}

/// Artifact named after the project directory.
fn default_output(project_dir: &Path) -> Result<String> {
    project_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            config_error(format!(
                "cannot derive an artifact name from {project_dir:?}; set [build].output"
            ))
        })
}

fn with_exe_suffix(output: String) -> String {
    if EXE_SUFFIX.is_empty() || output.ends_with(EXE_SUFFIX) {
        output
    } else {
        format!("{output}{EXE_SUFFIX}")
    }
}
