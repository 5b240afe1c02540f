// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};

use crate::config::Overrides;

/// Command-line arguments for `livereload`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "livereload",
    version,
    about = "Watch a source tree, rebuild on change and restart the built program.",
    long_about = None
)]
pub struct CliArgs {
    /// Extra directories to watch. The project directory is always watched.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Project directory: the build runs and the program starts here.
    ///
    /// Default: the current working directory.
    #[arg(short = 'w', long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Name of the built artifact (default: project directory name).
    #[arg(short = 'o', long, value_name = "NAME")]
    pub output: Option<String>,

    /// Main file passed to the default build command. Repeatable.
    #[arg(short = 'f', long = "main", value_name = "FILE")]
    pub main: Vec<String>,

    /// Watch subdirectories too (default: true).
    #[arg(short = 'r', long, value_name = "BOOL", action = ArgAction::Set)]
    pub recursive: Option<bool>,

    /// File suffix that triggers a rebuild, e.g. `.go`. Repeatable.
    #[arg(short = 'e', long = "ext", value_name = "SUFFIX")]
    pub extensions: Vec<String>,

    /// Path to a config file (TOML).
    ///
    /// Default: `Livereload.toml` in the project directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Build tool to run instead of `go`.
    #[arg(long = "build-cmd", value_name = "PROGRAM")]
    pub build_command: Option<String>,

    /// Argument for the build tool, replacing the default list. Repeatable.
    #[arg(long = "build-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub build_args: Vec<String>,

    /// Argument for the supervised program. Repeatable.
    #[arg(long = "run-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub run_args: Vec<String>,

    /// Minimum time between two rebuilds, e.g. `300ms`.
    #[arg(long, value_name = "DURATION")]
    pub debounce: Option<String>,

    /// Do not build and start the program before the first change.
    #[arg(long)]
    pub no_initial_build: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `LIVERELOAD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the resolved settings and watch set, then exit.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Project directory as given, resolved against `cwd`.
    pub fn project_dir(&self, cwd: &Path) -> PathBuf {
        match &self.dir {
            Some(dir) => cwd.join(dir),
            None => cwd.to_path_buf(),
        }
    }

    /// Settings given on the command line. Relative paths are resolved
    /// against `cwd`.
    pub fn overrides(&self, cwd: &Path) -> Overrides {
        Overrides {
            paths: self.paths.iter().map(|p| cwd.join(p)).collect(),
            recursive: self.recursive,
            extensions: self.extensions.clone(),
            output: self.output.clone(),
            main: self.main.clone(),
            build_command: self.build_command.clone(),
            build_args: self.build_args.clone(),
            run_args: self.run_args.clone(),
            debounce: self.debounce.clone(),
            initial: self.no_initial_build.then_some(false),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
