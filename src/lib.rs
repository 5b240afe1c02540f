// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod status;
pub mod types;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{default_config_path, load_from_path, load_optional, ConfigSources, Settings};
use crate::engine::{RebuildPipeline, Runtime, WatchCore};
use crate::errors::{LivereloadError, Result};
use crate::exec::{CommandBuilder, Supervisor, TokioLauncher};
use crate::fs::{FileSystem, RealFileSystem};
use crate::status::{SharedSink, TracingSink};
use crate::watch::NotifyWatcher;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the initial watch set and its subscription
/// - build runner, supervisor and rebuild pipeline
/// - the event loop
pub async fn run(args: CliArgs) -> Result<()> {
    let settings = resolve_settings(&args)?;
    let sink = TracingSink::shared();
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let mut core = WatchCore::new(&settings.watch, fs, sink.clone())?;
    let dirs: Vec<PathBuf> = core.init().iter().cloned().collect();

    if args.dry_run {
        print_dry_run(&settings, &dirs);
        return Ok(());
    }

    sink.trace("watcher begin...");
    let (watcher, stream) = NotifyWatcher::subscribe(dirs.iter().map(PathBuf::as_path))?;

    let pipeline = Arc::new(build_pipeline(&settings, &sink));
    let mut runtime = Runtime::new(core, Arc::new(watcher), stream, pipeline, sink.clone());

    if settings.build.initial {
        runtime.rebuild_now();
    }

    // Ctrl-C is not intercepted; the supervised program goes down with us.
    runtime.run().await
}

/// Load the config file (if any) and merge it with the command line.
pub fn resolve_settings(args: &CliArgs) -> Result<Settings> {
    let cwd = std::env::current_dir()?;

    let project_dir = args.project_dir(&cwd);
    let project_dir = project_dir.canonicalize().map_err(|e| {
        LivereloadError::ConfigError(format!("cannot use project directory {project_dir:?}: {e}"))
    })?;

    let file = match &args.config {
        Some(path) => load_from_path(cwd.join(path))?,
        None => load_optional(default_config_path(&project_dir))?.unwrap_or_default(),
    };

    let settings = Settings::try_from(ConfigSources {
        project_dir,
        file,
        overrides: args.overrides(&cwd),
    })?;
    debug!(?settings, "resolved settings");
    Ok(settings)
}

fn build_pipeline(settings: &Settings, sink: &SharedSink) -> RebuildPipeline {
    let spec = settings.build.spec.clone();
    let launcher = TokioLauncher::new(sink.clone(), spec.working_dir.clone());
    let supervisor = Supervisor::new(
        Box::new(launcher),
        &spec.output,
        settings.run.args.clone(),
        sink.clone(),
    );
    RebuildPipeline::new(
        Box::new(CommandBuilder::new(spec, sink.clone())),
        supervisor,
        settings.build.serialize,
        sink.clone(),
    )
}

/// Simple dry-run output: what would be watched, built and run.
fn print_dry_run(settings: &Settings, dirs: &[PathBuf]) {
    println!("livereload dry-run");
    println!("  project: {}", settings.project_dir.display());
    println!();

    let watch = &settings.watch;
    println!("watch:");
    println!("  roots:");
    for root in &watch.roots {
        println!("    - {}", root.display());
    }
    println!("  recursive: {}", watch.recursive);
    println!("  extensions: {:?}", watch.extensions);
    if !watch.exclude.is_empty() {
        println!("  exclude: {:?}", watch.exclude);
    }
    println!("  debounce: {:?}", watch.debounce);
    println!("  change_detection: {:?}", watch.change_detection);
    println!("  directories ({}):", dirs.len());
    for dir in dirs {
        println!("    - {}", dir.display());
    }
    println!();

    let build = &settings.build;
    println!("build:");
    println!("  command: {}", build.spec.command_line());
    println!("  artifact: {}", build.spec.output.display());
    println!("  initial: {}", build.initial);
    println!("  serialize: {}", build.serialize);
    println!();

    println!("run:");
    println!("  args: {:?}", settings.run.args);

    debug!("dry-run complete (no execution)");
}
