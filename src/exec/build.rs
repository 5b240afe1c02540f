// src/exec/build.rs

//! The build step: run the configured build tool once and report whether it
//! produced a runnable artifact.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::BuildError;
use crate::exec::backend::{BoxFuture, Builder};
use crate::exec::relay;
use crate::status::SharedSink;

/// Fully resolved build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    pub command: String,
    pub args: Vec<String>,
    /// Artifact the build is expected to produce.
    pub output: PathBuf,
    /// Directory the build runs in; inherits ours when `None`.
    pub working_dir: Option<PathBuf>,
}

impl BuildSpec {
    /// `command arg1 arg2 ...`, for messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Run the build described by `spec` to completion.
///
/// The tool's stdout/stderr are relayed through `sink` while it runs. A
/// non-zero exit is a [`BuildError::Failed`]; a tool that cannot be started
/// at all is a [`BuildError::Spawn`].
pub async fn run_build(spec: &BuildSpec, sink: &SharedSink) -> Result<(), BuildError> {
    let command_line = spec.command_line();
    debug!(cmd = %command_line, dir = ?spec.working_dir, "starting build");

    let mut cmd = Command::new(&spec.command);
    cmd.args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &spec.working_dir {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(|source| BuildError::Spawn {
        command: command_line.clone(),
        source,
    })?;

    let relays = relay::attach(&mut child, &spec.command, sink);

    let status = child.wait().await.map_err(|source| BuildError::Wait {
        command: command_line.clone(),
        source,
    })?;
    relays.finish().await;

    info!(
        cmd = %command_line,
        exit_code = ?status.code(),
        success = status.success(),
        "build process exited"
    );

    if status.success() {
        Ok(())
    } else {
        Err(BuildError::Failed {
            command: command_line,
            code: status.code(),
        })
    }
}

/// [`Builder`] that shells out to the configured build tool.
pub struct CommandBuilder {
    spec: BuildSpec,
    sink: SharedSink,
}

impl CommandBuilder {
    pub fn new(spec: BuildSpec, sink: SharedSink) -> Self {
        Self { spec, sink }
    }
}

impl Builder for CommandBuilder {
    fn build(&self) -> BoxFuture<'_, Result<(), BuildError>> {
        Box::pin(run_build(&self.spec, &self.sink))
    }

    fn describe(&self) -> String {
        self.spec.output.display().to_string()
    }
}
