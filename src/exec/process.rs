// src/exec/process.rs

//! Real processes for the supervisor.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::exec::backend::{BoxFuture, ProcessHandle, ProcessLauncher};
use crate::exec::relay;
use crate::status::SharedSink;

/// Launches the built program with `tokio::process`.
///
/// Relative program paths are resolved against `working_dir`, which is also
/// the child's current directory.
pub struct TokioLauncher {
    sink: SharedSink,
    working_dir: Option<PathBuf>,
}

impl TokioLauncher {
    pub fn new(sink: SharedSink, working_dir: Option<PathBuf>) -> Self {
        Self { sink, working_dir }
    }

    fn resolve(&self, program: &Path) -> PathBuf {
        match &self.working_dir {
            Some(dir) if program.is_relative() => dir.join(program),
            _ => program.to_path_buf(),
        }
    }
}

impl ProcessLauncher for TokioLauncher {
    fn launch(&self, program: &Path, args: &[String]) -> io::Result<Box<dyn ProcessHandle>> {
        let resolved = self.resolve(program);

        let mut cmd = Command::new(&resolved);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn()?;
        info!(program = ?resolved, pid = ?child.id(), "launched process");

        // Readers run until the program closes its pipes; nobody waits for them.
        let origin = program.display().to_string();
        let _ = relay::attach(&mut child, &origin, &self.sink);

        Ok(Box::new(TokioProcess {
            program: resolved,
            pid: child.id(),
            child,
        }))
    }
}

/// A program instance started by [`TokioLauncher`].
pub struct TokioProcess {
    program: PathBuf,
    pid: Option<u32>,
    child: Child,
}

impl fmt::Debug for TokioProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioProcess")
            .field("program", &self.program)
            .field("pid", &self.pid)
            .finish()
    }
}

impl ProcessHandle for TokioProcess {
    fn id(&self) -> Option<u32> {
        self.pid
    }

    fn kill(&mut self) -> BoxFuture<'_, io::Result<()>> {
        Box::pin(async move {
            if let Ok(Some(status)) = self.child.try_wait() {
                debug!(pid = ?self.pid, ?status, "process already exited");
                return Ok(());
            }

            match self.child.kill().await {
                Ok(()) => Ok(()),
                // Reaped between try_wait and kill.
                Err(err) if err.kind() == io::ErrorKind::InvalidInput => Ok(()),
                Err(err) => Err(err),
            }
        })
    }
}
