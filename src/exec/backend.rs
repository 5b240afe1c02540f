// src/exec/backend.rs

//! Seams between the orchestrator and the outside world's processes.
//!
//! The rebuild pipeline talks to a [`Builder`] and the supervisor to a
//! [`ProcessLauncher`] instead of `tokio::process` directly. Production code
//! uses [`CommandBuilder`](crate::exec::CommandBuilder) and
//! [`TokioLauncher`](crate::exec::TokioLauncher); tests swap in fakes that
//! record what was asked of them and return scripted outcomes.

use std::fmt;
use std::future::Future;
use std::io;
use std::path::Path;
use std::pin::Pin;

use crate::errors::BuildError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Runs the build step.
pub trait Builder: Send + Sync {
    /// One build attempt; resolves once the build tool has exited.
    fn build(&self) -> BoxFuture<'_, Result<(), BuildError>>;

    /// Human-readable description used in status lines.
    fn describe(&self) -> String;
}

/// Starts instances of the built program.
pub trait ProcessLauncher: Send + Sync {
    /// Start `program` with `args`. Must not block on the program itself.
    fn launch(&self, program: &Path, args: &[String]) -> io::Result<Box<dyn ProcessHandle>>;
}

/// A started instance of the program.
pub trait ProcessHandle: Send + fmt::Debug {
    /// OS process id, if the platform (or fake) has one.
    fn id(&self) -> Option<u32>;

    /// Forcefully stop the instance and wait until it is gone.
    ///
    /// Killing an instance that already exited on its own is not an error.
    fn kill(&mut self) -> BoxFuture<'_, io::Result<()>>;
}
