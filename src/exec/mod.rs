// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`build`] runs the build tool once per rebuild cycle.
//! - [`supervisor`] replaces the running program instance after a build.
//! - [`process`] is the `tokio::process` launcher the supervisor uses in
//!   production.
//! - [`relay`] forwards child stdout/stderr to the status sink.
//! - [`backend`] holds the `Builder` / `ProcessLauncher` traits that tests
//!   replace with fakes.

pub mod backend;
pub mod build;
pub mod process;
pub mod relay;
pub mod supervisor;

pub use backend::{BoxFuture, Builder, ProcessHandle, ProcessLauncher};
pub use build::{run_build, BuildSpec, CommandBuilder};
pub use process::{TokioLauncher, TokioProcess};
pub use supervisor::{normalize_artifact, Supervisor};
