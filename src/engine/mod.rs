// src/engine/mod.rs

//! Orchestration engine for livereload.
//!
//! The pure state machine lives in [`core`]: it turns change events into
//! commands. The async shell in [`runtime`] consumes the watch stream, keeps
//! the watch primitive in sync with the core's watch set, and hands
//! rebuilds to the [`pipeline`], which runs build-then-restart cycles in the
//! background.

use std::path::PathBuf;

use crate::watch::ChangeEvent;

/// Command produced by the pure core, executed by the async shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Register these directories with the watch primitive.
    Watch(Vec<PathBuf>),
    /// Release these directories.
    Unwatch(Vec<PathBuf>),
    /// Start one build-then-restart cycle.
    Rebuild { cause: ChangeEvent },
}

/// Everything the core decided in response to one event.
#[derive(Debug, Clone, Default)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
}

pub mod core;
pub mod pipeline;
pub mod runtime;

pub use core::WatchCore;
pub use pipeline::{CycleOutcome, RebuildPipeline};
pub use runtime::Runtime;
