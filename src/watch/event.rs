// src/watch/event.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Kind of filesystem change reported by the watch primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Create,
    Write,
    Remove,
    /// The path was renamed away (old name).
    Rename,
    /// Something was renamed onto the path (new name).
    Move,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Op::Create => "CREATE",
            Op::Write => "WRITE",
            Op::Remove => "REMOVE",
            Op::Rename => "RENAME",
            Op::Move => "MOVE",
        };
        f.write_str(s)
    }
}

/// A single change notification.
///
/// Produced by a [`WatchPrimitive`](crate::watch::WatchPrimitive) and consumed
/// (then dropped) by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub op: Op,
    pub observed_at: Instant,
}

impl ChangeEvent {
    /// An event observed right now.
    pub fn new(path: impl Into<PathBuf>, op: Op) -> Self {
        Self::at(path, op, Instant::now())
    }

    /// An event with an explicit observation time.
    pub fn at(path: impl Into<PathBuf>, op: Op, observed_at: Instant) -> Self {
        Self {
            path: path.into(),
            op,
            observed_at,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create-like: something now exists at `path` that did not before.
    pub fn is_arrival(&self) -> bool {
        matches!(self.op, Op::Create | Op::Move)
    }

    /// Remove-like: whatever was at `path` is gone.
    pub fn is_departure(&self) -> bool {
        matches!(self.op, Op::Remove | Op::Rename)
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.path.display())
    }
}
