// src/types.rs

use serde::Deserialize;

/// How the orchestrator decides whether a relevant file actually changed
/// before letting an event through to the debounce gate.
///
/// - `None`: every relevant event counts (default).
/// - `Mtime`: skip events whose file modification time equals the one seen
///   on the previous event for that path.
/// - `Hash`: skip events whose file contents hash to the same value as on the
///   previous event for that path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDetection {
    None,
    Mtime,
    Hash,
}

impl Default for ChangeDetection {
    fn default() -> Self {
        ChangeDetection::None
    }
}

/// Which standard stream of a child process a relayed line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}
