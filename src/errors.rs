// src/errors.rs

//! Crate-wide error types.
//!
//! `LivereloadError` covers everything that can stop startup. The per-stage
//! errors (`WatchError`, `BuildError`, `RestartError`) are recoverable: the
//! orchestrator logs them as a single status line and keeps going.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LivereloadError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("cannot subscribe to {path:?}: {source}")]
    Subscription {
        path: PathBuf,
        #[source]
        source: WatchError,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LivereloadError {
    /// Process exit status used by `main` when this error ends the run.
    pub fn exit_code(&self) -> i32 {
        match self {
            LivereloadError::Subscription { .. } => 2,
            _ => 1,
        }
    }
}

/// Failure to (un)register a single directory with the watch primitive.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("failed to watch {path:?}: {reason}")]
    Register { path: PathBuf, reason: String },

    #[error("failed to stop watching {path:?}: {reason}")]
    Unregister { path: PathBuf, reason: String },

    #[error("{path:?} is not being watched")]
    NotWatched { path: PathBuf },
}

/// Failure of one build invocation.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("failed waiting for `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` {}", describe_exit(.code))]
    Failed { command: String, code: Option<i32> },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

/// Failure while replacing the supervised process.
#[derive(Error, Debug)]
pub enum RestartError {
    #[error("failed to kill process {}: {source}", describe_pid(.pid))]
    Kill {
        pid: Option<u32>,
        #[source]
        source: io::Error,
    },

    #[error("failed to launch {program:?}: {source}")]
    Launch {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn describe_pid(pid: &Option<u32>) -> String {
    match pid {
        Some(pid) => pid.to_string(),
        None => "<unknown>".to_string(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, LivereloadError>;
