// src/status.rs

//! Status sink: where the orchestrator reports what it is doing.
//!
//! The core never formats or colours anything itself; it hands a level and a
//! message to a [`StatusSink`]. Child-process output (the build tool and the
//! supervised program) is relayed line by line through the same sink.
//!
//! [`TracingSink`] is the production sink and forwards status lines to
//! `tracing`, so the subscriber set up in [`crate::logging`] decides about
//! colours and filtering.

use std::io::{self, Write};
use std::sync::Arc;

use tracing::{error, info, trace, warn};

use crate::types::Stream;

/// Severity of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatusLevel {
    Trace,
    Info,
    Success,
    Warning,
    Error,
}

pub trait StatusSink: Send + Sync {
    /// Report one leveled status line.
    fn status(&self, level: StatusLevel, message: &str);

    /// Relay one line of output from a child process named `origin`.
    fn relay(&self, origin: &str, stream: Stream, line: &str);

    fn trace(&self, message: &str) {
        self.status(StatusLevel::Trace, message);
    }

    fn info(&self, message: &str) {
        self.status(StatusLevel::Info, message);
    }

    fn success(&self, message: &str) {
        self.status(StatusLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.status(StatusLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.status(StatusLevel::Error, message);
    }
}

/// Shared handle passed to every component that reports status.
pub type SharedSink = Arc<dyn StatusSink>;

/// Sink backed by the global `tracing` subscriber.
///
/// `Success` has no `tracing` counterpart, so it is emitted at `INFO` with a
/// `status = "success"` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn shared() -> SharedSink {
        Arc::new(TracingSink)
    }
}

impl StatusSink for TracingSink {
    fn status(&self, level: StatusLevel, message: &str) {
        match level {
            StatusLevel::Trace => trace!(target: "livereload", "{message}"),
            StatusLevel::Info => info!(target: "livereload", "{message}"),
            StatusLevel::Success => info!(target: "livereload", status = "success", "{message}"),
            StatusLevel::Warning => warn!(target: "livereload", "{message}"),
            StatusLevel::Error => error!(target: "livereload", "{message}"),
        }
    }

    fn relay(&self, _origin: &str, stream: Stream, line: &str) {
        // Raw passthrough, no prefix and no level.
        let _ = match stream {
            Stream::Stdout => writeln!(io::stdout().lock(), "{line}"),
            Stream::Stderr => writeln!(io::stderr().lock(), "{line}"),
        };
    }
}
