// src/engine/pipeline.rs

//! One rebuild cycle: build, and restart the program if the build succeeded.

use std::fmt;

use tokio::sync::Mutex;
use tracing::debug;

use crate::exec::{Builder, Supervisor};
use crate::status::SharedSink;

/// How a single cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Restarted,
    BuildFailed,
    LaunchFailed,
}

/// Shared between the event loop and every in-flight cycle.
///
/// The supervisor sits behind its own lock, so kill-then-launch sequences
/// never interleave. With `serialize` on, a whole cycle (build included)
/// holds `cycle` as well, so builds run one at a time in arrival order.
pub struct RebuildPipeline {
    builder: Box<dyn Builder>,
    supervisor: Mutex<Supervisor>,
    cycle: Mutex<()>,
    serialize: bool,
    sink: SharedSink,
}

impl fmt::Debug for RebuildPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RebuildPipeline")
            .field("builder", &self.builder.describe())
            .field("serialize", &self.serialize)
            .finish_non_exhaustive()
    }
}

impl RebuildPipeline {
    pub fn new(
        builder: Box<dyn Builder>,
        supervisor: Supervisor,
        serialize: bool,
        sink: SharedSink,
    ) -> Self {
        Self {
            builder,
            supervisor: Mutex::new(supervisor),
            cycle: Mutex::new(()),
            serialize,
            sink,
        }
    }

    /// Build, then restart on success. Failures are reported through the
    /// sink and never leave this function.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let _serial = if self.serialize {
            Some(self.cycle.lock().await)
        } else {
            None
        };

        let target = self.builder.describe();
        self.sink.info(&format!("building < {target} > ..."));

        if let Err(err) = self.builder.build().await {
            self.sink.error(&format!("build < {target} > failed: {err}"));
            return CycleOutcome::BuildFailed;
        }
        self.sink.success(&format!("build < {target} > succeeded"));

        let mut supervisor = self.supervisor.lock().await;
        let outcome = match supervisor.restart().await {
            Ok(()) => CycleOutcome::Restarted,
            Err(err) => {
                self.sink.error(&err.to_string());
                CycleOutcome::LaunchFailed
            }
        };
        debug!(?outcome, "rebuild cycle finished");
        outcome
    }

    pub async fn current_pid(&self) -> Option<u32> {
        self.supervisor.lock().await.current_pid()
    }

    pub async fn is_running(&self) -> bool {
        self.supervisor.lock().await.is_running()
    }
}
