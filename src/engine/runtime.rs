// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::errors::{Result, WatchError};
use crate::status::SharedSink;
use crate::watch::{EventStream, WatchMessage, WatchPrimitive};

use super::core::WatchCore;
use super::pipeline::{CycleOutcome, RebuildPipeline};
use super::CoreCommand;

/// Drives [`WatchCore`] from a live [`EventStream`].
///
/// This is the IO shell around the core: it pulls events, feeds them to the
/// core, registers/releases directories with the primitive and kicks off
/// rebuild cycles. Cycles run on their own tasks; the loop never waits for
/// one, so events keep flowing while a build is in progress.
pub struct Runtime<P: WatchPrimitive> {
    core: WatchCore,
    primitive: Arc<P>,
    stream: EventStream,
    pipeline: Arc<RebuildPipeline>,
    sink: SharedSink,
    cycles: JoinSet<CycleOutcome>,
}

impl<P: WatchPrimitive> fmt::Debug for Runtime<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("in_flight", &self.cycles.len())
            .finish_non_exhaustive()
    }
}

impl<P: WatchPrimitive + 'static> Runtime<P> {
    pub fn new(
        core: WatchCore,
        primitive: Arc<P>,
        stream: EventStream,
        pipeline: Arc<RebuildPipeline>,
        sink: SharedSink,
    ) -> Self {
        Self {
            core,
            primitive,
            stream,
            pipeline,
            sink,
            cycles: JoinSet::new(),
        }
    }

    /// Start a rebuild cycle without waiting for an event.
    pub fn rebuild_now(&mut self) {
        let pipeline = Arc::clone(&self.pipeline);
        self.cycles.spawn(async move { pipeline.run_cycle().await });
    }

    /// Main event loop.
    ///
    /// Runs until the event stream closes, then waits for the cycles that are
    /// still in flight. Nothing that happens to a single event ends the loop.
    pub async fn run(mut self) -> Result<()> {
        info!("livereload runtime started");

        while let Some(message) = self.stream.next().await {
            match message {
                WatchMessage::Event(event) => {
                    debug!(%event, "runtime received event");
                    let step = self.core.step(event);
                    for command in step.commands {
                        self.execute_command(command);
                    }
                }
                WatchMessage::Error(err) => {
                    self.sink.error(&format!("watch error: {err}"));
                }
            }

            self.reap_finished();
        }

        info!("event stream closed; waiting for in-flight rebuilds");
        while let Some(joined) = self.cycles.join_next().await {
            if let Err(err) = joined {
                debug!(error = %err, "rebuild task did not complete");
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    fn execute_command(&mut self, command: CoreCommand) {
        match command {
            CoreCommand::Watch(dirs) => {
                for dir in dirs {
                    match self.primitive.add_path(&dir) {
                        Ok(()) => self.sink.trace(&format!("watching {}", dir.display())),
                        Err(err) => {
                            self.sink.warning(&err.to_string());
                            self.core.registration_failed(&dir);
                        }
                    }
                }
            }
            CoreCommand::Unwatch(dirs) => {
                for dir in dirs {
                    match self.primitive.remove_path(&dir) {
                        Ok(()) => self.sink.trace(&format!("stopped watching {}", dir.display())),
                        // The backend usually drops watches on deleted
                        // directories by itself.
                        Err(err @ WatchError::NotWatched { .. }) => {
                            debug!(error = %err, "directory already released");
                        }
                        Err(err) => self.sink.warning(&err.to_string()),
                    }
                }
            }
            CoreCommand::Rebuild { cause } => {
                debug!(%cause, "starting rebuild cycle");
                self.rebuild_now();
            }
        }
    }

    fn reap_finished(&mut self) {
        while let Some(joined) = self.cycles.try_join_next() {
            if let Err(err) = joined {
                debug!(error = %err, "rebuild task did not complete");
            }
        }
    }
}
