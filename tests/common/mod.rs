#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;

use livereload::config::WatchSettings;
use livereload::engine::{RebuildPipeline, Runtime, WatchCore};
use livereload::exec::Supervisor;
use livereload::fs::mock::MockFileSystem;
use livereload::status::SharedSink;
use livereload::watch::{subscribe_all, ChangeEvent, EventSender, EventStream};
use livereload_test_utils::fake_builder::{BuildScript, ScriptedBuilder};
use livereload_test_utils::fake_launcher::{FakeLauncher, LaunchLog};
use livereload_test_utils::fake_watcher::FakeWatcher;
use livereload_test_utils::sink::RecordingSink;

pub use livereload_test_utils::{init_tracing, wait_until, with_timeout};

pub struct HarnessOptions {
    pub artifact: &'static str,
    pub run_args: Vec<String>,
    pub initial: bool,
    pub serialize: bool,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            artifact: "myapp",
            run_args: Vec::new(),
            initial: false,
            serialize: true,
        }
    }
}

/// A running orchestrator wired to fakes: in-memory filesystem, fake watch
/// primitive, scripted builder and fake process launcher.
pub struct Harness {
    pub fs: MockFileSystem,
    pub watcher: Arc<FakeWatcher>,
    pub script: Arc<BuildScript>,
    pub launches: Arc<LaunchLog>,
    pub sink: Arc<RecordingSink>,
    pub pipeline: Arc<RebuildPipeline>,
    tx: Option<EventSender>,
    handle: Option<JoinHandle<livereload::errors::Result<()>>>,
}

impl Harness {
    pub fn start(fs: MockFileSystem, settings: WatchSettings) -> Self {
        Self::start_with(fs, settings, HarnessOptions::default())
    }

    pub fn start_with(fs: MockFileSystem, settings: WatchSettings, opts: HarnessOptions) -> Self {
        init_tracing();

        let sink = RecordingSink::new();
        let shared: SharedSink = sink.clone();

        let mut core = WatchCore::new(&settings, Arc::new(fs.clone()), shared.clone()).unwrap();
        let dirs: Vec<PathBuf> = core.init().iter().cloned().collect();

        let watcher = FakeWatcher::new();
        subscribe_all(&*watcher, dirs.iter().map(PathBuf::as_path)).unwrap();
        let (tx, stream) = EventStream::channel();

        let script = BuildScript::new();
        let launches = LaunchLog::new();
        let supervisor = Supervisor::new(
            Box::new(FakeLauncher::new(Arc::clone(&launches))),
            opts.artifact,
            opts.run_args,
            shared.clone(),
        );
        let pipeline = Arc::new(RebuildPipeline::new(
            Box::new(ScriptedBuilder::new(Arc::clone(&script), opts.artifact)),
            supervisor,
            opts.serialize,
            shared.clone(),
        ));

        let mut runtime = Runtime::new(
            core,
            Arc::clone(&watcher),
            stream,
            Arc::clone(&pipeline),
            shared,
        );
        if opts.initial {
            runtime.rebuild_now();
        }
        let handle = tokio::spawn(runtime.run());

        Self {
            fs,
            watcher,
            script,
            launches,
            sink,
            pipeline,
            tx: Some(tx),
            handle: Some(handle),
        }
    }

    pub fn send(&self, event: ChangeEvent) {
        if let Some(tx) = &self.tx {
            assert!(tx.send_event(event), "runtime stopped listening");
        }
    }

    pub fn send_error(&self, message: &str) {
        if let Some(tx) = &self.tx {
            assert!(tx.send_error(message), "runtime stopped listening");
        }
    }

    /// Close the event stream and wait for the runtime (and every in-flight
    /// rebuild) to finish.
    pub async fn finish(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            with_timeout(handle).await.unwrap().unwrap();
        }
    }

    /// Whether the runtime task is still running.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}
