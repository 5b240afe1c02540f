use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use livereload::errors::BuildError;
use livereload::exec::{BoxFuture, Builder};

/// Outcomes handed out by a [`ScriptedBuilder`], shared with the test.
///
/// Builds succeed unless a failure was queued with [`BuildScript::fail_next`].
#[derive(Debug, Default)]
pub struct BuildScript {
    queued: Mutex<VecDeque<bool>>,
    attempts: AtomicUsize,
    finished: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

impl BuildScript {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn succeed_next(&self) {
        self.queued.lock().unwrap().push_back(true);
    }

    pub fn fail_next(&self) {
        self.queued.lock().unwrap().push_back(false);
    }

    /// Make every build take `delay` before reporting.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Builds started so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Builds that reported an outcome so far.
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

/// [`Builder`] that never spawns anything.
#[derive(Debug, Clone)]
pub struct ScriptedBuilder {
    script: Arc<BuildScript>,
    name: String,
}

impl ScriptedBuilder {
    pub fn new(script: Arc<BuildScript>, name: &str) -> Self {
        Self {
            script,
            name: name.to_string(),
        }
    }
}

impl Builder for ScriptedBuilder {
    fn build(&self) -> BoxFuture<'_, Result<(), BuildError>> {
        Box::pin(async move {
            self.script.attempts.fetch_add(1, Ordering::SeqCst);

            let delay = *self.script.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let ok = self.script.queued.lock().unwrap().pop_front().unwrap_or(true);
            self.script.finished.fetch_add(1, Ordering::SeqCst);

            if ok {
                Ok(())
            } else {
                Err(BuildError::Failed {
                    command: format!("fake build {}", self.name),
                    code: Some(1),
                })
            }
        })
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}
