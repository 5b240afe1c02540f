use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use livereload::errors::WatchError;
use livereload::watch::WatchPrimitive;

/// In-memory watch primitive.
///
/// Records every add/remove and the resulting watch set. Events are pushed
/// by the test through the `EventSender` half of an `EventStream::channel()`.
#[derive(Debug, Default)]
pub struct FakeWatcher {
    state: Mutex<FakeWatcherState>,
}

#[derive(Debug, Default)]
struct FakeWatcherState {
    watched: BTreeSet<PathBuf>,
    added: Vec<PathBuf>,
    removed: Vec<PathBuf>,
    refuse: HashSet<PathBuf>,
}

impl FakeWatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every future `add_path(path)` fail.
    pub fn refuse(&self, path: impl Into<PathBuf>) {
        self.state.lock().unwrap().refuse.insert(path.into());
    }

    pub fn watched(&self) -> BTreeSet<PathBuf> {
        self.state.lock().unwrap().watched.clone()
    }

    pub fn is_watching(&self, path: impl AsRef<Path>) -> bool {
        self.state.lock().unwrap().watched.contains(path.as_ref())
    }

    pub fn added(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().added.clone()
    }

    pub fn removed(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().removed.clone()
    }
}

impl WatchPrimitive for FakeWatcher {
    fn add_path(&self, path: &Path) -> Result<(), WatchError> {
        let mut state = self.state.lock().unwrap();
        if state.refuse.contains(path) {
            return Err(WatchError::Register {
                path: path.to_path_buf(),
                reason: "refused by fake watcher".to_string(),
            });
        }
        state.added.push(path.to_path_buf());
        state.watched.insert(path.to_path_buf());
        Ok(())
    }

    fn remove_path(&self, path: &Path) -> Result<(), WatchError> {
        let mut state = self.state.lock().unwrap();
        if !state.watched.remove(path) {
            return Err(WatchError::NotWatched {
                path: path.to_path_buf(),
            });
        }
        state.removed.push(path.to_path_buf());
        Ok(())
    }
}
