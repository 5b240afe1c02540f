// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info};

use crate::errors::{LivereloadError, Result, WatchError};
use crate::watch::event::{ChangeEvent, Op};
use crate::watch::primitive::{subscribe_all, EventSender, EventStream, WatchPrimitive};

/// [`WatchPrimitive`] backed by the platform's recommended `notify` watcher.
///
/// Every directory is watched non-recursively; the orchestrator decides which
/// directories belong to the watch set and adds/removes them one by one.
pub struct NotifyWatcher {
    inner: Mutex<RecommendedWatcher>,
}

impl std::fmt::Debug for NotifyWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyWatcher").finish()
    }
}

impl NotifyWatcher {
    /// Create a watcher with no directories registered yet.
    pub fn new() -> Result<(Self, EventStream)> {
        let (tx, stream) = EventStream::channel();

        // Closure called synchronously by notify whenever an event arrives.
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| forward(&tx, res),
            Config::default(),
        )
        .map_err(|e| LivereloadError::Other(e.into()))?;

        Ok((
            Self {
                inner: Mutex::new(watcher),
            },
            stream,
        ))
    }

    /// Create a watcher and register all `dirs`; any failure is fatal.
    pub fn subscribe<'a, I>(dirs: I) -> Result<(Self, EventStream)>
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let (watcher, stream) = Self::new()?;
        let count = subscribe_all(&watcher, dirs)?;
        info!(directories = count, "file watcher started");
        Ok((watcher, stream))
    }

    fn lock(&self) -> MutexGuard<'_, RecommendedWatcher> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl WatchPrimitive for NotifyWatcher {
    fn add_path(&self, path: &Path) -> std::result::Result<(), WatchError> {
        self.lock()
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::Register {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn remove_path(&self, path: &Path) -> std::result::Result<(), WatchError> {
        self.lock().unwatch(path).map_err(|e| match e.kind {
            notify::ErrorKind::WatchNotFound => WatchError::NotWatched {
                path: path.to_path_buf(),
            },
            _ => WatchError::Unregister {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })
    }
}

fn forward(tx: &EventSender, res: notify::Result<Event>) {
    match res {
        Ok(event) => {
            for change in classify(&event, Instant::now()) {
                if !tx.send_event(change) {
                    // Stream dropped; nobody is listening any more.
                    return;
                }
            }
        }
        Err(err) => {
            tx.send_error(err.to_string());
        }
    }
}

/// Map a raw `notify` event onto zero or more [`ChangeEvent`]s.
///
/// Metadata-only changes (permissions, timestamps) and access events are
/// dropped. Renames are split into the departing name (`Rename`) and the
/// arriving name (`Move`).
pub fn classify(event: &Event, observed_at: Instant) -> Vec<ChangeEvent> {
    let op = match event.kind {
        EventKind::Create(_) => Op::Create,
        EventKind::Remove(_) => Op::Remove,
        EventKind::Modify(ModifyKind::Metadata(_)) | EventKind::Access(_) => {
            debug!(?event, "dropping metadata/access event");
            return Vec::new();
        }
        EventKind::Modify(ModifyKind::Name(mode)) => {
            return classify_rename(mode, &event.paths, observed_at);
        }
        EventKind::Modify(_) | EventKind::Any | EventKind::Other => Op::Write,
    };

    event
        .paths
        .iter()
        .map(|p| ChangeEvent::at(p.clone(), op, observed_at))
        .collect()
}

fn classify_rename(mode: RenameMode, paths: &[PathBuf], observed_at: Instant) -> Vec<ChangeEvent> {
    match mode {
        RenameMode::From => paths
            .iter()
            .map(|p| ChangeEvent::at(p.clone(), Op::Rename, observed_at))
            .collect(),
        RenameMode::To => paths
            .iter()
            .map(|p| ChangeEvent::at(p.clone(), Op::Move, observed_at))
            .collect(),
        RenameMode::Both => {
            let mut out = Vec::with_capacity(2);
            if let Some(from) = paths.first() {
                out.push(ChangeEvent::at(from.clone(), Op::Rename, observed_at));
            }
            if let Some(to) = paths.get(1) {
                out.push(ChangeEvent::at(to.clone(), Op::Move, observed_at));
            }
            out
        }
        // The backend could not tell which side of the rename this is
        // (FSEvents does this); ask the filesystem.
        RenameMode::Any | RenameMode::Other => paths
            .iter()
            .map(|p| {
                let op = if p.exists() { Op::Move } else { Op::Rename };
                ChangeEvent::at(p.clone(), op, observed_at)
            })
            .collect(),
    }
}
