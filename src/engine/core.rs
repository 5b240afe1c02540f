// src/engine/core.rs

//! Pure orchestrator state machine.
//!
//! [`WatchCore`] consumes [`ChangeEvent`]s one at a time and answers with
//! [`CoreCommand`]s: directories to add to or remove from the watch set, and
//! whether to start a rebuild. It never touches the watch primitive or
//! spawns anything itself; the async shell in [`super::runtime`] does that.
//!
//! Filesystem queries (is this new path a directory? did this file really
//! change?) go through the [`FileSystem`] trait, so the whole decision
//! pipeline runs against an in-memory tree in tests.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::WatchSettings;
use crate::engine::{CoreCommand, CoreStep};
use crate::errors::{LivereloadError, Result};
use crate::fs::FileSystem;
use crate::status::SharedSink;
use crate::watch::{
    expand_dir, expand_roots, ChangeEvent, DebounceGate, DirectoryRules, ExtensionFilter,
    FingerprintCache, TransientMarkers,
};

pub struct WatchCore {
    fs: Arc<dyn FileSystem>,
    sink: SharedSink,
    rules: DirectoryRules,
    recursive: bool,
    filter: ExtensionFilter,
    markers: TransientMarkers,
    gate: DebounceGate,
    fingerprints: FingerprintCache,
    watched: BTreeSet<PathBuf>,
}

impl fmt::Debug for WatchCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchCore")
            .field("rules", &self.rules)
            .field("recursive", &self.recursive)
            .field("filter", &self.filter)
            .field("gate", &self.gate)
            .field("watched", &self.watched)
            .finish_non_exhaustive()
    }
}

impl WatchCore {
    pub fn new(settings: &WatchSettings, fs: Arc<dyn FileSystem>, sink: SharedSink) -> Result<Self> {
        let rules = DirectoryRules::new(
            settings.roots.clone(),
            settings.include_hidden,
            &settings.exclude,
        )
        .map_err(|e| LivereloadError::ConfigError(format!("{e:#}")))?;

        let markers = TransientMarkers::new(&settings.transient_markers)
            .map_err(|e| LivereloadError::ConfigError(format!("invalid transient marker: {e}")))?;

        Ok(Self {
            fs,
            sink,
            rules,
            recursive: settings.recursive,
            filter: ExtensionFilter::new(settings.extensions.iter().cloned()),
            markers,
            gate: DebounceGate::new(settings.debounce),
            fingerprints: FingerprintCache::new(settings.change_detection),
            watched: BTreeSet::new(),
        })
    }

    /// Compute the initial watch set from the configured roots.
    ///
    /// The caller subscribes every returned directory before feeding events.
    pub fn init(&mut self) -> &BTreeSet<PathBuf> {
        self.watched = expand_roots(&*self.fs, &self.rules, self.recursive, &*self.sink);
        &self.watched
    }

    pub fn watched(&self) -> &BTreeSet<PathBuf> {
        &self.watched
    }

    pub fn is_watched_dir(&self, dir: &Path) -> bool {
        self.watched.contains(dir)
    }

    /// The shell could not register `dir`; stop treating it as watched.
    pub fn registration_failed(&mut self, dir: &Path) {
        self.watched.remove(dir);
    }

    /// Handle a single change event.
    pub fn step(&mut self, event: ChangeEvent) -> CoreStep {
        let path = event.path.clone();

        // Late events for directories that were already dropped.
        if !self.covers(&path) {
            debug!(%event, "event outside the watch set");
            return CoreStep::default();
        }

        if event.is_arrival() && self.fs.is_dir(&path) {
            return self.directory_arrived(&path);
        }

        if event.is_departure() && self.watched.contains(&path) {
            return self.directory_departed(&path);
        }

        if !self.filter.is_watched(&path) {
            return CoreStep::default();
        }

        if self.rules.is_excluded(&path) {
            debug!(%event, "path excluded");
            return CoreStep::default();
        }

        if self.markers.is_transient(&path) {
            self.sink
                .trace(&format!("[SKIP] transient file {}", path.display()));
            return CoreStep::default();
        }

        if !self.fingerprints.changed(&*self.fs, &path) {
            self.sink
                .trace(&format!("[SKIP] unchanged {}", path.display()));
            return CoreStep::default();
        }

        if !self.gate.admit(event.observed_at) {
            debug!(%event, "suppressed by debounce window");
            return CoreStep::default();
        }

        self.sink.trace(&format!("{} file {}", event.op, path.display()));
        CoreStep {
            commands: vec![CoreCommand::Rebuild { cause: event }],
        }
    }

    fn covers(&self, path: &Path) -> bool {
        self.watched.contains(path) || path.parent().is_some_and(|p| self.watched.contains(p))
    }

    fn directory_arrived(&mut self, dir: &Path) -> CoreStep {
        if !self.recursive || self.watched.contains(dir) {
            return CoreStep::default();
        }

        let added: Vec<PathBuf> = expand_dir(&*self.fs, &self.rules, dir, &*self.sink)
            .into_iter()
            .filter(|d| self.watched.insert(d.clone()))
            .collect();

        if added.is_empty() {
            return CoreStep::default();
        }
        CoreStep {
            commands: vec![CoreCommand::Watch(added)],
        }
    }

    fn directory_departed(&mut self, dir: &Path) -> CoreStep {
        let removed: Vec<PathBuf> = self
            .watched
            .iter()
            .filter(|d| d.starts_with(dir))
            .cloned()
            .collect();
        for d in &removed {
            self.watched.remove(d);
        }
        self.fingerprints.forget_under(dir);

        CoreStep {
            commands: vec![CoreCommand::Unwatch(removed)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::status::{StatusLevel, StatusSink};
    use crate::types::{ChangeDetection, Stream};
    use crate::watch::Op;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct Quiet(Mutex<Vec<(StatusLevel, String)>>);

    impl StatusSink for Quiet {
        fn status(&self, level: StatusLevel, message: &str) {
            self.0.lock().unwrap().push((level, message.to_string()));
        }
        fn relay(&self, _origin: &str, _stream: Stream, _line: &str) {}
    }

    fn settings() -> WatchSettings {
        WatchSettings {
            roots: vec![PathBuf::from("/app")],
            recursive: true,
            extensions: vec![".go".to_string()],
            include_hidden: false,
            exclude: vec![],
            transient_markers: vec![],
            debounce: Duration::from_millis(100),
            change_detection: ChangeDetection::None,
        }
    }

    fn project() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_file("/app/main.go", "package main");
        fs.add_file("/app/internal/db/db.go", "package db");
        fs.add_file("/app/README.md", "# app");
        fs
    }

    fn core_with(settings: WatchSettings, fs: &MockFileSystem) -> WatchCore {
        let mut core = WatchCore::new(&settings, Arc::new(fs.clone()), Arc::new(Quiet::default()))
            .unwrap();
        core.init();
        core
    }

    fn is_rebuild(step: &CoreStep) -> bool {
        matches!(step.commands.as_slice(), [CoreCommand::Rebuild { .. }])
    }

    #[test]
    fn init_expands_roots() {
        let fs = project();
        let core = core_with(settings(), &fs);
        let dirs: Vec<_> = core.watched().iter().cloned().collect();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/app"),
                PathBuf::from("/app/internal"),
                PathBuf::from("/app/internal/db"),
            ]
        );
    }

    #[test]
    fn relevant_write_triggers_a_rebuild() {
        let fs = project();
        let mut core = core_with(settings(), &fs);
        let step = core.step(ChangeEvent::new("/app/internal/db/db.go", Op::Write));
        assert!(is_rebuild(&step));
    }

    #[test]
    fn other_extensions_are_ignored() {
        let fs = project();
        let mut core = core_with(settings(), &fs);
        assert!(core
            .step(ChangeEvent::new("/app/README.md", Op::Write))
            .commands
            .is_empty());
    }

    #[test]
    fn events_inside_the_window_are_suppressed() {
        let fs = project();
        let mut core = core_with(settings(), &fs);
        let t0 = Instant::now();

        assert!(is_rebuild(&core.step(ChangeEvent::at("/app/main.go", Op::Write, t0))));
        assert!(core
            .step(ChangeEvent::at("/app/main.go", Op::Write, t0 + Duration::from_millis(50)))
            .commands
            .is_empty());
        assert!(is_rebuild(&core.step(ChangeEvent::at(
            "/app/main.go",
            Op::Write,
            t0 + Duration::from_millis(150)
        ))));
    }

    #[test]
    fn ignored_events_do_not_open_a_window() {
        let fs = project();
        let mut core = core_with(settings(), &fs);
        let t0 = Instant::now();

        core.step(ChangeEvent::at("/app/README.md", Op::Write, t0));
        assert!(is_rebuild(&core.step(ChangeEvent::at(
            "/app/main.go",
            Op::Write,
            t0 + Duration::from_millis(1)
        ))));
    }

    #[test]
    fn transient_editor_files_are_ignored() {
        let fs = project();
        let mut core = core_with(settings(), &fs);
        assert!(core
            .step(ChangeEvent::new("/app/main.go___jb_tmp___", Op::Create))
            .commands
            .is_empty());
        assert!(core
            .step(ChangeEvent::new("/app/.#main.go", Op::Create))
            .commands
            .is_empty());
    }

    #[test]
    fn new_directory_is_watched_without_a_build() {
        let fs = project();
        let mut core = core_with(settings(), &fs);
        fs.add_dir("/app/pkg/util");

        let step = core.step(ChangeEvent::new("/app/pkg", Op::Create));

        match step.commands.as_slice() {
            [CoreCommand::Watch(dirs)] => {
                assert_eq!(dirs, &vec![PathBuf::from("/app/pkg"), PathBuf::from("/app/pkg/util")]);
            }
            other => panic!("unexpected commands: {other:?}"),
        }
        assert!(core.is_watched_dir(Path::new("/app/pkg/util")));
    }

    #[test]
    fn directory_named_like_a_source_file_does_not_build() {
        let fs = project();
        let mut core = core_with(settings(), &fs);
        fs.add_dir("/app/weird.go");

        let step = core.step(ChangeEvent::new("/app/weird.go", Op::Create));
        assert!(matches!(step.commands.as_slice(), [CoreCommand::Watch(_)]));
    }

    #[test]
    fn hidden_new_directories_are_not_watched() {
        let fs = project();
        let mut core = core_with(settings(), &fs);
        fs.add_dir("/app/.idea");

        assert!(core
            .step(ChangeEvent::new("/app/.idea", Op::Create))
            .commands
            .is_empty());
        assert!(!core.is_watched_dir(Path::new("/app/.idea")));
    }

    #[test]
    fn non_recursive_mode_ignores_new_directories() {
        let fs = project();
        let mut s = settings();
        s.recursive = false;
        let mut core = core_with(s, &fs);
        fs.add_dir("/app/pkg");

        assert!(core.step(ChangeEvent::new("/app/pkg", Op::Create)).commands.is_empty());
        assert_eq!(core.watched().len(), 1);
    }

    #[test]
    fn removed_directory_is_unwatched_with_descendants() {
        let fs = project();
        let mut core = core_with(settings(), &fs);
        fs.remove("/app/internal");

        let step = core.step(ChangeEvent::new("/app/internal", Op::Remove));

        match step.commands.as_slice() {
            [CoreCommand::Unwatch(dirs)] => {
                assert_eq!(
                    dirs,
                    &vec![PathBuf::from("/app/internal"), PathBuf::from("/app/internal/db")]
                );
            }
            other => panic!("unexpected commands: {other:?}"),
        }
        assert_eq!(core.watched().len(), 1);
    }

    #[test]
    fn late_events_under_a_dropped_directory_are_ignored() {
        let fs = project();
        let mut core = core_with(settings(), &fs);
        fs.remove("/app/internal");
        core.step(ChangeEvent::new("/app/internal", Op::Remove));

        assert!(core
            .step(ChangeEvent::new("/app/internal/db/db.go", Op::Write))
            .commands
            .is_empty());
    }

    #[test]
    fn renamed_directory_moves_its_subscriptions() {
        let fs = project();
        let mut core = core_with(settings(), &fs);
        fs.remove("/app/internal");
        fs.add_file("/app/private/db/db.go", "package db");

        let away = core.step(ChangeEvent::new("/app/internal", Op::Rename));
        let onto = core.step(ChangeEvent::new("/app/private", Op::Move));

        assert!(matches!(away.commands.as_slice(), [CoreCommand::Unwatch(_)]));
        assert!(matches!(onto.commands.as_slice(), [CoreCommand::Watch(d)] if d.len() == 2));
        assert!(core.is_watched_dir(Path::new("/app/private/db")));
    }

    #[test]
    fn deleted_source_file_triggers_a_rebuild() {
        let fs = project();
        let mut core = core_with(settings(), &fs);
        fs.remove("/app/main.go");
        assert!(is_rebuild(&core.step(ChangeEvent::new("/app/main.go", Op::Remove))));
    }

    #[test]
    fn excluded_paths_never_trigger() {
        let fs = project();
        fs.add_file("/app/gen/models.go", "package gen");
        let mut s = settings();
        s.exclude = vec!["gen".to_string()];
        let mut core = core_with(s, &fs);

        // Not watched at all, and even a stray event is filtered.
        assert!(!core.is_watched_dir(Path::new("/app/gen")));
        assert!(core
            .step(ChangeEvent::new("/app/gen/models.go", Op::Write))
            .commands
            .is_empty());
    }

    #[test]
    fn exclude_globs_apply_to_files_too() {
        let fs = project();
        fs.add_file("/app/main_test.go", "package main");
        let mut s = settings();
        s.exclude = vec!["*_test.go".to_string()];
        let mut core = core_with(s, &fs);

        assert!(core
            .step(ChangeEvent::new("/app/main_test.go", Op::Write))
            .commands
            .is_empty());
    }

    #[test]
    fn hash_detection_skips_identical_rewrites() {
        let fs = project();
        let mut s = settings();
        s.change_detection = ChangeDetection::Hash;
        s.debounce = Duration::ZERO;
        let mut core = core_with(s, &fs);

        assert!(is_rebuild(&core.step(ChangeEvent::new("/app/main.go", Op::Write))));
        fs.touch("/app/main.go");
        assert!(core
            .step(ChangeEvent::new("/app/main.go", Op::Write))
            .commands
            .is_empty());
        fs.add_file("/app/main.go", "package main\n\nfunc main() {}\n");
        assert!(is_rebuild(&core.step(ChangeEvent::new("/app/main.go", Op::Write))));
    }

    #[test]
    fn failed_registration_is_forgotten() {
        let fs = project();
        let mut core = core_with(settings(), &fs);
        core.registration_failed(Path::new("/app/internal/db"));
        assert!(!core.is_watched_dir(Path::new("/app/internal/db")));
    }

    #[test]
    fn invalid_patterns_are_config_errors() {
        let fs = project();
        let mut s = settings();
        s.transient_markers = vec!["(".to_string()];
        let err = WatchCore::new(&s, Arc::new(fs), Arc::new(Quiet::default())).unwrap_err();
        assert!(matches!(err, LivereloadError::ConfigError(_)));
    }
}
