use std::path::PathBuf;
use std::time::Duration;

use livereload::config::WatchSettings;
use livereload::types::ChangeDetection;

/// Builder for `WatchSettings` to simplify test setup.
///
/// Starts from the same defaults the config layer uses: recursive, `.go`
/// only, hidden directories skipped, 1ms debounce, no change detection.
pub struct WatchSettingsBuilder {
    settings: WatchSettings,
}

impl WatchSettingsBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            settings: WatchSettings {
                roots: vec![root.into()],
                recursive: true,
                extensions: vec![".go".to_string()],
                include_hidden: false,
                exclude: Vec::new(),
                transient_markers: Vec::new(),
                debounce: Duration::from_millis(1),
                change_detection: ChangeDetection::None,
            },
        }
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.settings.roots.push(root.into());
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.settings.recursive = recursive;
        self
    }

    pub fn extensions(mut self, extensions: &[&str]) -> Self {
        self.settings.extensions = extensions.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.settings.exclude.push(pattern.to_string());
        self
    }

    pub fn include_hidden(mut self, include: bool) -> Self {
        self.settings.include_hidden = include;
        self
    }

    pub fn debounce(mut self, window: Duration) -> Self {
        self.settings.debounce = window;
        self
    }

    pub fn change_detection(mut self, mode: ChangeDetection) -> Self {
        self.settings.change_detection = mode;
        self
    }

    pub fn build(self) -> WatchSettings {
        self.settings
    }
}
