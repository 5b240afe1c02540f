// src/config/mod.rs

//! Configuration loading and validation for livereload.
//!
//! - [`model`]: the TOML data model, command-line overrides and the
//!   validated [`Settings`].
//! - [`loader`]: reads `Livereload.toml` (or an explicit `--config` file).
//! - [`validate`]: merges file + overrides into [`Settings`], filling
//!   defaults and rejecting bad values.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_from_path, load_optional, DEFAULT_CONFIG_FILE};
pub use model::{
    BuildSettings, Overrides, RawBuildSection, RawConfigFile, RawRunSection, RawWatchSection,
    RunSettings, Settings, WatchSettings,
};
pub use validate::{ConfigSources, DEFAULT_BUILD_COMMAND};
