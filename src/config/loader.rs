// src/config/loader.rs

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::RawConfigFile;
use crate::errors::{LivereloadError, Result};

/// File looked up in the project directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "Livereload.toml";

/// Read and deserialize a configuration file. The file must exist.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        LivereloadError::ConfigError(format!("cannot read config file {path:?}: {e}"))
    })?;

    let config: RawConfigFile = toml::from_str(&contents)?;
    debug!(?path, "loaded config file");

    Ok(config)
}

/// Like [`load_from_path`], but a missing file is `Ok(None)`.
pub fn load_optional(path: impl AsRef<Path>) -> Result<Option<RawConfigFile>> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(contents) => {
            debug!(?path, "loaded config file");
            Ok(Some(toml::from_str(&contents)?))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(?path, "no config file; using defaults");
            Ok(None)
        }
        Err(err) => Err(LivereloadError::ConfigError(format!(
            "cannot read config file {path:?}: {err}"
        ))),
    }
}

pub fn default_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(DEFAULT_CONFIG_FILE)
}
