// src/exec/supervisor.rs

//! Keeps at most one instance of the built program running.

use std::env::consts::EXE_SUFFIX;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::errors::RestartError;
use crate::exec::backend::{ProcessHandle, ProcessLauncher};
use crate::status::SharedSink;

/// Turn a configured artifact name into something launchable.
///
/// Adds the platform executable suffix when missing and makes bare names
/// explicitly relative (`myapp` becomes `./myapp`) so the program is never
/// looked up on `PATH`.
pub fn normalize_artifact(path: &Path) -> PathBuf {
    let mut path = path.to_path_buf();

    if !EXE_SUFFIX.is_empty() && !path.as_os_str().to_string_lossy().ends_with(EXE_SUFFIX) {
        let mut name = OsString::from(path.as_os_str());
        name.push(EXE_SUFFIX);
        path = PathBuf::from(name);
    }

    match path.components().next() {
        Some(Component::Normal(_)) => Path::new(".").join(path),
        _ => path,
    }
}

/// Owner of the currently running program instance.
///
/// `restart` always stops the previous instance before starting the next
/// one, so two instances never overlap.
pub struct Supervisor {
    launcher: Box<dyn ProcessLauncher>,
    artifact: PathBuf,
    args: Vec<String>,
    current: Option<Box<dyn ProcessHandle>>,
    sink: SharedSink,
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("artifact", &self.artifact)
            .field("args", &self.args)
            .field("current", &self.current)
            .finish()
    }
}

impl Supervisor {
    pub fn new(
        launcher: Box<dyn ProcessLauncher>,
        artifact: impl AsRef<Path>,
        args: Vec<String>,
        sink: SharedSink,
    ) -> Self {
        Self {
            launcher,
            artifact: normalize_artifact(artifact.as_ref()),
            args,
            current: None,
            sink,
        }
    }

    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_pid(&self) -> Option<u32> {
        self.current.as_ref().and_then(|h| h.id())
    }

    /// Stop the current instance (if any) and start a fresh one.
    ///
    /// A failed kill is reported as a warning and the launch goes ahead. A
    /// failed launch leaves no instance running and is returned.
    pub async fn restart(&mut self) -> Result<(), RestartError> {
        if let Some(mut previous) = self.current.take() {
            let pid = previous.id();
            match previous.kill().await {
                Ok(()) => debug!(?pid, "stopped previous instance"),
                Err(source) => {
                    let err = RestartError::Kill { pid, source };
                    self.sink.warning(&err.to_string());
                }
            }
        }

        let handle = self
            .launcher
            .launch(&self.artifact, &self.args)
            .map_err(|source| RestartError::Launch {
                program: self.artifact.clone(),
                source,
            })?;

        let pid = handle
            .id()
            .map(|pid| pid.to_string())
            .unwrap_or_else(|| "?".to_string());
        self.sink.success(&format!(
            "restarted < {} > (pid {pid})",
            self.artifact.display()
        ));
        self.current = Some(handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn bare_names_become_explicitly_relative() {
        assert_eq!(normalize_artifact(Path::new("myapp")), PathBuf::from("./myapp"));
        assert_eq!(normalize_artifact(Path::new("bin/app")), PathBuf::from("./bin/app"));
        assert_eq!(normalize_artifact(Path::new("./myapp")), PathBuf::from("./myapp"));
        assert_eq!(normalize_artifact(Path::new("../out/app")), PathBuf::from("../out/app"));
        assert_eq!(normalize_artifact(Path::new("/opt/app")), PathBuf::from("/opt/app"));
    }

    #[cfg(windows)]
    #[test]
    fn windows_artifacts_get_the_exe_suffix() {
        assert_eq!(normalize_artifact(Path::new("myapp")), PathBuf::from(".\\myapp.exe"));
        assert_eq!(normalize_artifact(Path::new("myapp.exe")), PathBuf::from(".\\myapp.exe"));
    }
}
