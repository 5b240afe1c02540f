use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use livereload::exec::{BoxFuture, ProcessHandle, ProcessLauncher};

/// One recorded launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub pid: u32,
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// What happened to fake processes, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessEvent {
    Launched(u32),
    Killed(u32),
    KillFailed(u32),
}

#[derive(Debug)]
struct LaunchState {
    next_pid: u32,
    launches: Vec<Launch>,
    journal: Vec<ProcessEvent>,
    alive: BTreeSet<u32>,
    fail_launch: bool,
    fail_kill: bool,
}

impl Default for LaunchState {
    fn default() -> Self {
        Self {
            next_pid: 1000,
            launches: Vec::new(),
            journal: Vec::new(),
            alive: BTreeSet::new(),
            fail_launch: false,
            fail_kill: false,
        }
    }
}

/// Shared record of what a [`FakeLauncher`] did.
#[derive(Debug, Default)]
pub struct LaunchLog {
    state: Mutex<LaunchState>,
}

impl LaunchLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn launches(&self) -> Vec<Launch> {
        self.state.lock().unwrap().launches.clone()
    }

    pub fn journal(&self) -> Vec<ProcessEvent> {
        self.state.lock().unwrap().journal.clone()
    }

    /// Pids of fake processes that have been launched and not killed.
    pub fn alive(&self) -> Vec<u32> {
        self.state.lock().unwrap().alive.iter().copied().collect()
    }

    pub fn kills(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .journal
            .iter()
            .filter(|e| matches!(e, ProcessEvent::Killed(_) | ProcessEvent::KillFailed(_)))
            .count()
    }

    pub fn fail_launches(&self, fail: bool) {
        self.state.lock().unwrap().fail_launch = fail;
    }

    pub fn fail_kills(&self, fail: bool) {
        self.state.lock().unwrap().fail_kill = fail;
    }

    /// Simulate a process exiting on its own.
    pub fn exit(&self, pid: u32) {
        self.state.lock().unwrap().alive.remove(&pid);
    }
}

/// [`ProcessLauncher`] that hands out fake pids.
#[derive(Debug, Clone)]
pub struct FakeLauncher {
    log: Arc<LaunchLog>,
}

impl FakeLauncher {
    pub fn new(log: Arc<LaunchLog>) -> Self {
        Self { log }
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch(&self, program: &Path, args: &[String]) -> io::Result<Box<dyn ProcessHandle>> {
        let mut state = self.log.state.lock().unwrap();
        if state.fail_launch {
            return Err(io::Error::new(io::ErrorKind::NotFound, "fake launch failure"));
        }

        let pid = state.next_pid;
        state.next_pid += 1;
        state.launches.push(Launch {
            pid,
            program: program.to_path_buf(),
            args: args.to_vec(),
        });
        state.journal.push(ProcessEvent::Launched(pid));
        state.alive.insert(pid);

        Ok(Box::new(FakeProcess {
            pid,
            log: Arc::clone(&self.log),
        }))
    }
}

#[derive(Debug)]
struct FakeProcess {
    pid: u32,
    log: Arc<LaunchLog>,
}

impl ProcessHandle for FakeProcess {
    fn id(&self) -> Option<u32> {
        Some(self.pid)
    }

    fn kill(&mut self) -> BoxFuture<'_, io::Result<()>> {
        Box::pin(async move {
            let mut state = self.log.state.lock().unwrap();
            if state.fail_kill {
                state.journal.push(ProcessEvent::KillFailed(self.pid));
                return Err(io::Error::other("fake kill failure"));
            }
            state.journal.push(ProcessEvent::Killed(self.pid));
            state.alive.remove(&self.pid);
            Ok(())
        })
    }
}
