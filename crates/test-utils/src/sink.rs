use std::sync::{Arc, Mutex};

use livereload::status::{StatusLevel, StatusSink};
use livereload::types::Stream;

/// Status sink that remembers every line, for assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<(StatusLevel, String)>>,
    relayed: Mutex<Vec<(String, Stream, String)>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<(StatusLevel, String)> {
        self.lines.lock().unwrap().clone()
    }

    /// Messages reported at exactly `level`.
    pub fn at(&self, level: StatusLevel) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn contains(&self, level: StatusLevel, needle: &str) -> bool {
        self.at(level).iter().any(|m| m.contains(needle))
    }

    pub fn relayed(&self) -> Vec<(String, Stream, String)> {
        self.relayed.lock().unwrap().clone()
    }
}

impl StatusSink for RecordingSink {
    fn status(&self, level: StatusLevel, message: &str) {
        tracing::debug!(?level, "{message}");
        self.lines.lock().unwrap().push((level, message.to_string()));
    }

    fn relay(&self, origin: &str, stream: Stream, line: &str) {
        self.relayed
            .lock()
            .unwrap()
            .push((origin.to_string(), stream, line.to_string()));
    }
}
