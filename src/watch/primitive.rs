// src/watch/primitive.rs

//! The watch-primitive seam.
//!
//! The orchestrator does not detect filesystem changes itself. It talks to a
//! [`WatchPrimitive`] that can add and remove individual directories while
//! its [`EventStream`] is being consumed. Production code uses
//! [`NotifyWatcher`](crate::watch::NotifyWatcher); tests drive the
//! orchestrator with a fake that records registrations and lets the test
//! push events by hand.

use std::path::Path;

use tokio::sync::mpsc;
use tracing::debug;

use crate::errors::{LivereloadError, Result, WatchError};
use crate::watch::event::ChangeEvent;

/// Per-directory subscription management.
///
/// Both methods take `&self`: registrations happen from the startup code and
/// from inside the event loop while the stream is live.
pub trait WatchPrimitive: Send + Sync {
    fn add_path(&self, path: &Path) -> std::result::Result<(), WatchError>;
    fn remove_path(&self, path: &Path) -> std::result::Result<(), WatchError>;
}

/// One item pulled from an [`EventStream`].
#[derive(Debug, Clone)]
pub enum WatchMessage {
    Event(ChangeEvent),
    Error(String),
}

/// Producer half of an [`EventStream`], held by the primitive.
#[derive(Debug, Clone)]
pub struct EventSender {
    events: mpsc::UnboundedSender<ChangeEvent>,
    errors: mpsc::UnboundedSender<String>,
}

impl EventSender {
    /// Returns false once the consumer is gone.
    pub fn send_event(&self, event: ChangeEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Returns false once the consumer is gone.
    pub fn send_error(&self, error: impl Into<String>) -> bool {
        self.errors.send(error.into()).is_ok()
    }
}

/// Change events plus a separate error channel.
#[derive(Debug)]
pub struct EventStream {
    events: mpsc::UnboundedReceiver<ChangeEvent>,
    errors: mpsc::UnboundedReceiver<String>,
    events_closed: bool,
    errors_closed: bool,
}

impl EventStream {
    pub fn channel() -> (EventSender, EventStream) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (errors_tx, errors_rx) = mpsc::unbounded_channel();
        (
            EventSender {
                events: events_tx,
                errors: errors_tx,
            },
            EventStream {
                events: events_rx,
                errors: errors_rx,
                events_closed: false,
                errors_closed: false,
            },
        )
    }

    /// Next event or error; `None` once every producer has gone away.
    pub async fn next(&mut self) -> Option<WatchMessage> {
        loop {
            if self.events_closed && self.errors_closed {
                return None;
            }

            tokio::select! {
                msg = self.errors.recv(), if !self.errors_closed => match msg {
                    Some(err) => return Some(WatchMessage::Error(err)),
                    None => self.errors_closed = true,
                },
                msg = self.events.recv(), if !self.events_closed => match msg {
                    Some(event) => return Some(WatchMessage::Event(event)),
                    None => self.events_closed = true,
                },
            }
        }
    }
}

/// Register every directory with the primitive.
///
/// Used at startup, where any failure is fatal: the first directory that
/// cannot be watched aborts with [`LivereloadError::Subscription`].
pub fn subscribe_all<'a, P, I>(primitive: &P, dirs: I) -> Result<usize>
where
    P: WatchPrimitive + ?Sized,
    I: IntoIterator<Item = &'a Path>,
{
    let mut count = 0;
    for dir in dirs {
        debug!(?dir, "subscribing");
        primitive
            .add_path(dir)
            .map_err(|source| LivereloadError::Subscription {
                path: dir.to_path_buf(),
                source,
            })?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watch::event::Op;

    #[tokio::test]
    async fn stream_yields_events_and_errors_then_ends() {
        let (tx, mut stream) = EventStream::channel();
        assert!(tx.send_event(ChangeEvent::new("/app/main.go", Op::Write)));
        assert!(tx.send_error("queue overflow"));
        drop(tx);

        let mut events = 0;
        let mut errors = 0;
        while let Some(msg) = stream.next().await {
            match msg {
                WatchMessage::Event(ev) => {
                    assert_eq!(ev.path(), Path::new("/app/main.go"));
                    events += 1;
                }
                WatchMessage::Error(err) => {
                    assert_eq!(err, "queue overflow");
                    errors += 1;
                }
            }
        }
        assert_eq!((events, errors), (1, 1));
    }

    #[test]
    fn sender_reports_a_dropped_stream() {
        let (tx, stream) = EventStream::channel();
        drop(stream);
        assert!(!tx.send_event(ChangeEvent::new("/app/main.go", Op::Write)));
    }
}
