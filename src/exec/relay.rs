// src/exec/relay.rs

//! Forward child-process output to the status sink, line by line.
//!
//! Bytes are read raw and decoded lossily, so output that is not valid UTF-8
//! is still relayed and the pipe is drained until EOF.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::status::SharedSink;
use crate::types::Stream;

/// Reader tasks attached to a child's piped stdout/stderr.
#[derive(Debug, Default)]
pub struct Relays {
    handles: Vec<JoinHandle<()>>,
}

impl Relays {
    /// Wait until both streams hit EOF.
    pub async fn finish(self) {
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

/// Take the piped stdout/stderr of `child` and relay them through `sink`.
///
/// The returned [`Relays`] may be awaited (build commands) or simply dropped
/// (the supervised program); dropping does not stop the reader tasks.
pub fn attach(child: &mut Child, origin: &str, sink: &SharedSink) -> Relays {
    let mut handles = Vec::with_capacity(2);

    if let Some(stdout) = child.stdout.take() {
        handles.push(spawn_relay(stdout, origin.to_string(), Stream::Stdout, sink.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        handles.push(spawn_relay(stderr, origin.to_string(), Stream::Stderr, sink.clone()));
    }

    Relays { handles }
}

fn spawn_relay<R>(reader: R, origin: String, stream: Stream, sink: SharedSink) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => sink.relay(&origin, stream, &decode_line(&buf)),
                Err(err) => {
                    debug!(%origin, ?stream, error = %err, "output relay stopped");
                    break;
                }
            }
        }
    })
}

/// One raw line without its terminator, invalid UTF-8 replaced.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
