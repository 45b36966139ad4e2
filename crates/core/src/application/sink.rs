// Sink - sole consumer of the output queue

use crate::application::dedicated::DedicatedThread;
use crate::domain::ClosableQueue;
use crate::error::Result;
use crate::port::ResultSink;
use std::io;
use std::sync::Arc;
use tracing::{debug, error};

/// What the sink task hands back once the output queue is drained
#[derive(Debug)]
pub struct SinkOutcome<S> {
    pub sink: S,
    pub emitted: usize,
    /// First write error; later results were drained but discarded
    pub error: Option<io::Error>,
}

/// Name of the sink thread
pub const SINK_THREAD_NAME: &str = "sink";

/// Start the sink on its own thread
///
/// Must be started before the workers so no result is pushed without a
/// consumer. Finishes once the output queue is closed and empty.
pub fn spawn_sink<S: ResultSink>(
    queue: Arc<ClosableQueue<String>>,
    sink: S,
) -> Result<DedicatedThread<SinkOutcome<S>>> {
    DedicatedThread::spawn(SINK_THREAD_NAME, move || drain(&queue, sink))
}

/// Pop and emit until the queue reports closed-and-empty
pub fn drain<S: ResultSink>(queue: &ClosableQueue<String>, mut sink: S) -> SinkOutcome<S> {
    let mut emitted = 0;
    let mut failure: Option<io::Error> = None;

    while let Some(result) = queue.pop() {
        // Keep draining after a write error so the queue never backs up
        if failure.is_some() {
            continue;
        }
        match sink.emit(&result) {
            Ok(()) => emitted += 1,
            Err(e) => {
                error!(error = %e, "Result sink write failed, discarding further results");
                failure = Some(e);
            }
        }
    }

    if failure.is_none() {
        if let Err(e) = sink.flush() {
            error!(error = %e, "Result sink flush failed");
            failure = Some(e);
        }
    }

    debug!(emitted, "Sink drained");
    SinkOutcome {
        sink,
        emitted,
        error: failure,
    }
}
