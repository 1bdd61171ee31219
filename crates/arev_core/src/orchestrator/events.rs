//! Progress events and the worker-to-observer channel.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender};

use crate::models::{JobSummary, SubdirOutcome};

/// Default capacity of the event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Progress and result messages emitted during a batch run.
///
/// Events arrive in emission order. `Phase` and `Log` are lossy under
/// observer backpressure, so handlers must be idempotent with respect to
/// repeated or missing status text; the lifecycle events
/// (`Started`, `SubdirStarted`, `SubdirFinished`, `Finished`, `Failed`)
/// are always delivered while a receiver exists.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// The run started; `total_subdirs` subdirectories will be visited.
    Started { total_subdirs: usize },
    /// A subdirectory is being processed (1-based index).
    SubdirStarted {
        index: usize,
        total: usize,
        name: String,
    },
    /// High-frequency sub-phase status (media scan progress, scorer phase).
    Phase {
        index: usize,
        total: usize,
        name: String,
        message: String,
    },
    /// A subdirectory reached its terminal state.
    SubdirFinished {
        index: usize,
        total: usize,
        name: String,
        outcome: SubdirOutcome,
    },
    /// One batch log line (mirrors the durable log file).
    Log(String),
    /// Terminal event: the run's summary, emitted exactly once.
    Finished(JobSummary),
    /// Terminal event: the run aborted before the loop could start.
    Failed(String),
}

/// Fire-and-forget sender side of the event channel.
///
/// Sends never block the orchestrator loop: lossy events are dropped when
/// the observer lags, and a disconnected receiver is ignored entirely.
#[derive(Clone)]
pub struct EventSink {
    sender: Option<SyncSender<BatchEvent>>,
}

impl EventSink {
    /// Create a bounded channel and the sink feeding it.
    pub fn channel(capacity: usize) -> (Self, Receiver<BatchEvent>) {
        let (sender, receiver) = sync_channel(capacity);
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// A sink that discards everything (headless runs, tests).
    pub fn disconnected() -> Self {
        Self { sender: None }
    }

    /// Emit a lifecycle event (waits for channel space, gives up only if
    /// the receiver is gone).
    pub fn emit(&self, event: BatchEvent) {
        if let Some(ref sender) = self.sender {
            let _ = sender.send(event);
        }
    }

    /// Emit a lossy event: dropped immediately when the channel is full.
    pub fn emit_lossy(&self, event: BatchEvent) {
        if let Some(ref sender) = self.sender {
            let _ = sender.try_send(event);
        }
    }

    /// Convenience: mirror one log line as a lossy event.
    pub fn log(&self, line: &str) {
        self.emit_lossy(BatchEvent::Log(line.to_string()));
    }
}
