//! Batch worker - runs one preprocessing job on a background thread.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread::JoinHandle;

use chrono::Local;
use parking_lot::Mutex;
use thiserror::Error;

use crate::logging::{BatchLogger, LogConfig};
use crate::orchestrator::{
    run_batch, BatchEvent, BatchOptions, CancelToken, EventSink, EVENT_CHANNEL_CAPACITY,
};

/// Errors from starting a worker run.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// A preprocessing job is already running; wait for it to finish.
    #[error("A preprocessing job is already running")]
    Busy,

    /// Options failed validation; nothing was started.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// The batch log file or worker thread could not be created.
    #[error("Failed to set up batch run: {0}")]
    Setup(#[from] io::Error),
}

/// Owns the single background batch thread.
///
/// Dropping the worker does not stop a running job; call `cancel()` first
/// if the job should halt, then `join()` to wait for it.
pub struct BatchWorker {
    /// True while a run is active. Guards against concurrent runs.
    running: Arc<AtomicBool>,
    /// Cancel token of the current (or last) run.
    cancel: Mutex<CancelToken>,
    /// Join handle of the current (or last) run.
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Default for BatchWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchWorker {
    /// Create an idle worker.
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            cancel: Mutex::new(CancelToken::new()),
            handle: Mutex::new(None),
        }
    }

    /// Whether a run is currently active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start a batch run in the background.
    ///
    /// Validates options and claims the single run slot before spawning;
    /// a second call while a run is active returns `WorkerError::Busy`.
    /// The returned receiver yields `BatchEvent`s in emission order and
    /// ends with `Finished` (or `Failed` if the run aborted at startup).
    pub fn spawn(
        &self,
        base_dir: PathBuf,
        options: BatchOptions,
        log_dir: PathBuf,
        log_config: LogConfig,
    ) -> Result<Receiver<BatchEvent>, WorkerError> {
        options
            .validate()
            .map_err(|e| WorkerError::InvalidOptions(e.to_string()))?;

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(WorkerError::Busy);
        }

        // Slot claimed; release it on any setup failure below.
        let guard = RunningGuard {
            running: Arc::clone(&self.running),
        };

        let (sink, receiver) = EventSink::channel(EVENT_CHANNEL_CAPACITY);

        let run_name = format!("preprocess_{}", Local::now().format("%Y%m%d_%H%M%S"));
        let log_sink = sink.clone();
        let logger = BatchLogger::new(
            &run_name,
            &log_dir,
            log_config,
            Some(Box::new(move |line| log_sink.log(line))),
        )?;

        let cancel = CancelToken::new();
        *self.cancel.lock() = cancel.clone();

        let handle = std::thread::Builder::new()
            .name(run_name)
            .spawn(move || {
                // Keeps the running flag set for the thread's lifetime.
                let _guard = guard;

                if let Err(err) = run_batch(&base_dir, &options, &logger, &sink, &cancel) {
                    tracing::error!("Batch run aborted: {}", err);
                    sink.emit(BatchEvent::Failed(err.to_string()));
                }
            })?;

        *self.handle.lock() = Some(handle);
        Ok(receiver)
    }

    /// Request cancellation of the current run.
    ///
    /// Cooperative: the run halts at its next boundary check and still
    /// emits its summary. An in-flight scorer invocation finishes first.
    pub fn cancel(&self) {
        self.cancel.lock().cancel();
    }

    /// Wait for the current run to finish, if one was started.
    pub fn join(&self) {
        if let Some(handle) = self.handle.lock().take() {
            let _ = handle.join();
        }
    }
}

/// Clears the running flag when dropped, including on thread panic.
struct RunningGuard {
    running: Arc<AtomicBool>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
