//! Background execution of batch runs.
//!
//! The GUI event loop must never block on directory scans or the external
//! scorer, so batch runs execute on a dedicated worker thread and report
//! back only through the event channel. At most one run is active at a
//! time; starting a second is rejected, not queued.

mod runner;

pub use runner::{BatchWorker, WorkerError};
