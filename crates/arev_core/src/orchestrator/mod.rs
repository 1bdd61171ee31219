//! Batch preprocessing orchestrator.
//!
//! Walks the immediate subdirectories of a base directory in sorted order,
//! strictly sequentially, and for each one applies the skip/overwrite
//! policy, writes the media manifest, and invokes the external scorer.
//!
//! ```text
//! run_batch
//!     └── per subdirectory:
//!         existing scores + overwrite off ──► SkippedExisting
//!         write manifest ── error ─────────► Error
//!         │                 zero media ────► SkippedNoMedia
//!         └── run scorer ── success ───────► Processed
//!                           failure ───────► Error
//! ```
//!
//! Progress flows through an `EventSink` that never blocks the loop;
//! cancellation is cooperative via `CancelToken` and is checked at each
//! loop boundary. The scorer invocation itself is not preemptible once
//! started. Whatever happens, the run produces exactly one `JobSummary`.

mod batch;
mod cancel;
mod errors;
mod events;
mod types;

pub use batch::run_batch;
pub use cancel::CancelToken;
pub use errors::{BatchError, BatchResult};
pub use events::{BatchEvent, EventSink, EVENT_CHANNEL_CAPACITY};
pub use types::BatchOptions;
