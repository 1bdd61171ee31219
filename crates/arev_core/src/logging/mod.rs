//! Logging infrastructure for Audio Review GUI.
//!
//! This module provides:
//! - Per-run batch loggers with file + observer callback dual output
//! - Compact mode with progress filtering
//! - Tail buffer for error diagnosis
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use arev_core::logging::{BatchLogger, LogConfig};
//!
//! let logger = BatchLogger::new(
//!     "preprocess_20260806",
//!     "/path/to/logs",
//!     LogConfig::default(),
//!     None,
//! ).unwrap();
//!
//! logger.info("Starting preprocessing job");
//! logger.command("audio-aes paths.jsonl --batch-size 10");
//! logger.progress(50);
//! logger.success("Job completed");
//! ```

mod batch_logger;
mod types;

pub use batch_logger::BatchLogger;
pub use types::{LogConfig, LogLevel, MessagePrefix, ObserverCallback};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr with timestamps
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

/// Convert LogLevel to filter string.
fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}
