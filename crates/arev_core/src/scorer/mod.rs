//! External scorer invocation.
//!
//! Wraps the external quality-assessment command (`audio-aes` by default):
//! builds the command line, runs it with the subdirectory as working
//! directory, and persists its captured stdout as the scores file.

mod invoker;

pub use invoker::{run_scorer, ScorerError, ScorerOutcome, ScorerRequest};
