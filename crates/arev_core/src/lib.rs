//! AREV Core - Backend logic for Audio Review GUI
//!
//! This crate contains all business logic with zero UI dependencies:
//! the batch preprocessing pipeline (manifest writing, external scorer
//! invocation, per-subdirectory orchestration), the score store reader,
//! and the in-memory filter/sort engine over loaded records. A GUI (or a
//! CLI tool) drives these operations and renders their results.

pub mod config;
pub mod export;
pub mod logging;
pub mod manifest;
pub mod models;
pub mod orchestrator;
pub mod review;
pub mod scorer;
pub mod store;
pub mod worker;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
