//! Error types for the batch orchestrator.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a batch run before or at its start.
///
/// Per-subdirectory failures are not errors at this level; they become
/// `SubdirOutcome::Error` entries in the summary and the run continues.
#[derive(Error, Debug)]
pub enum BatchError {
    /// User-supplied options failed validation; nothing was touched.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// The base directory's subdirectories could not be enumerated.
    /// This is the only fatal filesystem condition.
    #[error("Could not list subdirectories in {}: {source}", path.display())]
    ListSubdirs {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for orchestrator operations.
pub type BatchResult<T> = Result<T, BatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_display_context() {
        let err = BatchError::ListSubdirs {
            path: PathBuf::from("/data/sets"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/sets"));
        assert!(msg.contains("denied"));
    }
}
