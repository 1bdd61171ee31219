//! Score store loading.
//!
//! A "store" is a base directory whose immediate subdirectories each hold a
//! manifest/scores JSON-lines pair. The reader materializes every valid
//! pair line into an `AudioRecord` for the review engine.

mod reader;

pub use reader::{load_records, LoadReport, LoadResult, NoDataReason, StoreError};
