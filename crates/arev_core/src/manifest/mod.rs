//! Media manifest writing.
//!
//! The index writer scans one subdirectory (non-recursive) for audio files
//! and emits `paths.jsonl`: one JSON object per file with its absolute,
//! forward-slash-normalized path. The external scorer and the store reader
//! both consume this manifest.

mod writer;

pub use writer::{write_wav_manifest, ManifestError, ManifestReport, ScanProgress};
