//! Record structures for manifests, scores, and loaded review entries.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One line of a `paths.jsonl` manifest file.
///
/// The path is absolute and forward-slash-normalized so the same manifest
/// works for the external scorer on any platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Absolute path to the media file.
    pub path: String,
}

impl ManifestEntry {
    /// Create an entry from an already-normalized path string.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// One line of a `scores.jsonl` file.
///
/// All four metrics are optional; the external tool omits fields it could
/// not compute. Field names match the tool's output exactly.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Content enjoyment.
    #[serde(rename = "CE", skip_serializing_if = "Option::is_none")]
    pub ce: Option<f64>,
    /// Content usefulness.
    #[serde(rename = "CU", skip_serializing_if = "Option::is_none")]
    pub cu: Option<f64>,
    /// Production complexity.
    #[serde(rename = "PC", skip_serializing_if = "Option::is_none")]
    pub pc: Option<f64>,
    /// Production quality.
    #[serde(rename = "PQ", skip_serializing_if = "Option::is_none")]
    pub pq: Option<f64>,
}

/// In-memory joined representation of one media file and its scores.
///
/// Built by the store reader from a manifest/scores line pair. The path is
/// the unique identifier; records whose path no longer exists on disk are
/// dropped at load time and never reach this type.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioRecord {
    /// File name component, for display and substring filtering.
    pub filename: String,
    /// Absolute path; unique identifier within a loaded set.
    pub path: PathBuf,
    /// Content enjoyment score, if the tool produced one.
    pub ce: Option<f64>,
    /// Content usefulness score.
    pub cu: Option<f64>,
    /// Production complexity score.
    pub pc: Option<f64>,
    /// Production quality score.
    pub pq: Option<f64>,
}

impl AudioRecord {
    /// Build a record from a resolved path and its score entry.
    pub fn new(path: impl Into<PathBuf>, scores: ScoreEntry) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            filename,
            path,
            ce: scores.ce,
            cu: scores.cu,
            pc: scores.pc,
            pq: scores.pq,
        }
    }

    /// Get a score by field.
    pub fn score(&self, field: super::ScoreField) -> Option<f64> {
        use super::ScoreField::*;
        match field {
            Ce => self.ce,
            Cu => self.cu,
            Pc => self.pc,
            Pq => self.pq,
        }
    }

    /// The record's path as a `&Path`.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_entry_round_trips() {
        let entry = ManifestEntry::new("/data/set_a/clip_0001.wav");
        let line = serde_json::to_string(&entry).unwrap();
        assert_eq!(line, r#"{"path":"/data/set_a/clip_0001.wav"}"#);

        let back: ManifestEntry = serde_json::from_str(&line).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn score_entry_reads_partial_lines() {
        let entry: ScoreEntry = serde_json::from_str(r#"{"CE": 3.5, "PQ": 4.0}"#).unwrap();
        assert_eq!(entry.ce, Some(3.5));
        assert_eq!(entry.cu, None);
        assert_eq!(entry.pc, None);
        assert_eq!(entry.pq, Some(4.0));
    }

    #[test]
    fn score_entry_omits_absent_fields() {
        let entry = ScoreEntry {
            pq: Some(2.25),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&entry).unwrap(), r#"{"PQ":2.25}"#);
    }

    #[test]
    fn record_derives_filename_from_path() {
        let record = AudioRecord::new("/data/set_a/clip_0001.wav", ScoreEntry::default());
        assert_eq!(record.filename, "clip_0001.wav");
        assert_eq!(record.ce, None);
    }
}
