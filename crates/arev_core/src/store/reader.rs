//! Score store reader.
//!
//! Reads are purely advisory-logged; the reader never writes. Entries pair
//! by line position: manifest line N and scores line N describe the same
//! media file, so a subdirectory whose valid-line counts differ is rejected
//! wholesale rather than merged partially.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::config::FileSettings;
use crate::models::{AudioRecord, ScoreEntry};

/// Errors from a store load.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The selected base path is not a directory.
    #[error("Selected path is not a valid directory: {}", path.display())]
    NotADirectory { path: PathBuf },
}

/// Diagnostic counters from one load pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Immediate subdirectories inspected.
    pub subdirs_scanned: usize,
    /// Subdirectories holding both a manifest and a scores file.
    pub pairs_found: usize,
    /// Entries dropped: malformed lines, missing path keys, dead paths.
    pub invalid_entries: usize,
}

/// Why a load produced no records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDataReason {
    /// No subdirectory held a manifest/scores pair at all.
    NoManifests,
    /// Pairs were found but no entry survived validation.
    NoValidEntries,
}

/// Result of one load pass: ordered records plus diagnostics.
#[derive(Debug, Clone, Default)]
pub struct LoadResult {
    /// Loaded records, in subdirectory order then manifest line order.
    pub records: Vec<AudioRecord>,
    /// Diagnostic counters.
    pub report: LoadReport,
}

impl LoadResult {
    /// Distinguish the two empty-result conditions, if this load is empty.
    pub fn no_data_reason(&self) -> Option<NoDataReason> {
        if !self.records.is_empty() {
            None
        } else if self.report.pairs_found == 0 {
            Some(NoDataReason::NoManifests)
        } else {
            Some(NoDataReason::NoValidEntries)
        }
    }

    /// Human-readable load summary for the status line.
    pub fn summary(&self, files: &FileSettings) -> String {
        match self.no_data_reason() {
            Some(NoDataReason::NoManifests) => format!(
                "No subdirectories with '{}' and '{}' found.",
                files.manifest_filename, files.scores_filename
            ),
            Some(NoDataReason::NoValidEntries) => {
                "Found score files, but no valid audio entries (check paths and file existence)."
                    .to_string()
            }
            None => format!(
                "Loaded {} audio entries from {} subdirectories ({} invalid entries skipped).",
                self.records.len(),
                self.report.subdirs_scanned,
                self.report.invalid_entries
            ),
        }
    }
}

/// Load every valid manifest/scores pair under `base_dir`.
///
/// Per-entry and per-line failures are counted and skipped; a count
/// mismatch rejects the whole subdirectory; only a non-directory base path
/// is an error. Records whose path no longer exists as a regular file are
/// dropped at this point and never reach the caller.
pub fn load_records(base_dir: &Path, files: &FileSettings) -> Result<LoadResult, StoreError> {
    if !base_dir.is_dir() {
        return Err(StoreError::NotADirectory {
            path: base_dir.to_path_buf(),
        });
    }

    tracing::info!("Scanning store directory: {}", base_dir.display());

    let mut subdirs: Vec<PathBuf> = match std::fs::read_dir(base_dir) {
        Ok(iter) => iter
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect(),
        Err(e) => {
            // Base directory vanished between the check and the listing.
            tracing::warn!("Failed to list {}: {}", base_dir.display(), e);
            return Err(StoreError::NotADirectory {
                path: base_dir.to_path_buf(),
            });
        }
    };
    subdirs.sort();

    let mut result = LoadResult::default();

    for subdir in subdirs {
        result.report.subdirs_scanned += 1;

        let manifest_path = subdir.join(&files.manifest_filename);
        let scores_path = subdir.join(&files.scores_filename);
        if !manifest_path.exists() || !scores_path.exists() {
            continue;
        }
        result.report.pairs_found += 1;

        let manifest_lines = match read_json_lines(&manifest_path, &mut result.report) {
            Some(lines) => lines,
            None => continue,
        };
        let score_lines = match read_score_lines(&scores_path, &mut result.report) {
            Some(lines) => lines,
            None => continue,
        };

        if manifest_lines.len() != score_lines.len() {
            tracing::warn!(
                "Valid line count mismatch between {} ({}) and {} ({}); skipping subdirectory",
                manifest_path.display(),
                manifest_lines.len(),
                scores_path.display(),
                score_lines.len()
            );
            continue;
        }

        for (value, scores) in manifest_lines.into_iter().zip(score_lines) {
            let path_str = match value.get("path").and_then(Value::as_str) {
                Some(s) => s,
                None => {
                    tracing::warn!(
                        "Missing 'path' key in {}; skipping entry",
                        manifest_path.display()
                    );
                    result.report.invalid_entries += 1;
                    continue;
                }
            };

            let path = Path::new(path_str);
            if !path.is_file() {
                tracing::warn!(
                    "Path '{}' from {} not found on disk; skipping",
                    path_str,
                    manifest_path.display()
                );
                result.report.invalid_entries += 1;
                continue;
            }

            result.records.push(AudioRecord::new(path, scores));
        }
    }

    tracing::info!(
        "Scanned {} subdirectories, loaded {} entries ({} invalid)",
        result.report.subdirs_scanned,
        result.records.len(),
        result.report.invalid_entries
    );

    Ok(result)
}

/// Read a JSON-lines file as raw values, skipping malformed lines.
///
/// Returns None if the file itself could not be read (the subdirectory is
/// then skipped as a unit).
fn read_json_lines(path: &Path, report: &mut LoadReport) -> Option<Vec<Value>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("Error reading {}: {}", path.display(), e);
            report.invalid_entries += 1;
            return None;
        }
    };

    let mut values = Vec::new();
    for (line_num, line) in BufReader::new(file).lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!("Error reading {} line {}: {}", path.display(), line_num + 1, e);
                report.invalid_entries += 1;
                return None;
            }
        };
        match serde_json::from_str::<Value>(&line) {
            Ok(value) => values.push(value),
            Err(_) => {
                tracing::warn!(
                    "Skipping invalid JSON line {} in {}: {}",
                    line_num + 1,
                    path.display(),
                    line.trim()
                );
                report.invalid_entries += 1;
            }
        }
    }
    Some(values)
}

/// Read a scores JSON-lines file, skipping malformed lines.
fn read_score_lines(path: &Path, report: &mut LoadReport) -> Option<Vec<ScoreEntry>> {
    let values = read_json_lines(path, report)?;
    let mut entries = Vec::with_capacity(values.len());
    for value in values {
        match serde_json::from_value::<ScoreEntry>(value) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Skipping invalid score entry in {}: {}", path.display(), e);
                report.invalid_entries += 1;
            }
        }
    }
    Some(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn files() -> FileSettings {
        FileSettings::default()
    }

    /// Build a subdirectory with N real wav files, a matching manifest, and
    /// the given scores lines.
    fn make_pair(base: &TempDir, name: &str, wavs: usize, score_lines: &[&str]) -> PathBuf {
        let subdir = base.path().join(name);
        fs::create_dir(&subdir).unwrap();

        let mut manifest = String::new();
        for i in 0..wavs {
            let wav = subdir.join(format!("clip_{:02}.wav", i));
            fs::write(&wav, b"RIFF").unwrap();
            manifest.push_str(&format!("{{\"path\":\"{}\"}}\n", wav.display()));
        }
        fs::write(subdir.join("paths.jsonl"), manifest).unwrap();

        let scores: String = score_lines.iter().map(|l| format!("{}\n", l)).collect();
        fs::write(subdir.join("scores.jsonl"), scores).unwrap();
        subdir
    }

    #[test]
    fn loads_paired_entries_in_order() {
        let base = tempdir().unwrap();
        make_pair(&base, "set_a", 2, &["{\"CE\":1.0,\"PQ\":4.0}", "{\"PQ\":2.5}"]);

        let result = load_records(base.path(), &files()).unwrap();
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].filename, "clip_00.wav");
        assert_eq!(result.records[0].ce, Some(1.0));
        assert_eq!(result.records[0].pq, Some(4.0));
        assert_eq!(result.records[1].ce, None);
        assert_eq!(result.records[1].pq, Some(2.5));
        assert!(result.no_data_reason().is_none());
    }

    #[test]
    fn count_mismatch_rejects_whole_subdirectory() {
        let base = tempdir().unwrap();
        // 2 manifest entries vs 1 score line.
        make_pair(&base, "bad", 2, &["{\"PQ\":1.0}"]);
        make_pair(&base, "good", 1, &["{\"PQ\":3.0}"]);

        let result = load_records(base.path(), &files()).unwrap();
        assert_eq!(result.records.len(), 1);
        assert!(result.records[0].path.to_string_lossy().contains("good"));
    }

    #[test]
    fn malformed_lines_skipped_but_counted() {
        let base = tempdir().unwrap();
        let subdir = make_pair(&base, "set_a", 2, &["{\"PQ\":1.0}", "{\"PQ\":2.0}"]);

        // Corrupt the manifest with one garbage line; valid counts become
        // 2 vs 2 once it is discarded.
        let manifest = fs::read_to_string(subdir.join("paths.jsonl")).unwrap();
        fs::write(
            subdir.join("paths.jsonl"),
            format!("not json at all\n{}", manifest),
        )
        .unwrap();

        let result = load_records(base.path(), &files()).unwrap();
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.report.invalid_entries, 1);
    }

    #[test]
    fn dead_paths_are_dropped() {
        let base = tempdir().unwrap();
        let subdir = make_pair(&base, "set_a", 2, &["{\"PQ\":1.0}", "{\"PQ\":2.0}"]);

        // Remove one referenced wav after the manifest was written.
        fs::remove_file(subdir.join("clip_00.wav")).unwrap();

        let result = load_records(base.path(), &files()).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].filename, "clip_01.wav");
        assert_eq!(result.report.invalid_entries, 1);
    }

    #[test]
    fn missing_path_key_is_invalid_entry() {
        let base = tempdir().unwrap();
        let subdir = base.path().join("set_a");
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("paths.jsonl"), "{\"file\":\"oops\"}\n").unwrap();
        fs::write(subdir.join("scores.jsonl"), "{\"PQ\":1.0}\n").unwrap();

        let result = load_records(base.path(), &files()).unwrap();
        assert!(result.records.is_empty());
        assert_eq!(result.report.invalid_entries, 1);
        assert_eq!(result.no_data_reason(), Some(NoDataReason::NoValidEntries));
    }

    #[test]
    fn distinguishes_no_manifests_from_no_valid_entries() {
        let base = tempdir().unwrap();
        fs::create_dir(base.path().join("empty_subdir")).unwrap();

        let result = load_records(base.path(), &files()).unwrap();
        assert_eq!(result.report.subdirs_scanned, 1);
        assert_eq!(result.no_data_reason(), Some(NoDataReason::NoManifests));
        assert!(result.summary(&files()).contains("No subdirectories"));
    }

    #[test]
    fn non_directory_base_is_an_error() {
        let base = tempdir().unwrap();
        let file = base.path().join("not_a_dir");
        fs::write(&file, b"x").unwrap();

        assert!(matches!(
            load_records(&file, &files()),
            Err(StoreError::NotADirectory { .. })
        ));
    }
}
