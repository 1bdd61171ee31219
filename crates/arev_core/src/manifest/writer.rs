//! WAV index writer.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::ManifestEntry;

/// Progress callback for long directory scans.
///
/// Arguments: (processed_count, total_count, phase_label). Invoked once up
/// front, every `PROGRESS_BATCH` entries while writing, and once at the end.
pub type ScanProgress<'a> = &'a (dyn Fn(usize, usize, &str) + Send + Sync);

/// Entries between intermediate progress reports.
const PROGRESS_BATCH: usize = 100;

/// Errors from manifest writing.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The target directory could not be listed at all.
    #[error("Failed to list directory {}: {source}", path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The manifest file could not be created or written.
    #[error("Failed to write manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of one manifest write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestReport {
    /// Media files discovered in the directory listing.
    pub discovered: usize,
    /// Entries actually written to the manifest.
    pub written: usize,
}

impl ManifestReport {
    /// Whether some discovered entries could not be written.
    pub fn incomplete(&self) -> bool {
        self.written != self.discovered
    }

    /// Status message for the batch log.
    pub fn summary(&self, manifest_name: &str) -> String {
        format!(
            "Created {} with {} media entries.",
            manifest_name, self.written
        )
    }
}

/// Scan `dir` for files with the given audio extension (case-insensitive)
/// and write their absolute paths to `manifest_name` inside `dir`,
/// overwriting any prior manifest.
///
/// Per-entry failures (a filename that is not valid UTF-8) are logged and
/// skipped; they do not abort the scan. A report where `written` differs
/// from `discovered` is a warning condition, not an error.
pub fn write_wav_manifest(
    dir: &Path,
    manifest_name: &str,
    extension: &str,
    progress: Option<ScanProgress<'_>>,
) -> Result<ManifestReport, ManifestError> {
    let entries = std::fs::read_dir(dir).and_then(|iter| {
        let mut names: Vec<String> = Vec::new();
        for entry in iter {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            match name.to_str() {
                Some(name) if has_extension(name, extension) => names.push(name.to_string()),
                Some(_) => {}
                None => {
                    tracing::warn!(
                        "Skipping non-UTF-8 filename in {}: {:?}",
                        dir.display(),
                        name
                    );
                }
            }
        }
        Ok(names)
    });

    let mut media_names = entries.map_err(|source| ManifestError::ListDir {
        path: dir.to_path_buf(),
        source,
    })?;
    media_names.sort();

    // Listing succeeded, so the directory exists and canonicalize only
    // fails on races; treat that as a listing failure too.
    let abs_dir = dir.canonicalize().map_err(|source| ManifestError::ListDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let total = media_names.len();
    let manifest_path = dir.join(manifest_name);

    if let Some(report) = progress {
        report(0, total, &format!("Scanning {} media files...", total));
    }

    let file = File::create(&manifest_path).map_err(|source| ManifestError::Io {
        path: manifest_path.clone(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    let mut written = 0usize;
    for (i, name) in media_names.iter().enumerate() {
        match posix_path_string(&abs_dir.join(name)) {
            Some(path) => {
                serde_json::to_writer(&mut writer, &ManifestEntry::new(path)).map_err(|e| {
                    ManifestError::Io {
                        path: manifest_path.clone(),
                        source: io::Error::other(e),
                    }
                })?;
                writeln!(writer).map_err(|source| ManifestError::Io {
                    path: manifest_path.clone(),
                    source,
                })?;
                written += 1;
            }
            None => {
                tracing::warn!("Skipping unencodable path for {} in {}", name, dir.display());
            }
        }

        if let Some(report) = progress {
            if (i + 1) % PROGRESS_BATCH == 0 {
                report(
                    i + 1,
                    total,
                    &format!("Writing {} ({}/{})...", manifest_name, i + 1, total),
                );
            }
        }
    }

    writer.flush().map_err(|source| ManifestError::Io {
        path: manifest_path.clone(),
        source,
    })?;

    if let Some(report) = progress {
        report(
            written,
            total,
            &format!("Finished {} ({}/{}).", manifest_name, written, total),
        );
    }

    let report = ManifestReport {
        discovered: total,
        written,
    };
    if report.incomplete() {
        tracing::warn!(
            "Found {} media files in {} but wrote {} manifest entries",
            report.discovered,
            dir.display(),
            report.written
        );
    }

    Ok(report)
}

/// Case-insensitive extension check on the raw filename.
fn has_extension(name: &str, extension: &str) -> bool {
    Path::new(name)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Absolute path as a forward-slash string, or None if not valid UTF-8.
fn posix_path_string(path: &Path) -> Option<String> {
    path.to_str().map(|s| s.replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn writes_one_line_per_wav() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "b.wav");
        touch(dir.path(), "a.WAV");
        touch(dir.path(), "notes.trn");
        touch(dir.path(), "readme.txt");

        let report = write_wav_manifest(dir.path(), "paths.jsonl", "wav", None).unwrap();
        assert_eq!(report.discovered, 2);
        assert_eq!(report.written, 2);
        assert!(!report.incomplete());

        let content = fs::read_to_string(dir.path().join("paths.jsonl")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        // Sorted by filename, absolute forward-slash paths.
        let first: ManifestEntry = serde_json::from_str(lines[0]).unwrap();
        let second: ManifestEntry = serde_json::from_str(lines[1]).unwrap();
        assert!(first.path.ends_with("a.WAV"));
        assert!(second.path.ends_with("b.wav"));
        assert!(!first.path.contains('\\'));
        assert!(Path::new(&first.path).is_absolute());
    }

    #[test]
    fn overwrites_prior_manifest() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "clip.wav");
        fs::write(dir.path().join("paths.jsonl"), "stale content\n").unwrap();

        let report = write_wav_manifest(dir.path(), "paths.jsonl", "wav", None).unwrap();
        assert_eq!(report.written, 1);

        let content = fs::read_to_string(dir.path().join("paths.jsonl")).unwrap();
        assert!(!content.contains("stale"));
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn empty_directory_yields_zero_entries() {
        let dir = tempdir().unwrap();
        let report = write_wav_manifest(dir.path(), "paths.jsonl", "wav", None).unwrap();
        assert_eq!(report.discovered, 0);
        assert_eq!(report.written, 0);

        // The (empty) manifest is still written.
        assert!(dir.path().join("paths.jsonl").exists());
    }

    #[test]
    fn missing_directory_is_a_listing_error() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("nope");
        let result = write_wav_manifest(&gone, "paths.jsonl", "wav", None);
        assert!(matches!(result, Err(ManifestError::ListDir { .. })));
    }

    #[test]
    fn reports_progress_with_final_update() {
        let dir = tempdir().unwrap();
        for i in 0..250 {
            touch(dir.path(), &format!("clip_{:04}.wav", i));
        }

        let calls = AtomicUsize::new(0);
        let report = write_wav_manifest(
            dir.path(),
            "paths.jsonl",
            "wav",
            Some(&|_done, total, _msg| {
                assert_eq!(total, 250);
                calls.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

        assert_eq!(report.written, 250);
        // Initial + two batch reports (100, 200) + final.
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn ignores_subdirectories() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "clip.wav");
        fs::create_dir(dir.path().join("nested.wav")).unwrap();

        let report = write_wav_manifest(dir.path(), "paths.jsonl", "wav", None).unwrap();
        assert_eq!(report.discovered, 1);
    }
}
