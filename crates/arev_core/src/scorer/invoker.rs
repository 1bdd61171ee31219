//! Low-level scorer command wrapper.
//!
//! The invocation is blocking and has no timeout: a hung scorer blocks the
//! calling worker until the process exits. Callers must never run this on a
//! responsiveness-critical thread.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// Parameters for one scorer invocation.
#[derive(Debug, Clone)]
pub struct ScorerRequest<'a> {
    /// Name or path of the scorer executable.
    pub command: &'a str,
    /// Manifest filename, relative to the working directory.
    pub manifest_name: &'a str,
    /// Scores filename to write, relative to the working directory.
    pub output_name: &'a str,
    /// Value for the `--batch-size` flag.
    pub batch_size: u32,
}

impl ScorerRequest<'_> {
    /// The command line as logged, for diagnostics.
    pub fn command_line(&self) -> String {
        format!(
            "{} {} --batch-size {}",
            self.command, self.manifest_name, self.batch_size
        )
    }
}

/// Successful invocation result.
#[derive(Debug, Clone)]
pub struct ScorerOutcome {
    /// Human-readable diagnostic, including any stderr the tool produced.
    pub message: String,
}

/// Errors from scorer invocation, one variant per failure category.
///
/// `Display` stays a single line; `diagnostic()` renders the full message
/// with captured streams for the batch log.
#[derive(Error, Debug)]
pub enum ScorerError {
    /// Input manifest does not exist (or could not be inspected).
    #[error("Input file not found: {}", path.display())]
    ManifestMissing {
        path: PathBuf,
        #[source]
        source: Option<io::Error>,
    },

    /// Input manifest exists but is empty.
    #[error("Input file is empty: {}", path.display())]
    ManifestEmpty { path: PathBuf },

    /// The command identifier did not resolve to an executable.
    #[error("Command '{command}' not found; make sure it is installed and on PATH")]
    CommandNotFound { command: String },

    /// The command could not be spawned for another reason.
    #[error("Failed to run '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The tool ran and reported failure. Its stdout is discarded, never
    /// persisted as a scores file.
    #[error("{command} failed with exit code {code}")]
    NonZeroExit {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    /// The tool succeeded but the scores file could not be written. The
    /// captured stdout is retained so only the write needs retrying.
    #[error("Scorer succeeded but writing {} failed: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
        stdout: String,
        stderr: String,
    },
}

impl ScorerError {
    /// Full multi-line diagnostic for the batch log, including captured
    /// stdout/stderr where the variant carries them.
    pub fn diagnostic(&self) -> String {
        match self {
            ScorerError::NonZeroExit {
                code,
                stdout,
                stderr,
                ..
            } => {
                let mut msg = format!("ERROR running command. Exit code: {}", code);
                if !stderr.is_empty() {
                    msg.push_str(&format!(
                        "\n--- Command Standard Error ---\n{}",
                        stderr.trim_end()
                    ));
                }
                if !stdout.is_empty() {
                    msg.push_str(&format!(
                        "\n--- Command Standard Output (discarded) ---\n{}",
                        stdout.trim_end()
                    ));
                }
                msg
            }
            ScorerError::OutputWrite {
                path,
                source,
                stderr,
                ..
            } => {
                let mut msg = format!(
                    "Command succeeded but failed to write {}: {}",
                    path.display(),
                    source
                );
                if !stderr.is_empty() {
                    msg.push_str(&format!(
                        "\n--- Command Standard Error ---\n{}",
                        stderr.trim_end()
                    ));
                }
                msg.push_str("\nRe-running the directory will repeat the scorer call; only the write step failed.");
                msg
            }
            other => format!("ERROR: {}", other),
        }
    }
}

/// Run the scorer in `dir`, writing its stdout to the scores file.
///
/// Preconditions (checked before any process is spawned): the manifest
/// exists and is non-empty. On a zero exit status the captured stdout is
/// written verbatim to the output file and stderr, if any, is appended to
/// the returned message; stderr alone never indicates failure.
pub fn run_scorer(dir: &Path, request: &ScorerRequest<'_>) -> Result<ScorerOutcome, ScorerError> {
    let manifest_path = dir.join(request.manifest_name);
    let output_path = dir.join(request.output_name);

    match fs::metadata(&manifest_path) {
        Err(source) => {
            return Err(ScorerError::ManifestMissing {
                path: manifest_path,
                source: Some(source),
            });
        }
        Ok(meta) if meta.len() == 0 => {
            return Err(ScorerError::ManifestEmpty {
                path: manifest_path,
            });
        }
        Ok(_) => {}
    }

    tracing::debug!(
        "Running in {}: {}",
        dir.display(),
        request.command_line()
    );

    let output = Command::new(request.command)
        .arg(request.manifest_name)
        .arg("--batch-size")
        .arg(request.batch_size.to_string())
        .current_dir(dir)
        .output()
        .map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ScorerError::CommandNotFound {
                    command: request.command.to_string(),
                }
            } else {
                ScorerError::SpawnFailed {
                    command: request.command.to_string(),
                    source,
                }
            }
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if !output.status.success() {
        return Err(ScorerError::NonZeroExit {
            command: request.command.to_string(),
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr,
        });
    }

    if let Err(source) = fs::write(&output_path, &output.stdout) {
        return Err(ScorerError::OutputWrite {
            path: output_path,
            source,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr,
        });
    }

    let mut message = format!(
        "Command executed successfully. Output written to {}.",
        request.output_name
    );
    if !stderr.is_empty() {
        message.push_str(&format!(
            "\n--- Command Standard Error ---\n{}",
            stderr.trim_end()
        ));
    }

    Ok(ScorerOutcome { message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MANIFEST: &str = "paths.jsonl";
    const SCORES: &str = "scores.jsonl";

    fn request(command: &str) -> ScorerRequest<'_> {
        ScorerRequest {
            command,
            manifest_name: MANIFEST,
            output_name: SCORES,
            batch_size: 10,
        }
    }

    fn write_manifest(dir: &Path) {
        fs::write(
            dir.join(MANIFEST),
            "{\"path\":\"/data/a.wav\"}\n{\"path\":\"/data/b.wav\"}\n",
        )
        .unwrap();
    }

    #[cfg(unix)]
    fn fake_scorer(dir: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-scorer.sh");
        fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script.to_string_lossy().to_string()
    }

    #[test]
    fn missing_manifest_fails_fast() {
        let dir = tempdir().unwrap();
        let result = run_scorer(dir.path(), &request("audio-aes"));
        assert!(matches!(result, Err(ScorerError::ManifestMissing { .. })));
    }

    #[test]
    fn empty_manifest_fails_fast() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST), b"").unwrap();
        let result = run_scorer(dir.path(), &request("audio-aes"));
        assert!(matches!(result, Err(ScorerError::ManifestEmpty { .. })));
    }

    #[test]
    fn unknown_command_is_not_found() {
        let dir = tempdir().unwrap();
        write_manifest(dir.path());

        let result = run_scorer(dir.path(), &request("arev-no-such-command-zz"));
        match result {
            Err(ScorerError::CommandNotFound { command }) => {
                assert_eq!(command, "arev-no-such-command-zz");
            }
            other => panic!("expected CommandNotFound, got {:?}", other.map(|o| o.message)),
        }
    }

    #[cfg(unix)]
    #[test]
    fn success_writes_stdout_verbatim() {
        let dir = tempdir().unwrap();
        write_manifest(dir.path());
        let cmd = fake_scorer(dir.path(), "printf '{\"PQ\": 1.0}\\n{\"PQ\": 2.0}\\n'");

        let outcome = run_scorer(dir.path(), &request(&cmd)).unwrap();
        assert!(outcome.message.contains("successfully"));

        let scores = fs::read_to_string(dir.path().join(SCORES)).unwrap();
        assert_eq!(scores, "{\"PQ\": 1.0}\n{\"PQ\": 2.0}\n");
    }

    #[cfg(unix)]
    #[test]
    fn stderr_is_appended_but_not_a_failure() {
        let dir = tempdir().unwrap();
        write_manifest(dir.path());
        let cmd = fake_scorer(
            dir.path(),
            "echo 'model loaded' >&2\nprintf '{\"PQ\": 1.0}\\n'",
        );

        let outcome = run_scorer(dir.path(), &request(&cmd)).unwrap();
        assert!(outcome.message.contains("Command Standard Error"));
        assert!(outcome.message.contains("model loaded"));
        assert!(dir.path().join(SCORES).exists());
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_discards_stdout() {
        let dir = tempdir().unwrap();
        write_manifest(dir.path());
        let cmd = fake_scorer(dir.path(), "printf 'partial'\necho 'boom' >&2\nexit 3");

        let result = run_scorer(dir.path(), &request(&cmd));
        match result {
            Err(err @ ScorerError::NonZeroExit { code, .. }) => {
                assert_eq!(code, 3);
                let diag = err.diagnostic();
                assert!(diag.contains("Exit code: 3"));
                assert!(diag.contains("boom"));
                assert!(diag.contains("partial"));
            }
            other => panic!("expected NonZeroExit, got {:?}", other.map(|o| o.message)),
        }

        // Scores from a failed run are never persisted.
        assert!(!dir.path().join(SCORES).exists());
    }

    #[test]
    fn command_line_renders_flags() {
        let req = request("audio-aes");
        assert_eq!(req.command_line(), "audio-aes paths.jsonl --batch-size 10");
    }
}
