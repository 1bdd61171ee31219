//! The batch preprocessing loop.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::logging::BatchLogger;
use crate::manifest;
use crate::models::{CompletionState, JobSummary, SubdirOutcome};
use crate::scorer::{self, ScorerRequest};

use super::cancel::CancelToken;
use super::errors::{BatchError, BatchResult};
use super::events::{BatchEvent, EventSink};
use super::types::BatchOptions;

/// Run one batch preprocessing job over the subdirectories of `base_dir`.
///
/// Subdirectories are visited in sorted name order, strictly sequentially.
/// Per-subdirectory failures are recorded and the loop continues; only a
/// failure to enumerate the subdirectories at the very start is fatal.
/// The returned summary is also emitted as `BatchEvent::Finished`, exactly
/// once, whether the run completed or was halted.
///
/// This call blocks for the whole run (including every scorer invocation)
/// and must not be made from a responsiveness-critical thread; see
/// `worker::BatchWorker` for the threaded entry point.
pub fn run_batch(
    base_dir: &Path,
    options: &BatchOptions,
    logger: &BatchLogger,
    events: &EventSink,
    cancel: &CancelToken,
) -> BatchResult<JobSummary> {
    options.validate()?;

    let started = Instant::now();
    let manifest_name = options.files.manifest_filename.as_str();
    let scores_name = options.files.scores_filename.as_str();

    logger.section("Starting New Preprocessing Job");
    logger.info(&format!("Base Directory: {}", base_dir.display()));
    logger.info(&format!("Scorer Command: {}", options.scorer.command));
    logger.info(&format!("Batch Size: {}", options.scorer.batch_size));
    logger.info(&format!(
        "Overwrite Existing {}: {}",
        scores_name, options.scorer.overwrite_existing
    ));

    let subdirs = match list_subdirs(base_dir) {
        Ok(subdirs) => subdirs,
        Err(err) => {
            logger.error(&format!("FATAL: {}", err));
            return Err(err);
        }
    };

    let total = subdirs.len();
    let mut summary = JobSummary {
        subdirs_scanned: total,
        ..Default::default()
    };

    if subdirs.is_empty() {
        logger.info("No subdirectories found to process in the base directory.");
        summary.elapsed = started.elapsed();
        finish(&mut summary, base_dir, logger, events, cancel);
        return Ok(summary);
    }

    logger.info(&format!(
        "Found {} subdirectories. Starting processing...",
        total
    ));
    events.emit(BatchEvent::Started {
        total_subdirs: total,
    });

    for (i, (name, subdir)) in subdirs.iter().enumerate() {
        let index = i + 1;

        if cancel.is_cancelled() {
            logger.warn(&format!(
                "Stop requested. Halting preprocessing before processing '{}'.",
                name
            ));
            break;
        }

        events.emit(BatchEvent::SubdirStarted {
            index,
            total,
            name: name.clone(),
        });
        logger.section(&format!("({}/{}) {}", index, total, name));

        // Skip/overwrite policy comes first: an existing scores file with
        // overwrite off means no filesystem writes in this subdirectory.
        if !options.scorer.overwrite_existing && subdir.join(scores_name).exists() {
            logger.info(&format!(
                "Skipping: {} already exists and overwrite is OFF.",
                scores_name
            ));
            record_outcome(
                &mut summary,
                SubdirOutcome::SkippedExisting,
                index,
                total,
                name,
                events,
            );
            continue;
        }

        if cancel.is_cancelled() {
            logger.warn(&format!(
                "Stop requested before {} creation for '{}'. Halting.",
                manifest_name, name
            ));
            break;
        }

        let progress = |done: usize, scan_total: usize, message: &str| {
            events.emit_lossy(BatchEvent::Phase {
                index,
                total,
                name: name.clone(),
                message: format!("({}/{}) {}", done, scan_total, message),
            });
        };

        let written = match manifest::write_wav_manifest(
            subdir,
            manifest_name,
            &options.files.audio_extension,
            Some(&progress),
        ) {
            Ok(report) => {
                logger.info(&format!(
                    "  1. Create {}: {}",
                    manifest_name,
                    report.summary(manifest_name)
                ));
                if report.incomplete() {
                    logger.warn(&format!(
                        "Found {} media files but wrote {} entries.",
                        report.discovered, report.written
                    ));
                }
                report.written
            }
            Err(err) => {
                logger.error(&format!(
                    "Failed to create {}: {}. Skipping scorer.",
                    manifest_name, err
                ));
                record_outcome(
                    &mut summary,
                    SubdirOutcome::Error,
                    index,
                    total,
                    name,
                    events,
                );
                continue;
            }
        };

        if written == 0 {
            logger.info("Skipping scorer: no media files found.");
            record_outcome(
                &mut summary,
                SubdirOutcome::SkippedNoMedia,
                index,
                total,
                name,
                events,
            );
            continue;
        }

        if cancel.is_cancelled() {
            logger.warn(&format!(
                "Stop requested just before running the scorer for '{}'. Halting.",
                name
            ));
            break;
        }

        let request = ScorerRequest {
            command: &options.scorer.command,
            manifest_name,
            output_name: scores_name,
            batch_size: options.scorer.batch_size,
        };

        logger.info(&format!("  2. Running {}...", options.scorer.command));
        logger.command(&request.command_line());
        events.emit_lossy(BatchEvent::Phase {
            index,
            total,
            name: name.clone(),
            message: "Running scorer command...".to_string(),
        });

        // Blocks until the external process exits; not preemptible.
        let run_started = Instant::now();
        let result = scorer::run_scorer(subdir, &request);
        let run_time = run_started.elapsed();

        let stop_pending = cancel.is_cancelled();
        let suffix = if stop_pending {
            " (stop was requested during run)"
        } else {
            ""
        };

        let outcome = match result {
            Ok(outcome) => {
                logger.info(&format!(
                    "Command finished in {:.2}s. Result: Success{}",
                    run_time.as_secs_f64(),
                    suffix
                ));
                log_indented(logger, &outcome.message);
                SubdirOutcome::Processed
            }
            Err(err) => {
                logger.info(&format!(
                    "Command finished in {:.2}s. Result: FAILURE{}",
                    run_time.as_secs_f64(),
                    suffix
                ));
                log_indented(logger, &err.diagnostic());
                SubdirOutcome::Error
            }
        };
        record_outcome(&mut summary, outcome, index, total, name, events);

        // The invocation already in flight was allowed to finish; halt now.
        if stop_pending {
            logger.warn(&format!(
                "Stop requested during scorer run for '{}'. Halting.",
                name
            ));
            break;
        }
    }

    summary.elapsed = started.elapsed();
    finish(&mut summary, base_dir, logger, events, cancel);
    Ok(summary)
}

/// Immediate subdirectories of `base_dir`, sorted by name.
fn list_subdirs(base_dir: &Path) -> BatchResult<Vec<(String, PathBuf)>> {
    let iter = std::fs::read_dir(base_dir).map_err(|source| BatchError::ListSubdirs {
        path: base_dir.to_path_buf(),
        source,
    })?;

    let mut subdirs = Vec::new();
    for entry in iter {
        let entry = entry.map_err(|source| BatchError::ListSubdirs {
            path: base_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            subdirs.push((entry.file_name().to_string_lossy().to_string(), path));
        }
    }

    subdirs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(subdirs)
}

/// Count an outcome and notify the observer.
fn record_outcome(
    summary: &mut JobSummary,
    outcome: SubdirOutcome,
    index: usize,
    total: usize,
    name: &str,
    events: &EventSink,
) {
    summary.record(outcome);
    events.emit(BatchEvent::SubdirFinished {
        index,
        total,
        name: name.to_string(),
        outcome,
    });
}

/// Log the summary block and emit the terminal event.
fn finish(
    summary: &mut JobSummary,
    base_dir: &Path,
    logger: &BatchLogger,
    events: &EventSink,
    cancel: &CancelToken,
) {
    summary.completion = if cancel.is_cancelled() {
        CompletionState::Halted
    } else {
        CompletionState::Completed
    };

    for line in summary.to_log_lines(&base_dir.display().to_string()) {
        logger.info(&line);
    }
    logger.flush();

    events.emit(BatchEvent::Finished(summary.clone()));
}

/// Log a multi-line diagnostic message with the original's indentation.
fn log_indented(logger: &BatchLogger, message: &str) {
    for line in message.lines() {
        logger.info(&format!("       {}", line));
    }
}
