//! Aggregate summary of one batch preprocessing run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{CompletionState, SubdirOutcome};

/// Counters and timing for one orchestrator run.
///
/// Produced exactly once per run, whether the run completed or was halted,
/// and surfaced to the caller as the run's terminal output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobSummary {
    /// Immediate subdirectories found under the base directory.
    pub subdirs_scanned: usize,
    /// Subdirectories where the scorer ran to completion.
    pub processed: usize,
    /// Subdirectories where manifest writing or the scorer failed.
    pub errors: usize,
    /// Subdirectories with zero media files.
    pub skipped_no_media: usize,
    /// Subdirectories skipped because scores existed and overwrite was off.
    pub skipped_existing: usize,
    /// Wall time for the whole run.
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
    /// Whether the run completed or was halted by cancellation.
    pub completion: CompletionState,
}

impl JobSummary {
    /// Record one subdirectory outcome in the counters.
    pub fn record(&mut self, outcome: SubdirOutcome) {
        match outcome {
            SubdirOutcome::Processed => self.processed += 1,
            SubdirOutcome::Error => self.errors += 1,
            SubdirOutcome::SkippedNoMedia => self.skipped_no_media += 1,
            SubdirOutcome::SkippedExisting => self.skipped_existing += 1,
        }
    }

    /// Whether the run was halted before visiting every subdirectory.
    pub fn halted(&self) -> bool {
        self.completion == CompletionState::Halted
    }

    /// Render the summary block written to the batch log.
    pub fn to_log_lines(&self, base_dir: &str) -> Vec<String> {
        vec![
            format!(
                "--- Preprocessing Job Summary ({}) ---",
                self.completion.describe()
            ),
            format!("Total Time: {:.2} seconds", self.elapsed.as_secs_f64()),
            format!("Base Directory: {}", base_dir),
            format!("Subdirectories Scanned: {}", self.subdirs_scanned),
            format!("Successfully Processed: {}", self.processed),
            format!("Errors Encountered: {}", self.errors),
            format!("Skipped (No media files): {}", self.skipped_no_media),
            format!(
                "Skipped (scores existed, overwrite OFF): {}",
                self.skipped_existing
            ),
            "--------------------------------------------------".to_string(),
        ]
    }
}

/// Serialize `Duration` as fractional seconds for the summary payload.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(de)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_updates_matching_counter() {
        let mut summary = JobSummary::default();
        summary.record(SubdirOutcome::Processed);
        summary.record(SubdirOutcome::Processed);
        summary.record(SubdirOutcome::SkippedNoMedia);
        summary.record(SubdirOutcome::Error);

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.skipped_no_media, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.skipped_existing, 0);
    }

    #[test]
    fn summary_serializes_elapsed_as_seconds() {
        let summary = JobSummary {
            elapsed: Duration::from_millis(1500),
            ..Default::default()
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"elapsed\":1.5"));

        let back: JobSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.elapsed, Duration::from_millis(1500));
    }

    #[test]
    fn log_lines_name_the_completion_state() {
        let summary = JobSummary {
            completion: CompletionState::Halted,
            ..Default::default()
        };
        let lines = summary.to_log_lines("/data/sets");
        assert!(lines[0].contains("Halted by user request"));
        assert!(lines.iter().any(|l| l.contains("/data/sets")));
    }
}
