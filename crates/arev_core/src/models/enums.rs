//! Enums for subdirectory outcomes, job completion, and score fields.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Terminal state of one subdirectory within a batch run.
///
/// Every subdirectory the loop reaches ends in exactly one of these; a
/// cancelled run simply never reaches the remaining subdirectories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubdirOutcome {
    /// Manifest written and scorer ran to completion.
    Processed,
    /// Scores file already present and overwrite was off.
    SkippedExisting,
    /// No media files found; scorer never invoked.
    SkippedNoMedia,
    /// Manifest writing or scorer invocation failed.
    Error,
}

impl fmt::Display for SubdirOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubdirOutcome::Processed => "processed",
            SubdirOutcome::SkippedExisting => "skipped (existing scores)",
            SubdirOutcome::SkippedNoMedia => "skipped (no media)",
            SubdirOutcome::Error => "error",
        };
        f.write_str(s)
    }
}

/// How a batch run terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompletionState {
    /// The loop visited every subdirectory.
    #[default]
    Completed,
    /// Cancellation was requested and the loop stopped early.
    Halted,
}

impl CompletionState {
    /// Human-readable phrase used in the summary header.
    pub fn describe(&self) -> &'static str {
        match self {
            CompletionState::Completed => "Completed normally",
            CompletionState::Halted => "Halted by user request",
        }
    }
}

/// The four quality metrics produced by the external scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreField {
    /// Content enjoyment.
    Ce,
    /// Content usefulness.
    Cu,
    /// Production complexity.
    Pc,
    /// Production quality.
    Pq,
}

impl ScoreField {
    /// All fields, in display-column order.
    pub const ALL: [ScoreField; 4] = [
        ScoreField::Ce,
        ScoreField::Cu,
        ScoreField::Pc,
        ScoreField::Pq,
    ];

    /// The field's wire/display name.
    pub fn name(&self) -> &'static str {
        match self {
            ScoreField::Ce => "CE",
            ScoreField::Cu => "CU",
            ScoreField::Pc => "PC",
            ScoreField::Pq => "PQ",
        }
    }
}

impl fmt::Display for ScoreField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_displays_reason() {
        assert_eq!(SubdirOutcome::SkippedNoMedia.to_string(), "skipped (no media)");
        assert_eq!(SubdirOutcome::Processed.to_string(), "processed");
    }

    #[test]
    fn score_field_names() {
        let names: Vec<&str> = ScoreField::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["CE", "CU", "PC", "PQ"]);
    }
}
