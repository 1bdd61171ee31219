//! Settings struct with TOML-based sections.
//!
//! Each section maps to a TOML table and carries serde defaults, so an old
//! or hand-edited config file with missing keys still loads.

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Well-known filenames inside each subdirectory unit.
    #[serde(default)]
    pub files: FileSettings,

    /// External scorer invocation settings.
    #[serde(default)]
    pub scorer: ScorerSettings,

    /// Batch log configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Filenames and extensions the pipeline looks for in a subdirectory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSettings {
    /// Manifest filename written by the index writer.
    #[serde(default = "default_manifest_filename")]
    pub manifest_filename: String,

    /// Scores filename written from the scorer's captured stdout.
    #[serde(default = "default_scores_filename")]
    pub scores_filename: String,

    /// Media file extension, matched case-insensitively.
    #[serde(default = "default_audio_extension")]
    pub audio_extension: String,
}

fn default_manifest_filename() -> String {
    "paths.jsonl".to_string()
}

fn default_scores_filename() -> String {
    "scores.jsonl".to_string()
}

fn default_audio_extension() -> String {
    "wav".to_string()
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            manifest_filename: default_manifest_filename(),
            scores_filename: default_scores_filename(),
            audio_extension: default_audio_extension(),
        }
    }
}

/// External scorer command configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerSettings {
    /// Name or path of the scorer executable.
    #[serde(default = "default_scorer_command")]
    pub command: String,

    /// Batch size passed to the scorer via `--batch-size`.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Overwrite existing scores files during a batch run.
    #[serde(default)]
    pub overwrite_existing: bool,
}

fn default_scorer_command() -> String {
    "audio-aes".to_string()
}

// Deliberately small; large batches are hard on the scorer.
fn default_batch_size() -> u32 {
    10
}

impl Default for ScorerSettings {
    fn default() -> Self {
        Self {
            command: default_scorer_command(),
            batch_size: default_batch_size(),
            overwrite_existing: false,
        }
    }
}

impl ScorerSettings {
    /// Validate user-editable fields before a run starts.
    ///
    /// Rejected input leaves whatever run state the caller holds untouched;
    /// nothing is written before validation passes.
    pub fn validate(&self) -> Result<(), String> {
        if self.command.trim().is_empty() {
            return Err("scorer command must not be empty".to_string());
        }
        if self.batch_size == 0 {
            return Err("batch size must be a positive integer".to_string());
        }
        Ok(())
    }
}

/// Batch log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format (filter progress lines, keep an error tail).
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Number of captured output lines to keep for error diagnosis.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Show timestamps in batch log output.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

fn default_progress_step() -> u32 {
    20
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: default_true(),
            progress_step: default_progress_step(),
            error_tail: default_error_tail(),
            show_timestamps: default_true(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_field_use() {
        let settings = Settings::default();
        assert_eq!(settings.files.manifest_filename, "paths.jsonl");
        assert_eq!(settings.files.scores_filename, "scores.jsonl");
        assert_eq!(settings.scorer.command, "audio-aes");
        assert_eq!(settings.scorer.batch_size, 10);
        assert!(!settings.scorer.overwrite_existing);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
            [scorer]
            command = "/opt/bin/audio-aes"
        "#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.scorer.command, "/opt/bin/audio-aes");
        assert_eq!(settings.scorer.batch_size, 10);
        assert_eq!(settings.files.audio_extension, "wav");
    }

    #[test]
    fn validate_rejects_bad_scorer_input() {
        let mut scorer = ScorerSettings::default();
        scorer.command = "   ".to_string();
        assert!(scorer.validate().is_err());

        let mut scorer = ScorerSettings::default();
        scorer.batch_size = 0;
        assert!(scorer.validate().is_err());

        assert!(ScorerSettings::default().validate().is_ok());
    }
}
