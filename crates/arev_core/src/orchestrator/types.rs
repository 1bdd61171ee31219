//! Option types for a batch run.

use crate::config::{FileSettings, ScorerSettings, Settings};

use super::errors::BatchError;

/// Everything a batch run needs beyond the base directory.
///
/// Captured from `Settings` at run start so mid-run config edits cannot
/// change an in-flight job.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Scorer command, batch size, and overwrite policy.
    pub scorer: ScorerSettings,
    /// Well-known filenames within each subdirectory.
    pub files: FileSettings,
}

impl BatchOptions {
    /// Snapshot the relevant sections of the application settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            scorer: settings.scorer.clone(),
            files: settings.files.clone(),
        }
    }

    /// Validate user-editable fields before any side effect.
    pub fn validate(&self) -> Result<(), BatchError> {
        self.scorer.validate().map_err(BatchError::InvalidOptions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_validate() {
        assert!(BatchOptions::default().validate().is_ok());
    }

    #[test]
    fn zero_batch_size_rejected() {
        let mut options = BatchOptions::default();
        options.scorer.batch_size = 0;
        assert!(matches!(
            options.validate(),
            Err(BatchError::InvalidOptions(_))
        ));
    }

    #[test]
    fn snapshot_copies_sections() {
        let mut settings = Settings::default();
        settings.scorer.overwrite_existing = true;
        settings.files.audio_extension = "flac".to_string();

        let options = BatchOptions::from_settings(&settings);
        assert!(options.scorer.overwrite_existing);
        assert_eq!(options.files.audio_extension, "flac");
    }
}
