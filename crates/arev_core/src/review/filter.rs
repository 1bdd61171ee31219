//! Predicate filtering over loaded records.

use thiserror::Error;

use crate::models::{AudioRecord, ScoreField};

/// Inclusive numeric bounds on one score field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBounds {
    /// Minimum accepted value, inclusive.
    pub min: Option<f64>,
    /// Maximum accepted value, inclusive.
    pub max: Option<f64>,
}

impl ScoreBounds {
    /// No constraint on either end.
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Whether an optional score satisfies these bounds.
    ///
    /// An absent value never satisfies a bound: if either end is set and
    /// the record has no score on this field, the record is excluded.
    fn matches(&self, value: Option<f64>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(v) = value else {
            return false;
        };
        if let Some(min) = self.min {
            if v < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if v > max {
                return false;
            }
        }
        true
    }

    fn validate(&self, field: ScoreField) -> Result<(), FilterError> {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(FilterError::InvalidBounds { field, min, max });
            }
        }
        Ok(())
    }
}

/// Filter parameters; every predicate is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterParams {
    /// Case-insensitive substring the filename must contain.
    pub filename_contains: Option<String>,
    /// Bounds on CE.
    pub ce: ScoreBounds,
    /// Bounds on CU.
    pub cu: ScoreBounds,
    /// Bounds on PC.
    pub pc: ScoreBounds,
    /// Bounds on PQ.
    pub pq: ScoreBounds,
}

impl FilterParams {
    /// Bounds for a field.
    pub fn bounds(&self, field: ScoreField) -> &ScoreBounds {
        match field {
            ScoreField::Ce => &self.ce,
            ScoreField::Cu => &self.cu,
            ScoreField::Pc => &self.pc,
            ScoreField::Pq => &self.pq,
        }
    }

    /// Validate all bounds pairs before any filtering executes.
    pub fn validate(&self) -> Result<(), FilterError> {
        for field in ScoreField::ALL {
            self.bounds(field).validate(field)?;
        }
        Ok(())
    }

    /// Whether a single record matches every supplied predicate.
    pub fn matches(&self, record: &AudioRecord) -> bool {
        if let Some(ref needle) = self.filename_contains {
            let needle = needle.to_lowercase();
            if !needle.is_empty() && !record.filename.to_lowercase().contains(&needle) {
                return false;
            }
        }
        ScoreField::ALL
            .iter()
            .all(|&field| self.bounds(field).matches(record.score(field)))
    }
}

/// User-input errors rejected before filtering runs.
#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    /// A min bound greater than its paired max bound.
    #[error("{field} min value {min} is greater than max value {max}")]
    InvalidBounds {
        field: ScoreField,
        min: f64,
        max: f64,
    },
}

/// Produce the ordered subset of `records` matching all predicates.
///
/// Invalid bounds are reported before any work happens; the caller's
/// currently displayed set stays as it was. With no predicates supplied
/// the result is exactly the input set, in the same order.
pub fn apply_filters(
    records: &[AudioRecord],
    params: &FilterParams,
) -> Result<Vec<AudioRecord>, FilterError> {
    params.validate()?;

    Ok(records
        .iter()
        .filter(|r| params.matches(r))
        .cloned()
        .collect())
}
