//! Stable sorting of record views.

use std::cmp::Ordering;

use crate::models::{AudioRecord, ScoreField};

/// Columns a view can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// File name, case-insensitive.
    Filename,
    /// Full path, case-insensitive.
    Path,
    /// One of the numeric score columns.
    Score(ScoreField),
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// The opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Tracks the last sorted column so repeated requests toggle direction.
///
/// Matches column-header behavior: clicking a new column sorts ascending,
/// clicking the same column again flips the direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortState {
    field: Option<SortField>,
    direction: SortDirection,
}

impl SortState {
    /// Resolve the direction for a sort request and record it.
    pub fn request(&mut self, field: SortField) -> SortDirection {
        self.direction = if self.field == Some(field) {
            self.direction.toggled()
        } else {
            SortDirection::Ascending
        };
        self.field = Some(field);
        self.direction
    }

    /// Forget the current column (e.g. after re-filtering).
    pub fn reset(&mut self) {
        self.field = None;
        self.direction = SortDirection::Ascending;
    }

    /// The current sort column, if any.
    pub fn field(&self) -> Option<SortField> {
        self.field
    }

    /// The current direction.
    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

/// Sort records in place by the given field and direction.
///
/// The sort is stable; equal keys keep their relative order. Records with
/// an absent score always order after all records with present scores,
/// whichever direction is active.
pub fn sort_records(records: &mut [AudioRecord], field: SortField, direction: SortDirection) {
    records.sort_by(|a, b| compare(a, b, field, direction));
}

fn compare(a: &AudioRecord, b: &AudioRecord, field: SortField, direction: SortDirection) -> Ordering {
    match field {
        SortField::Filename => directed(
            a.filename.to_lowercase().cmp(&b.filename.to_lowercase()),
            direction,
        ),
        SortField::Path => directed(
            a.path
                .to_string_lossy()
                .to_lowercase()
                .cmp(&b.path.to_string_lossy().to_lowercase()),
            direction,
        ),
        SortField::Score(score_field) => {
            compare_optional(a.score(score_field), b.score(score_field), direction)
        }
    }
}

/// Compare optional scores: absent values stay after present ones in
/// either direction, present values compare in the requested direction.
fn compare_optional(a: Option<f64>, b: Option<f64>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => directed(x.partial_cmp(&y).unwrap_or(Ordering::Equal), direction),
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoreEntry;

    fn record(name: &str, pq: Option<f64>) -> AudioRecord {
        AudioRecord::new(
            format!("/data/{}", name),
            ScoreEntry {
                pq,
                ..Default::default()
            },
        )
    }

    fn names(records: &[AudioRecord]) -> Vec<&str> {
        records.iter().map(|r| r.filename.as_str()).collect()
    }

    #[test]
    fn sorts_scores_ascending_with_absent_last() {
        let mut records = vec![
            record("a.wav", Some(3.0)),
            record("b.wav", None),
            record("c.wav", Some(1.0)),
            record("d.wav", Some(2.0)),
        ];
        sort_records(
            &mut records,
            SortField::Score(ScoreField::Pq),
            SortDirection::Ascending,
        );
        assert_eq!(names(&records), vec!["c.wav", "d.wav", "a.wav", "b.wav"]);
    }

    #[test]
    fn descending_keeps_absent_last() {
        let mut records = vec![
            record("a.wav", Some(3.0)),
            record("b.wav", None),
            record("c.wav", Some(1.0)),
        ];
        sort_records(
            &mut records,
            SortField::Score(ScoreField::Pq),
            SortDirection::Descending,
        );
        assert_eq!(names(&records), vec!["a.wav", "c.wav", "b.wav"]);
    }

    #[test]
    fn stable_for_equal_keys() {
        let mut records = vec![
            record("first.wav", Some(1.0)),
            record("second.wav", Some(1.0)),
            record("third.wav", Some(1.0)),
        ];
        sort_records(
            &mut records,
            SortField::Score(ScoreField::Pq),
            SortDirection::Ascending,
        );
        assert_eq!(names(&records), vec!["first.wav", "second.wav", "third.wav"]);
    }

    #[test]
    fn filename_sort_ignores_case() {
        let mut records = vec![
            record("Banana.wav", None),
            record("apple.wav", None),
            record("Cherry.wav", None),
        ];
        sort_records(&mut records, SortField::Filename, SortDirection::Ascending);
        assert_eq!(
            names(&records),
            vec!["apple.wav", "Banana.wav", "Cherry.wav"]
        );
    }

    #[test]
    fn repeated_requests_toggle_direction() {
        let mut state = SortState::default();
        let field = SortField::Score(ScoreField::Pq);

        assert_eq!(state.request(field), SortDirection::Ascending);
        assert_eq!(state.request(field), SortDirection::Descending);
        assert_eq!(state.request(field), SortDirection::Ascending);

        // A different column resets to ascending.
        assert_eq!(state.request(SortField::Filename), SortDirection::Ascending);
    }

    #[test]
    fn sort_toggle_round_trips() {
        let mut records = vec![
            record("a.wav", Some(2.0)),
            record("b.wav", Some(1.0)),
            record("c.wav", Some(3.0)),
        ];
        let mut state = SortState::default();
        let field = SortField::Score(ScoreField::Pq);

        let dir = state.request(field);
        sort_records(&mut records, field, dir);
        assert_eq!(names(&records), vec!["b.wav", "a.wav", "c.wav"]);

        let dir = state.request(field);
        sort_records(&mut records, field, dir);
        assert_eq!(names(&records), vec!["c.wav", "a.wav", "b.wav"]);

        let dir = state.request(field);
        sort_records(&mut records, field, dir);
        assert_eq!(names(&records), vec!["b.wav", "a.wav", "c.wav"]);
    }
}
