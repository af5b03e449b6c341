//! Row assignment (layout solution) model.
//!
//! A row assignment maps every interval onto a display row such that no
//! two intervals sharing a row overlap. Rows are indexed contiguously
//! `0..N-1`; rows may be empty (padding, or members removed without
//! compaction).
//!
//! # Invariant
//! Within any row, every pair of entries satisfies
//! `end_i <= start_j || end_j <= start_i`. Entries within a row are kept
//! in ascending start order.

use serde::{Deserialize, Serialize};

use super::{DateSpan, Placement, RowHints};

/// One interval's slot within a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowEntry {
    /// Interval ID.
    pub id: String,
    /// Date range occupied in the row.
    pub span: DateSpan,
}

impl RowEntry {
    /// Creates a row entry.
    pub fn new(id: impl Into<String>, span: DateSpan) -> Self {
        Self {
            id: id.into(),
            span,
        }
    }
}

/// Ordered rows of interval ids with their occupied spans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowAssignment {
    rows: Vec<Vec<RowEntry>>,
    max_visible_rows: usize,
}

impl RowAssignment {
    /// Creates an empty assignment with no rows.
    pub fn new(max_visible_rows: usize) -> Self {
        Self {
            rows: Vec::new(),
            max_visible_rows,
        }
    }

    /// Number of rows, including empty padding rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of rows holding at least one interval.
    pub fn occupied_row_count(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_empty()).count()
    }

    /// Total number of placed intervals.
    pub fn interval_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Visible row threshold this assignment was built against.
    pub fn max_visible_rows(&self) -> usize {
        self.max_visible_rows
    }

    /// Whether the row count exceeds the visible threshold.
    ///
    /// Exceeding it makes the body scrollable; placement is never rejected.
    pub fn is_scrollable(&self) -> bool {
        self.rows.len() > self.max_visible_rows
    }

    /// All rows.
    pub fn rows(&self) -> &[Vec<RowEntry>] {
        &self.rows
    }

    /// Entries of one row, `None` if out of range.
    pub fn row(&self, row: usize) -> Option<&[RowEntry]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// Interval ids of one row in start order.
    pub fn row_ids(&self, row: usize) -> Vec<&str> {
        self.row(row)
            .map(|entries| entries.iter().map(|e| e.id.as_str()).collect())
            .unwrap_or_default()
    }

    /// Finds the placement of an interval.
    pub fn placement_of(&self, id: &str) -> Option<Placement> {
        self.rows.iter().enumerate().find_map(|(row, entries)| {
            entries
                .iter()
                .find(|e| e.id == id)
                .map(|e| Placement::new(row, e.span))
        })
    }

    /// Row of an interval.
    pub fn row_of(&self, id: &str) -> Option<usize> {
        self.placement_of(id).map(|p| p.row)
    }

    /// Entries in `row` overlapping `span`, ignoring `exclude_id`.
    ///
    /// Rows beyond the current count have no conflicts.
    pub fn conflicts(&self, row: usize, span: &DateSpan, exclude_id: &str) -> Vec<&RowEntry> {
        self.rows
            .get(row)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.id != exclude_id && e.span.overlaps(span))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether `span` fits in `row` without overlapping anything but `exclude_id`.
    pub fn is_free(&self, row: usize, span: &DateSpan, exclude_id: &str) -> bool {
        self.conflicts(row, span, exclude_id).is_empty()
    }

    /// Current rows as hints, suitable for re-running the assigner.
    pub fn hints(&self) -> RowHints {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(row, entries)| entries.iter().map(move |e| (e.id.clone(), row as i64)))
            .collect()
    }

    /// Latest end date across all rows.
    pub fn max_end(&self) -> Option<chrono::NaiveDate> {
        self.rows.iter().flatten().map(|e| e.span.end).max()
    }

    /// Inserts an entry, appending empty rows up to `row` as needed.
    ///
    /// Does not check for overlap; callers place only into free slots.
    pub(crate) fn insert(&mut self, row: usize, entry: RowEntry) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let entries = &mut self.rows[row];
        let pos = entries
            .iter()
            .position(|e| (e.span.start, e.id.as_str()) > (entry.span.start, entry.id.as_str()))
            .unwrap_or(entries.len());
        entries.insert(pos, entry);
    }

    /// Removes an interval, leaving its row (and row indices) in place.
    pub(crate) fn remove(&mut self, id: &str) -> Option<Placement> {
        for (row, entries) in self.rows.iter_mut().enumerate() {
            if let Some(pos) = entries.iter().position(|e| e.id == id) {
                let entry = entries.remove(pos);
                return Some(Placement::new(row, entry.span));
            }
        }
        None
    }

    /// Pads with empty rows up to `min_rows`.
    pub(crate) fn pad_to(&mut self, min_rows: usize) {
        if self.rows.len() < min_rows {
            self.rows.resize_with(min_rows, Vec::new);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn span(from: u32, to: u32) -> DateSpan {
        DateSpan::new(
            NaiveDate::from_ymd_opt(2024, 1, from).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, to).unwrap(),
        )
    }

    fn sample() -> RowAssignment {
        let mut a = RowAssignment::new(2);
        a.insert(0, RowEntry::new("P3", span(11, 20)));
        a.insert(0, RowEntry::new("P1", span(1, 10)));
        a.insert(1, RowEntry::new("P2", span(5, 15)));
        a
    }

    #[test]
    fn test_insert_keeps_start_order() {
        let a = sample();
        assert_eq!(a.row_ids(0), vec!["P1", "P3"]);
        assert_eq!(a.row_ids(1), vec!["P2"]);
        assert_eq!(a.interval_count(), 3);
    }

    #[test]
    fn test_lookup() {
        let a = sample();
        assert_eq!(a.row_of("P2"), Some(1));
        assert_eq!(a.placement_of("P3").unwrap().span, span(11, 20));
        assert_eq!(a.row_of("missing"), None);
        assert!(a.row_ids(7).is_empty());
    }

    #[test]
    fn test_conflicts_exclude_self() {
        let a = sample();
        assert!(a.is_free(0, &span(1, 10), "P1"));
        let hits = a.conflicts(0, &span(5, 14), "P1");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "P3");
        assert!(a.is_free(5, &span(1, 30), "X")); // beyond row count
    }

    #[test]
    fn test_remove_leaves_rows() {
        let mut a = sample();
        let removed = a.remove("P2").unwrap();
        assert_eq!(removed.row, 1);
        assert_eq!(a.row_count(), 2);
        assert_eq!(a.occupied_row_count(), 1);
        assert!(a.remove("P2").is_none());
    }

    #[test]
    fn test_hints_and_padding() {
        let mut a = sample();
        let hints = a.hints();
        assert_eq!(hints.get("P1"), Some(&0));
        assert_eq!(hints.get("P2"), Some(&1));

        assert!(!a.is_scrollable());
        a.pad_to(3);
        assert_eq!(a.row_count(), 3);
        assert!(a.is_scrollable());
    }
}
