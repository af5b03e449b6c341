//! Greedy row assignment (interval partitioning).
//!
//! # Algorithm
//!
//! 1. Sort intervals by start ascending, then duration descending, then
//!    id ascending (a total order, so output is deterministic).
//! 2. **Hint pass**: place each interval carrying a valid hint into its
//!    hinted row if it overlaps nothing already there; otherwise defer it.
//! 3. **Greedy pass**: place each remaining interval into the first row
//!    whose latest end is at or before the interval's start; append a new
//!    row if none qualifies.
//! 4. Pad to the configured minimum row count.
//!
//! # Incremental placement
//!
//! [`RowAssigner::insert_pinned`] runs the same two passes for a single
//! interval against an existing assignment whose entries stay put. With
//! pinned neighbours a row's latest end says nothing about the gaps before
//! it, so the greedy pass checks each row for actual overlap instead.
//!
//! Without hints this is the classical first-fit interval partitioning
//! algorithm and uses exactly as many rows as the largest set of
//! mutually overlapping intervals (interval graphs are perfect, so the
//! chromatic number equals the clique number).
//!
//! # Complexity
//! O(n log n + n * r) where n=intervals, r=rows.
//!
//! # References
//! - Kleinberg & Tardos (2006), "Algorithm Design", Ch. 4.1: Interval Partitioning
//! - Golumbic (1980), "Algorithmic Graph Theory and Perfect Graphs", Ch. 8

use chrono::NaiveDate;
use log::{debug, warn};

use crate::config::EngineConfig;
use crate::models::{DateSpan, Interval, Placement, RowAssignment, RowEntry, RowHints};

/// Deterministic greedy row assigner.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_timeline::layout::RowAssigner;
/// use u_timeline::models::Interval;
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
/// let intervals = vec![
///     Interval::new("P1", d(1, 1), d(1, 10)),
///     Interval::new("P2", d(1, 5), d(1, 15)),
///     Interval::new("P3", d(1, 11), d(1, 20)),
/// ];
///
/// let assignment = RowAssigner::new().assign(&intervals, None);
/// assert_eq!(assignment.row_ids(0), vec!["P1", "P3"]);
/// assert_eq!(assignment.row_ids(1), vec!["P2"]);
/// ```
#[derive(Debug, Clone)]
pub struct RowAssigner {
    min_rows: usize,
    max_visible_rows: usize,
}

impl Default for RowAssigner {
    fn default() -> Self {
        Self::new()
    }
}

impl RowAssigner {
    /// Creates an assigner without padding and the default visible threshold.
    pub fn new() -> Self {
        Self {
            min_rows: 0,
            max_visible_rows: EngineConfig::default().max_visible_rows,
        }
    }

    /// Creates an assigner using the row limits of an engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            min_rows: config.min_rows,
            max_visible_rows: config.max_visible_rows,
        }
    }

    /// Sets the row count floor.
    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows;
        self
    }

    /// Sets the visible row threshold.
    pub fn with_max_visible_rows(mut self, rows: usize) -> Self {
        self.max_visible_rows = rows;
        self
    }

    /// Assigns every interval to a row.
    ///
    /// Never fails: malformed intervals are clamped to one day and
    /// malformed hints (negative or out of range) are ignored.
    pub fn assign(&self, intervals: &[Interval], hints: Option<&RowHints>) -> RowAssignment {
        let spans: Vec<DateSpan> = intervals
            .iter()
            .map(|iv| {
                if !iv.is_well_formed() {
                    warn!(
                        "interval '{}' ends {} before start {} + 1 day; clamped to one day",
                        iv.id, iv.end, iv.start
                    );
                }
                iv.span()
            })
            .collect();

        let order = sort_order(intervals, &spans);
        let hint_limit = intervals.len().max(self.min_rows);

        let mut assignment = RowAssignment::new(self.max_visible_rows);
        let mut row_ends: Vec<Option<NaiveDate>> = Vec::new();
        let mut deferred = Vec::with_capacity(order.len());

        // Hint pass
        for &idx in &order {
            let iv = &intervals[idx];
            let span = spans[idx];
            let Some(row) = hints.and_then(|h| valid_hint(h, &iv.id, hint_limit)) else {
                deferred.push(idx);
                continue;
            };
            if fits(&assignment, row, &span) {
                place(&mut assignment, &mut row_ends, row, &iv.id, span);
            } else {
                debug!("hint row {row} for '{}' is occupied; deferring", iv.id);
                deferred.push(idx);
            }
        }

        // Greedy pass
        for idx in deferred {
            let span = spans[idx];
            let row = row_ends
                .iter()
                .position(|end| end.map_or(true, |end| end <= span.start))
                .unwrap_or(row_ends.len());
            place(&mut assignment, &mut row_ends, row, &intervals[idx].id, span);
        }

        assignment.pad_to(self.min_rows);
        debug!(
            "assigned {} intervals to {} rows ({} occupied, scrollable={})",
            intervals.len(),
            assignment.row_count(),
            assignment.occupied_row_count(),
            assignment.is_scrollable()
        );
        assignment
    }

    /// Places one interval into `assignment` without moving anything else.
    ///
    /// The hint is honoured when it names an existing row (or the next new
    /// one) and that row is free over `span`; otherwise the interval goes to
    /// the first free row, or a new row after the last.
    pub fn insert_pinned(
        &self,
        assignment: &mut RowAssignment,
        id: &str,
        span: DateSpan,
        hint: Option<usize>,
    ) -> Placement {
        let row_count = assignment.row_count();
        let hinted = hint.filter(|&row| row <= row_count && assignment.is_free(row, &span, id));
        if hint.is_some() && hinted.is_none() {
            debug!("hint row for '{id}' unavailable; placing greedily");
        }
        let row = hinted
            .or_else(|| (0..row_count).find(|&row| assignment.is_free(row, &span, id)))
            .unwrap_or(row_count);
        assignment.insert(row, RowEntry::new(id, span));
        Placement::new(row, span)
    }
}

/// Start ascending, duration descending, id ascending.
fn sort_order(intervals: &[Interval], spans: &[DateSpan]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..intervals.len()).collect();
    order.sort_by(|&a, &b| {
        spans[a]
            .start
            .cmp(&spans[b].start)
            .then_with(|| spans[b].days().cmp(&spans[a].days()))
            .then_with(|| intervals[a].id.cmp(&intervals[b].id))
    });
    order
}

fn valid_hint(hints: &RowHints, id: &str, limit: usize) -> Option<usize> {
    let raw = *hints.get(id)?;
    match usize::try_from(raw) {
        Ok(row) if row < limit => Some(row),
        _ => {
            debug!("ignoring malformed row hint {raw} for '{id}'");
            None
        }
    }
}

fn fits(assignment: &RowAssignment, row: usize, span: &DateSpan) -> bool {
    assignment
        .row(row)
        .map_or(true, |entries| entries.iter().all(|e| !e.span.overlaps(span)))
}

fn place(
    assignment: &mut RowAssignment,
    row_ends: &mut Vec<Option<NaiveDate>>,
    row: usize,
    id: &str,
    span: DateSpan,
) {
    if row_ends.len() <= row {
        row_ends.resize(row + 1, None);
    }
    row_ends[row] = Some(row_ends[row].map_or(span.end, |end| end.max(span.end)));
    assignment.insert(row, RowEntry::new(id, span));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn iv(id: &str, from: (u32, u32), to: (u32, u32)) -> Interval {
        Interval::new(id, d(from.0, from.1), d(to.0, to.1))
    }

    #[test]
    fn test_overlapping_get_distinct_rows() {
        let ivs = vec![iv("P1", (1, 1), (1, 10)), iv("P2", (1, 5), (1, 15))];
        let a = RowAssigner::new().assign(&ivs, None);
        assert_eq!(a.row_count(), 2);
        assert_ne!(a.row_of("P1"), a.row_of("P2"));
    }

    #[test]
    fn test_sequential_share_row() {
        let ivs = vec![iv("P1", (1, 1), (1, 10)), iv("P3", (1, 11), (1, 20))];
        let a = RowAssigner::new().assign(&ivs, None);
        assert_eq!(a.row_of("P1"), Some(0));
        assert_eq!(a.row_of("P3"), Some(0));
    }

    #[test]
    fn test_touching_intervals_share_row() {
        let ivs = vec![iv("A", (1, 1), (1, 10)), iv("B", (1, 10), (1, 12))];
        let a = RowAssigner::new().assign(&ivs, None);
        assert_eq!(a.row_count(), 1);
    }

    #[test]
    fn test_tie_break_longest_first_then_id() {
        let ivs = vec![
            iv("b", (1, 1), (1, 3)),
            iv("a", (1, 1), (1, 3)),
            iv("long", (1, 1), (1, 30)),
        ];
        let a = RowAssigner::new().assign(&ivs, None);
        assert_eq!(a.row_ids(0), vec!["long"]);
        assert_eq!(a.row_ids(1), vec!["a"]);
        assert_eq!(a.row_ids(2), vec!["b"]);
    }

    #[test]
    fn test_insert_pinned_fills_gap_without_moving_others() {
        let ivs = vec![
            iv("A", (1, 1), (1, 5)),
            iv("B", (1, 12), (1, 20)),
            iv("C", (1, 1), (1, 30)),
        ];
        let assigner = RowAssigner::new();
        let mut a = assigner.assign(&ivs, None);
        let before = a.clone();

        // Row 1 holds A and B; X fits the gap even though B ends after it.
        assert_eq!(a.row_ids(1), vec!["A", "B"]);
        let p = assigner.insert_pinned(&mut a, "X", DateSpan::new(d(1, 5), d(1, 12)), None);
        assert_eq!(p.row, 1);
        for id in ["A", "B", "C"] {
            assert_eq!(a.row_of(id), before.row_of(id));
        }

        // Occupied hint falls through to a new row.
        let p = assigner.insert_pinned(&mut a, "Y", DateSpan::new(d(1, 2), d(1, 3)), Some(1));
        assert_eq!(p.row, 2);

        // A hint past the next new row is ignored.
        let p = assigner.insert_pinned(&mut a, "Z", DateSpan::new(d(2, 1), d(2, 3)), Some(9));
        assert_eq!(p.row, 0);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut ivs = vec![
            iv("A", (1, 1), (1, 9)),
            iv("B", (1, 3), (1, 6)),
            iv("C", (1, 6), (1, 12)),
            iv("D", (1, 9), (1, 11)),
        ];
        let first = RowAssigner::new().assign(&ivs, None);
        ivs.reverse();
        let second = RowAssigner::new().assign(&ivs, None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_hint_is_honoured_when_free() {
        let ivs = vec![iv("P1", (1, 1), (1, 10)).with_row(3)];
        let mut hints = RowHints::new();
        hints.insert("P1".into(), 3);
        let a = RowAssigner::new().assign(&ivs, Some(&hints));
        assert_eq!(a.row_of("P1"), Some(0)); // limit = max(len=1, min_rows=0) → hint 3 out of range

        let a = RowAssigner::new().with_min_rows(5).assign(&ivs, Some(&hints));
        assert_eq!(a.row_of("P1"), Some(3));
        assert_eq!(a.row_count(), 5);
    }

    #[test]
    fn test_conflicting_hint_is_deferred() {
        let ivs = vec![iv("A", (1, 1), (1, 10)), iv("B", (1, 5), (1, 15))];
        let mut hints = RowHints::new();
        hints.insert("A".into(), 0);
        hints.insert("B".into(), 0);
        let a = RowAssigner::new().assign(&ivs, Some(&hints));
        assert_eq!(a.row_of("A"), Some(0));
        assert_eq!(a.row_of("B"), Some(1));
    }

    #[test]
    fn test_malformed_hints_are_ignored() {
        let ivs = vec![iv("A", (1, 1), (1, 10)), iv("B", (2, 1), (2, 10))];
        let mut hints = RowHints::new();
        hints.insert("A".into(), -1);
        hints.insert("B".into(), 99);
        let a = RowAssigner::new().assign(&ivs, Some(&hints));
        assert_eq!(a.row_of("A"), Some(0));
        assert_eq!(a.row_of("B"), Some(0));
    }

    #[test]
    fn test_inverted_interval_is_clamped() {
        let ivs = vec![iv("bad", (1, 10), (1, 2)), iv("next", (1, 11), (1, 12))];
        let a = RowAssigner::new().assign(&ivs, None);
        let p = a.placement_of("bad").unwrap();
        assert_eq!(p.span.days(), 1);
        assert_eq!(a.row_of("next"), Some(0));
    }

    #[test]
    fn test_padding_and_scroll_flag() {
        let ivs: Vec<Interval> = (0..4)
            .map(|i| iv(&format!("P{i}"), (1, 1), (1, 10)))
            .collect();
        let a = RowAssigner::new()
            .with_min_rows(6)
            .with_max_visible_rows(3)
            .assign(&ivs, None);
        assert_eq!(a.row_count(), 6);
        assert_eq!(a.occupied_row_count(), 4);
        assert!(a.is_scrollable());
    }

    #[test]
    fn test_reassign_with_own_hints_is_stable() {
        let ivs = vec![
            iv("A", (1, 1), (1, 20)),
            iv("B", (1, 2), (1, 5)),
            iv("C", (1, 5), (1, 9)),
            iv("D", (1, 3), (1, 25)),
            iv("E", (1, 21), (1, 28)),
        ];
        let assigner = RowAssigner::new().with_min_rows(2);
        let first = assigner.assign(&ivs, None);
        let second = assigner.assign(&ivs, Some(&first.hints()));
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input() {
        let a = RowAssigner::new().with_min_rows(3).assign(&[], None);
        assert_eq!(a.row_count(), 3);
        assert_eq!(a.interval_count(), 0);
    }
}
