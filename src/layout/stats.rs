//! Layout quality metrics.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Row count | Rows including empty padding |
//! | Occupied rows | Rows holding at least one interval |
//! | Max concurrency | Largest number of intervals covering one day |
//! | Row occupancy | Busy days in a row / days in the timeline span |
//!
//! For an assignment produced without hints, `occupied_rows` equals
//! `max_concurrency` (the clique number of the interval graph).
//!
//! # Reference
//! Golumbic (1980), "Algorithmic Graph Theory and Perfect Graphs", Ch. 8

use crate::layout::TimelineBounds;
use crate::models::{days_between, DateSpan, Interval, RowAssignment};

/// Layout indicators for one assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutStats {
    /// Rows including empty ones.
    pub row_count: usize,
    /// Rows holding at least one interval.
    pub occupied_rows: usize,
    /// Placed intervals.
    pub interval_count: usize,
    /// Largest number of simultaneously overlapping intervals.
    pub max_concurrency: usize,
    /// Per-row busy fraction of the timeline span (0.0..1.0).
    pub occupancy_by_row: Vec<f64>,
    /// Mean occupancy over occupied rows (0.0..1.0).
    pub avg_occupancy: f64,
}

impl LayoutStats {
    /// Computes statistics for an assignment.
    pub fn calculate(assignment: &RowAssignment) -> Self {
        let spans: Vec<DateSpan> = assignment.rows().iter().flatten().map(|e| e.span).collect();
        let total_days = TimelineBounds::from_assignment(assignment)
            .map(|b| days_between(b.min, b.max))
            .unwrap_or(0);

        let occupancy_by_row: Vec<f64> = assignment
            .rows()
            .iter()
            .map(|entries| {
                if total_days <= 0 {
                    return 0.0;
                }
                let busy: i64 = entries.iter().map(|e| e.span.days()).sum();
                busy as f64 / total_days as f64
            })
            .collect();

        let occupied_rows = assignment.occupied_row_count();
        let avg_occupancy = if occupied_rows > 0 {
            occupancy_by_row.iter().sum::<f64>() / occupied_rows as f64
        } else {
            0.0
        };

        Self {
            row_count: assignment.row_count(),
            occupied_rows,
            interval_count: spans.len(),
            max_concurrency: max_concurrency(spans),
            occupancy_by_row,
            avg_occupancy,
        }
    }

    /// Whether the occupied rows are the theoretical minimum.
    pub fn is_minimal(&self) -> bool {
        self.occupied_rows == self.max_concurrency
    }
}

/// Largest number of spans covering a single day (sweep line).
///
/// Touching spans (`a.end == b.start`) do not count as concurrent.
pub fn max_concurrency(spans: impl IntoIterator<Item = DateSpan>) -> usize {
    let mut events: Vec<(chrono::NaiveDate, i32)> = Vec::new();
    for span in spans {
        events.push((span.start, 1));
        events.push((span.end, -1));
    }
    // Ends sort before starts on the same day.
    events.sort();

    let mut current: i64 = 0;
    let mut peak: i64 = 0;
    for (_, delta) in events {
        current += i64::from(delta);
        peak = peak.max(current);
    }
    peak as usize
}

/// Max concurrency of raw intervals (after one-day clamping).
pub fn interval_concurrency(intervals: &[Interval]) -> usize {
    max_concurrency(intervals.iter().map(Interval::span))
}
