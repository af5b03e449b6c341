//! Drop-time conflict resolution.
//!
//! Given the candidate placement a drag gesture ends on, returns a
//! placement that overlaps nothing. Strategies are tried in a fixed
//! order and the first success wins:
//!
//! 1. **Direct fit**: the candidate row has no conflicting interval.
//! 2. **Snap-to-gap**: exactly one neighbouring interval conflicts and a
//!    gap bordering it (before or after) can hold the full duration; the
//!    candidate slides (duration preserved) to the nearest edge of that
//!    gap. A candidate overlapping two neighbours is wider than the gap
//!    between them, so it never snaps.
//! 3. **Nearest row**: try `row-1, row+1, row-2, row+2, ...` within the
//!    current row count for a free row at the candidate dates; if none,
//!    append a row while below the row limit.
//! 4. **Fallback**: revert to the pre-gesture origin.
//!
//! The resolver is a pure, total function: identical inputs always give
//! identical outputs and no input makes it panic.

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::models::{add_days, days_between, DateSpan, Placement, RowAssignment, RowEntry};

/// Which strategy produced a [`Resolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionStrategy {
    /// Candidate accepted unchanged.
    DirectFit,
    /// Dates shifted into an adjacent gap on the candidate row.
    SnapToGap,
    /// Candidate dates placed on the nearest free existing row.
    NearestRow,
    /// Candidate dates placed on a newly appended row.
    NewRow,
    /// Reverted to the origin placement.
    Fallback,
}

/// Outcome of conflict resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Conflict-free placement.
    pub placement: Placement,
    /// Strategy that produced it.
    pub strategy: ResolutionStrategy,
}

impl Resolution {
    fn new(placement: Placement, strategy: ResolutionStrategy) -> Self {
        Self {
            placement,
            strategy,
        }
    }
}

/// Resolves candidate placements against a row assignment.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_timeline::layout::{ConflictResolver, ResolutionStrategy, RowAssigner};
/// use u_timeline::models::{DateSpan, Interval, Placement};
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
/// let assignment = RowAssigner::new().assign(
///     &[Interval::new("P1", d(1), d(10)), Interval::new("P3", d(11), d(20))],
///     None,
/// );
/// let origin = assignment.placement_of("P1").unwrap();
/// let candidate = Placement::new(0, DateSpan::new(d(5), d(14)));
///
/// let resolution = ConflictResolver::new(10).resolve("P1", candidate, &assignment, origin);
/// assert_eq!(resolution.strategy, ResolutionStrategy::SnapToGap);
/// assert_eq!(resolution.placement.end(), d(11));
/// ```
#[derive(Debug, Clone)]
pub struct ConflictResolver {
    max_rows: usize,
}

impl ConflictResolver {
    /// Creates a resolver that may grow the layout up to `max_rows` rows.
    pub fn new(max_rows: usize) -> Self {
        Self { max_rows }
    }

    /// Creates a resolver using the row limit of an engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.max_rows)
    }

    /// Row limit for appending.
    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Resolves `candidate` for the interval `moving_id`.
    ///
    /// The moving interval's own entry in `assignment` never counts as a
    /// conflict. A candidate span shorter than one day is clamped first.
    pub fn resolve(
        &self,
        moving_id: &str,
        candidate: Placement,
        assignment: &RowAssignment,
        origin: Placement,
    ) -> Resolution {
        let span = DateSpan::normalized(candidate.span.start, candidate.span.end);
        let row_count = assignment.row_count();

        let resolution = self
            .direct_fit(moving_id, candidate.row, span, assignment)
            .or_else(|| {
                let row = candidate.row.min(row_count.saturating_sub(1));
                self.snap_to_gap(moving_id, row, span, assignment)
                    .or_else(|| self.nearest_row(moving_id, row, span, assignment))
            })
            .unwrap_or_else(|| Resolution::new(origin, ResolutionStrategy::Fallback));

        debug!(
            "resolved '{moving_id}' candidate row {} [{}, {}) via {:?} -> row {} [{}, {})",
            candidate.row,
            span.start,
            span.end,
            resolution.strategy,
            resolution.placement.row,
            resolution.placement.start(),
            resolution.placement.end()
        );
        resolution
    }

    fn direct_fit(
        &self,
        moving_id: &str,
        row: usize,
        span: DateSpan,
        assignment: &RowAssignment,
    ) -> Option<Resolution> {
        let row_count = assignment.row_count();
        if row >= row_count {
            // Past the last row: lands on a fresh row if one may be added.
            return (row_count < self.max_rows).then(|| {
                Resolution::new(Placement::new(row_count, span), ResolutionStrategy::DirectFit)
            });
        }
        assignment
            .is_free(row, &span, moving_id)
            .then(|| Resolution::new(Placement::new(row, span), ResolutionStrategy::DirectFit))
    }

    fn snap_to_gap(
        &self,
        moving_id: &str,
        row: usize,
        span: DateSpan,
        assignment: &RowAssignment,
    ) -> Option<Resolution> {
        let others: Vec<&RowEntry> = assignment
            .row(row)?
            .iter()
            .filter(|e| e.id != moving_id)
            .collect();
        let conflicts: Vec<usize> = others
            .iter()
            .enumerate()
            .filter(|(_, e)| e.span.overlaps(&span))
            .map(|(i, _)| i)
            .collect();

        // Gap `i` lies between others[i - 1] and others[i].
        let &[neighbour] = conflicts.as_slice() else {
            return None;
        };

        let duration = span.days();
        let mut best: Option<(i64, DateSpan)> = None;
        for gap in [neighbour, neighbour + 1] {
            let lo = gap.checked_sub(1).map(|i| others[i].span.end);
            let hi = others.get(gap).map(|e| e.span.start);
            let Some(start) = fit_in_gap(span.start, duration, lo, hi) else {
                continue;
            };
            let shift = days_between(span.start, start).abs();
            if best.map_or(true, |(best_shift, _)| shift < best_shift) {
                best = Some((shift, DateSpan::with_duration(start, duration)));
            }
        }

        best.filter(|(_, snapped)| assignment.is_free(row, snapped, moving_id))
            .map(|(_, snapped)| {
                Resolution::new(Placement::new(row, snapped), ResolutionStrategy::SnapToGap)
            })
    }

    fn nearest_row(
        &self,
        moving_id: &str,
        row: usize,
        span: DateSpan,
        assignment: &RowAssignment,
    ) -> Option<Resolution> {
        let row_count = assignment.row_count();
        for distance in 1..=row_count {
            let neighbours = [row.checked_sub(distance), row.checked_add(distance)];
            for candidate_row in neighbours.into_iter().flatten() {
                if candidate_row < row_count && assignment.is_free(candidate_row, &span, moving_id) {
                    return Some(Resolution::new(
                        Placement::new(candidate_row, span),
                        ResolutionStrategy::NearestRow,
                    ));
                }
            }
        }
        (row_count < self.max_rows)
            .then(|| Resolution::new(Placement::new(row_count, span), ResolutionStrategy::NewRow))
    }
}

/// Start date closest to `desired` that fits `duration` days in `[lo, hi)`.
///
/// Unbounded sides are `None`. Returns `None` if the gap is too narrow.
fn fit_in_gap(
    desired: NaiveDate,
    duration: i64,
    lo: Option<NaiveDate>,
    hi: Option<NaiveDate>,
) -> Option<NaiveDate> {
    if let (Some(lo), Some(hi)) = (lo, hi) {
        if days_between(lo, hi) < duration {
            return None;
        }
    }
    let mut start = desired;
    if let Some(hi) = hi {
        start = start.min(add_days(hi, -duration));
    }
    if let Some(lo) = lo {
        start = start.max(lo);
    }
    Some(start)
}
