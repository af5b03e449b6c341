//! Interval (project bar) model.
//!
//! An interval is a project record reduced to what layout needs: an id,
//! a date range, an optional row hint, and opaque metadata the engine
//! carries through untouched.
//!
//! # Ownership
//! Interval records are owned by the persistence collaborator. The engine
//! holds a transient working copy and reports changes through
//! [`IntervalUpdated`] events.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::DateSpan;

/// Requested rows keyed by interval id.
///
/// Values are raw integers as supplied by callers; negative or
/// out-of-range values are treated as absent by the row assigner.
pub type RowHints = BTreeMap<String, i64>;

/// A date-bounded interval to be laid out on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Unique interval identifier.
    pub id: String,
    /// First day (inclusive).
    pub start: NaiveDate,
    /// Day after the last covered day (exclusive).
    pub end: NaiveDate,
    /// Row hint (last known display row). `None` = compute fresh.
    pub row: Option<i64>,
    /// Domain-specific key-value metadata.
    pub metadata: HashMap<String, String>,
}

impl Interval {
    /// Creates a new interval without a row hint.
    pub fn new(id: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            row: None,
            metadata: HashMap::new(),
        }
    }

    /// Sets the row hint.
    pub fn with_row(mut self, row: i64) -> Self {
        self.row = Some(row);
        self
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The layout span, clamped to the one-day minimum.
    pub fn span(&self) -> DateSpan {
        DateSpan::normalized(self.start, self.end)
    }

    /// Whether `end >= start + 1 day` holds as supplied.
    pub fn is_well_formed(&self) -> bool {
        DateSpan::new(self.start, self.end).is_valid()
    }

    /// Duration in days after clamping.
    pub fn duration_days(&self) -> i64 {
        self.span().days()
    }
}

/// Collects the row hints carried on a set of intervals.
pub fn hints_from_intervals(intervals: &[Interval]) -> RowHints {
    intervals
        .iter()
        .filter_map(|i| i.row.map(|row| (i.id.clone(), row)))
        .collect()
}

/// A concrete row and date range for one interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// Display row (0-indexed).
    pub row: usize,
    /// Date range.
    pub span: DateSpan,
}

impl Placement {
    /// Creates a placement.
    pub fn new(row: usize, span: DateSpan) -> Self {
        Self { row, span }
    }

    /// First day (inclusive).
    #[inline]
    pub fn start(&self) -> NaiveDate {
        self.span.start
    }

    /// Day after the last covered day (exclusive).
    #[inline]
    pub fn end(&self) -> NaiveDate {
        self.span.end
    }
}

/// Event emitted once per successful drag commit.
///
/// Delivered to the persistence collaborator, which either stores it
/// (`confirm_commit`) or rejects it (`reject_commit`), in which case the
/// engine reverts to the pre-gesture placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "interval-updated")]
pub struct IntervalUpdated {
    /// Moved or resized interval.
    pub id: String,
    /// New first day.
    #[serde(rename = "newStart")]
    pub new_start: NaiveDate,
    /// New exclusive end day.
    #[serde(rename = "newEnd")]
    pub new_end: NaiveDate,
    /// New display row.
    #[serde(rename = "newRow")]
    pub new_row: usize,
}

impl IntervalUpdated {
    /// Builds the event for an interval landing on `placement`.
    pub fn new(id: impl Into<String>, placement: Placement) -> Self {
        Self {
            id: id.into(),
            new_start: placement.start(),
            new_end: placement.end(),
            new_row: placement.row,
        }
    }

    /// The committed placement.
    pub fn placement(&self) -> Placement {
        Placement::new(self.new_row, DateSpan::new(self.new_start, self.new_end))
    }
}
