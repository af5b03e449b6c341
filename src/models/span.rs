//! Day-granular date ranges.
//!
//! # Time Model
//! All ranges are half-open `[start, end)` over calendar days. A span whose
//! `end` equals the next day's date covers exactly one day. The minimum
//! legal duration is one day; [`DateSpan::normalized`] clamps anything
//! shorter.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Shifts a date by a signed number of days, saturating at chrono's
/// representable range instead of panicking.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let magnitude = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    };
    shifted.unwrap_or(if days >= 0 {
        NaiveDate::MAX
    } else {
        NaiveDate::MIN
    })
}

/// Signed number of whole days from `from` to `to`.
#[inline]
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// A date range `[start, end)`.
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateSpan {
    /// First covered day (inclusive).
    pub start: NaiveDate,
    /// First day after the range (exclusive).
    pub end: NaiveDate,
}

impl DateSpan {
    /// Creates a span as given, without correcting inverted bounds.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Creates a span, clamping `end` to at least `start + 1 day`.
    pub fn normalized(start: NaiveDate, end: NaiveDate) -> Self {
        let min_end = add_days(start, 1);
        Self {
            start,
            end: end.max(min_end),
        }
    }

    /// Creates a span of `days` days beginning at `start` (at least one).
    pub fn with_duration(start: NaiveDate, days: i64) -> Self {
        Self::normalized(start, add_days(start, days))
    }

    /// Duration in days.
    #[inline]
    pub fn days(&self) -> i64 {
        days_between(self.start, self.end)
    }

    /// Whether the span satisfies the one-day minimum.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.days() >= 1
    }

    /// Whether a date falls within this span.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// Whether two spans overlap.
    ///
    /// Touching spans (`a.end == b.start`) do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The same span moved by `days` days.
    pub fn shifted(&self, days: i64) -> Self {
        Self {
            start: add_days(self.start, days),
            end: add_days(self.end, days),
        }
    }

    /// The same duration, re-anchored at `start`.
    pub fn starting_at(&self, start: NaiveDate) -> Self {
        Self::with_duration(start, self.days())
    }

    /// The smallest span covering both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}
