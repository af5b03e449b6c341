//! Date ↔ pixel mapping.
//!
//! A [`CoordinateMapper`] is fixed by an anchor date and a [`ZoomLevel`]:
//! the anchor maps to pixel 0 and every day adds `pixels_per_day`. For
//! calendar-aligned zoom levels (month, quarter, year) the anchor is
//! floored to the start of its calendar period so grid boundaries fall on
//! real calendar boundaries.
//!
//! Positions are whole-day multiples of `pixels_per_day`, so
//! `pixels_to_date(position(d)) == d` holds exactly for every date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{add_days, days_between, DateSpan, Interval, RowAssignment, ZoomLevel};

/// Earliest start and latest end of the laid-out intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBounds {
    /// Earliest start date.
    pub min: NaiveDate,
    /// Latest (exclusive) end date.
    pub max: NaiveDate,
}

impl TimelineBounds {
    /// Creates bounds, swapping the ends if inverted.
    pub fn new(min: NaiveDate, max: NaiveDate) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Bounds of a set of intervals (after one-day clamping).
    ///
    /// Returns `None` for an empty set.
    pub fn from_intervals(intervals: &[Interval]) -> Option<Self> {
        Self::from_spans(intervals.iter().map(Interval::span))
    }

    /// Bounds of everything placed in an assignment.
    pub fn from_assignment(assignment: &RowAssignment) -> Option<Self> {
        Self::from_spans(assignment.rows().iter().flatten().map(|e| e.span))
    }

    fn from_spans(spans: impl IntoIterator<Item = DateSpan>) -> Option<Self> {
        spans.into_iter().fold(None, |acc, span| {
            Some(match acc {
                None => Self::new(span.start, span.end),
                Some(b) => Self::new(b.min.min(span.start), b.max.max(span.end)),
            })
        })
    }

    /// Extends the bounds to cover a span.
    pub fn include(&mut self, span: &DateSpan) {
        self.min = self.min.min(span.start);
        self.max = self.max.max(span.end);
    }
}

/// One header grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    /// Rendered label.
    pub label: String,
    /// First day of the cell.
    pub start: NaiveDate,
    /// Left edge (px).
    pub offset_px: f64,
    /// Width (px), from the actual number of days in the period.
    pub width_px: f64,
}

/// Pixel rectangle of one interval bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarGeometry {
    /// Interval ID.
    pub id: String,
    /// Display row.
    pub row: usize,
    /// Date range drawn.
    pub span: DateSpan,
    /// Left edge (px).
    pub x: f64,
    /// Top edge (px).
    pub y: f64,
    /// Width (px, at least 1).
    pub width: f64,
    /// Height (px).
    pub height: f64,
}

impl BarGeometry {
    /// Right edge (px).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (px).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether a content-space point lies on the bar.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Converts between calendar dates and horizontal pixel offsets.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_timeline::layout::CoordinateMapper;
/// use u_timeline::models::ZoomLevel;
///
/// let anchor = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let mapper = CoordinateMapper::new(anchor, ZoomLevel::Week);
/// let jan_8 = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
///
/// assert_eq!(mapper.position(jan_8), 280.0);
/// assert_eq!(mapper.pixels_to_date(280.0), jan_8);
/// assert_eq!(mapper.pixels_to_date(291.0), jan_8); // rounds to nearest day
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMapper {
    anchor: NaiveDate,
    end: NaiveDate,
    zoom: ZoomLevel,
}

impl CoordinateMapper {
    /// Creates a mapper; the timeline ends at the anchor until extended.
    ///
    /// The anchor is floored to the enclosing calendar period for
    /// calendar-aligned zoom levels.
    pub fn new(anchor: NaiveDate, zoom: ZoomLevel) -> Self {
        let anchor = zoom
            .calendar_unit()
            .map_or(anchor, |unit| unit.floor(anchor));
        Self {
            anchor,
            end: anchor,
            zoom,
        }
    }

    /// Creates a mapper spanning the given bounds.
    pub fn for_bounds(bounds: TimelineBounds, zoom: ZoomLevel) -> Self {
        Self::new(bounds.min, zoom).with_end(bounds.max)
    }

    /// Sets the last (exclusive) date of the timeline.
    pub fn with_end(mut self, end: NaiveDate) -> Self {
        self.end = end.max(self.anchor);
        self
    }

    /// Date at pixel 0.
    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    /// Exclusive end date of the timeline.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Active zoom level.
    pub fn zoom(&self) -> ZoomLevel {
        self.zoom
    }

    /// Pixels per day at the active zoom level.
    #[inline]
    pub fn pixels_per_day(&self) -> f64 {
        self.zoom.pixels_per_day()
    }

    /// Horizontal offset of a date (may be negative before the anchor).
    #[inline]
    pub fn position(&self, date: NaiveDate) -> f64 {
        days_between(self.anchor, date) as f64 * self.pixels_per_day()
    }

    /// Pixel width of `[start, end)`, never below one pixel.
    #[inline]
    pub fn width(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        (days_between(start, end) as f64 * self.pixels_per_day()).max(1.0)
    }

    /// Inverse of [`position`](Self::position), rounded to the nearest day.
    pub fn pixels_to_date(&self, pixels: f64) -> NaiveDate {
        let days = (pixels / self.pixels_per_day()).round();
        // NaN casts to 0; infinities saturate.
        add_days(self.anchor, days as i64)
    }

    /// Number of whole days a horizontal pixel delta represents.
    pub fn pixels_to_days(&self, delta_px: f64) -> i64 {
        (delta_px / self.pixels_per_day()).round() as i64
    }

    /// Total width of the scrollable timeline.
    pub fn total_width(&self) -> f64 {
        self.position(self.end).max(0.0)
    }

    /// Bar rectangle for an interval span on a row.
    pub fn bar(&self, id: impl Into<String>, span: DateSpan, row: usize, row_height: f64) -> BarGeometry {
        BarGeometry {
            id: id.into(),
            row,
            span,
            x: self.position(span.start),
            y: row as f64 * row_height,
            width: self.width(span.start, span.end),
            height: row_height,
        }
    }

    /// Bar rectangles for every interval in an assignment.
    pub fn bars(&self, assignment: &RowAssignment, row_height: f64) -> Vec<BarGeometry> {
        assignment
            .rows()
            .iter()
            .enumerate()
            .flat_map(|(row, entries)| {
                entries
                    .iter()
                    .map(move |e| self.bar(e.id.clone(), e.span, row, row_height))
            })
            .collect()
    }

    /// Header grid cells covering `[anchor, end)`.
    ///
    /// Calendar-aligned levels produce one cell per calendar period with
    /// its actual length (28–31 days for months); other levels step by
    /// the nominal grid interval.
    pub fn grid_labels(&self) -> Vec<GridCell> {
        let format = self.zoom.label_format();
        let mut cells = Vec::new();
        let mut cell_start = self.anchor;

        while cell_start < self.end {
            let next = match self.zoom.calendar_unit() {
                Some(unit) => unit.next(cell_start),
                None => add_days(cell_start, self.zoom.grid_interval_days()),
            };
            if next <= cell_start {
                break;
            }
            let offset_px = self.position(cell_start);
            cells.push(GridCell {
                label: format.render(cell_start),
                start: cell_start,
                offset_px,
                width_px: self.position(next) - offset_px,
            });
            cell_start = next;
        }
        cells
    }
}
