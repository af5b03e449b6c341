//! Discrete zoom levels.
//!
//! A zoom level fixes the horizontal density of the timeline: how many
//! pixels one day occupies, how wide a grid cell nominally is, and how
//! header labels are rendered. Switching levels recomputes geometry only;
//! interval data is never touched.
//!
//! | Level | px/day | Grid | Calendar-aligned | Label |
//! |-------|--------|------|------------------|-------|
//! | Week | 40 | 7 days | no | `01 Jan` |
//! | Fortnight | 20 | 14 days | no | `01 Jan` |
//! | Month | 8 | calendar month | yes | `Jan 2024` |
//! | Quarter | 4 | calendar quarter | yes | `Q1 2024` |
//! | Year | 1 | calendar year | yes | `2024` |

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::span::add_days;

/// Zoom level selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoomLevel {
    /// Day-level detail, weekly grid.
    Week,
    /// Two-week grid.
    Fortnight,
    /// Monthly grid (default).
    #[default]
    Month,
    /// Quarterly grid.
    Quarter,
    /// Yearly grid.
    Year,
}

impl ZoomLevel {
    /// All levels, most detailed first.
    pub const ALL: [ZoomLevel; 5] = [
        ZoomLevel::Week,
        ZoomLevel::Fortnight,
        ZoomLevel::Month,
        ZoomLevel::Quarter,
        ZoomLevel::Year,
    ];

    /// Horizontal pixels per calendar day.
    pub fn pixels_per_day(self) -> f64 {
        match self {
            ZoomLevel::Week => 40.0,
            ZoomLevel::Fortnight => 20.0,
            ZoomLevel::Month => 8.0,
            ZoomLevel::Quarter => 4.0,
            ZoomLevel::Year => 1.0,
        }
    }

    /// Nominal grid cell length in days.
    ///
    /// Calendar-aligned levels use the actual length of each period
    /// when building grid cells; this is only the nominal value.
    pub fn grid_interval_days(self) -> i64 {
        match self {
            ZoomLevel::Week => 7,
            ZoomLevel::Fortnight => 14,
            ZoomLevel::Month => 30,
            ZoomLevel::Quarter => 91,
            ZoomLevel::Year => 365,
        }
    }

    /// Header label format.
    pub fn label_format(self) -> LabelFormat {
        match self {
            ZoomLevel::Week | ZoomLevel::Fortnight => LabelFormat::DayMonth,
            ZoomLevel::Month => LabelFormat::MonthYear,
            ZoomLevel::Quarter => LabelFormat::QuarterYear,
            ZoomLevel::Year => LabelFormat::Year,
        }
    }

    /// Calendar unit grid cells align to, if any.
    pub fn calendar_unit(self) -> Option<CalendarUnit> {
        match self {
            ZoomLevel::Week | ZoomLevel::Fortnight => None,
            ZoomLevel::Month => Some(CalendarUnit::Month),
            ZoomLevel::Quarter => Some(CalendarUnit::Quarter),
            ZoomLevel::Year => Some(CalendarUnit::Year),
        }
    }

    /// The next more detailed level (saturating).
    pub fn zoom_in(self) -> Self {
        match self {
            ZoomLevel::Week | ZoomLevel::Fortnight => ZoomLevel::Week,
            ZoomLevel::Month => ZoomLevel::Fortnight,
            ZoomLevel::Quarter => ZoomLevel::Month,
            ZoomLevel::Year => ZoomLevel::Quarter,
        }
    }

    /// The next coarser level (saturating).
    pub fn zoom_out(self) -> Self {
        match self {
            ZoomLevel::Week => ZoomLevel::Fortnight,
            ZoomLevel::Fortnight => ZoomLevel::Month,
            ZoomLevel::Month => ZoomLevel::Quarter,
            ZoomLevel::Quarter | ZoomLevel::Year => ZoomLevel::Year,
        }
    }
}

/// Calendar period used for aligned grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalendarUnit {
    /// Calendar month.
    Month,
    /// Calendar quarter (Jan, Apr, Jul, Oct).
    Quarter,
    /// Calendar year.
    Year,
}

impl CalendarUnit {
    fn months(self) -> u32 {
        match self {
            CalendarUnit::Month => 1,
            CalendarUnit::Quarter => 3,
            CalendarUnit::Year => 12,
        }
    }

    /// Start of the period containing `date`.
    pub fn floor(self, date: NaiveDate) -> NaiveDate {
        let month = match self {
            CalendarUnit::Month => date.month(),
            CalendarUnit::Quarter => (date.month0() / 3) * 3 + 1,
            CalendarUnit::Year => 1,
        };
        NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
    }

    /// Start of the period following the one containing `date`.
    pub fn next(self, date: NaiveDate) -> NaiveDate {
        let floored = self.floor(date);
        floored
            .checked_add_months(Months::new(self.months()))
            .unwrap_or_else(|| add_days(floored, 31 * i64::from(self.months())))
    }
}

/// How grid header labels are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelFormat {
    /// `01 Jan`
    DayMonth,
    /// `Jan 2024`
    MonthYear,
    /// `Q1 2024`
    QuarterYear,
    /// `2024`
    Year,
}

impl LabelFormat {
    /// Renders the label for a cell starting at `date`.
    pub fn render(self, date: NaiveDate) -> String {
        match self {
            LabelFormat::DayMonth => date.format("%d %b").to_string(),
            LabelFormat::MonthYear => date.format("%b %Y").to_string(),
            LabelFormat::QuarterYear => format!("Q{} {}", date.month0() / 3 + 1, date.year()),
            LabelFormat::Year => date.format("%Y").to_string(),
        }
    }
}
