//! Timeline domain models.
//!
//! Provides the core data types exchanged between the layout engine and
//! its collaborators: the intervals to lay out, their row assignment,
//! zoom configuration, and the commit event produced by drag gestures.
//!
//! # Domain Mappings
//!
//! | u-timeline | Project Tracker | Resource Planner | Release Calendar |
//! |------------|-----------------|------------------|------------------|
//! | Interval | Project | Booking | Release Train |
//! | Row | Swimlane | Resource Lane | Track |
//! | RowAssignment | Portfolio View | Booking Grid | Release Board |
//! | ZoomLevel | Week/Month/Quarter View | Day/Week View | Quarter/Year View |

mod assignment;
mod interval;
mod span;
mod zoom;

pub use assignment::{RowAssignment, RowEntry};
pub use interval::{hints_from_intervals, Interval, IntervalUpdated, Placement, RowHints};
pub use span::{add_days, days_between, DateSpan};
pub use zoom::{CalendarUnit, LabelFormat, ZoomLevel};
