//! Timeline layout and collision-resolution engine.
//!
//! Lays date-bounded intervals out on non-overlapping display rows, maps
//! calendar dates to pixels under discrete zoom levels, and resolves
//! conflicts while the user drags or resizes an interval, so the displayed
//! layout never shows two overlapping intervals on one row.
//!
//! The crate performs no I/O and draws nothing: it consumes an in-memory
//! interval list and produces row assignments, pixel geometry, and commit
//! events for a renderer and a store to act on.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Interval`, `DateSpan`, `Placement`,
//!   `RowAssignment`, `ZoomLevel`, `IntervalUpdated`
//! - **`layout`**: Pure computation: `RowAssigner`, `CoordinateMapper`,
//!   `ConflictResolver`, `LayoutStats`
//! - **`interaction`**: `DragController`, `AutoScroller`, `ScrollSynchronizer`
//! - **`engine`**: `TimelineEngine`, the explicit per-view instance tying it together
//! - **`config`**: `EngineConfig` thresholds and limits
//! - **`validation`**: Input integrity checks and the no-overlap audit
//!
//! # Logging
//!
//! Diagnostics go through the [`log`] facade; the host installs a logger.
//!
//! # References
//!
//! - Kleinberg & Tardos (2006), "Algorithm Design", Ch. 4.1 (Interval Partitioning)
//! - Golumbic (1980), "Algorithmic Graph Theory and Perfect Graphs", Ch. 8
//! - Cormen et al. (2009), "Introduction to Algorithms", Ch. 16.1

pub mod config;
pub mod engine;
pub mod interaction;
pub mod layout;
pub mod models;
pub mod validation;
