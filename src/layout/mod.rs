//! Pure layout computation.
//!
//! Everything here is synchronous and side-effect free (apart from
//! logging): the same inputs always produce the same outputs.
//!
//! # Components
//!
//! - `RowAssigner`: greedy interval partitioning into display rows
//! - `CoordinateMapper`: date ↔ pixel conversion and header grid cells
//! - `ConflictResolver`: conflict-free placement for a dropped interval
//! - `LayoutStats`: row count, concurrency, and occupancy metrics
//!
//! # References
//!
//! - Kleinberg & Tardos (2006), "Algorithm Design", Ch. 4.1
//! - Golumbic (1980), "Algorithmic Graph Theory and Perfect Graphs"

mod conflict;
mod coords;
mod rows;
mod stats;

pub use conflict::{ConflictResolver, Resolution, ResolutionStrategy};
pub use coords::{BarGeometry, CoordinateMapper, GridCell, TimelineBounds};
pub use rows::RowAssigner;
pub use stats::{interval_concurrency, max_concurrency, LayoutStats};
