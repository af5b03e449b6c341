//! Engine configuration.
//!
//! All thresholds are in CSS-style pixels of the scrollable content
//! unless noted otherwise. Configuration is serde-loadable so hosts can
//! keep it next to their own settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration rejected by [`EngineConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A pixel measure is zero, negative, or not finite.
    #[error("`{field}` must be a positive finite number, got {value}")]
    NonPositive {
        /// Offending field.
        field: &'static str,
        /// Supplied value.
        value: f64,
    },
    /// A row count limit is zero.
    #[error("`{field}` must be at least 1")]
    ZeroRows {
        /// Offending field.
        field: &'static str,
    },
    /// `max_rows` is below `min_rows`.
    #[error("max_rows ({max_rows}) is below min_rows ({min_rows})")]
    RowLimitBelowMinimum {
        /// Configured minimum.
        min_rows: usize,
        /// Configured maximum.
        max_rows: usize,
    },
}

/// Layout and interaction configuration for a [`TimelineEngine`](crate::engine::TimelineEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Row count floor; assignments are padded with empty rows up to this.
    pub min_rows: usize,
    /// Rows shown without vertical scrolling.
    pub max_visible_rows: usize,
    /// Row count at which conflict resolution stops appending rows.
    pub max_rows: usize,
    /// Vertical pitch of one row.
    pub row_height_px: f64,
    /// Width of the resize grip at each bar edge.
    pub edge_zone_px: f64,
    /// Pointer travel before an armed press becomes a drag.
    pub drag_threshold_px: f64,
    /// Vertical travel before the candidate row follows the pointer.
    pub row_change_threshold_px: f64,
    /// Width of the autoscroll zone at each viewport edge.
    pub autoscroll_margin_px: f64,
    /// Scroll speed per pixel of margin penetration (px/frame).
    pub autoscroll_gain: f64,
    /// Autoscroll speed cap (px/frame).
    pub autoscroll_max_speed_px: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_rows: 5,
            max_visible_rows: 20,
            max_rows: 200,
            row_height_px: 32.0,
            edge_zone_px: 6.0,
            drag_threshold_px: 3.0,
            row_change_threshold_px: 15.0,
            autoscroll_margin_px: 40.0,
            autoscroll_gain: 0.5,
            autoscroll_max_speed_px: 20.0,
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
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

    /// Sets the row limit for conflict resolution.
    pub fn with_max_rows(mut self, rows: usize) -> Self {
        self.max_rows = rows;
        self
    }

    /// Sets the row height.
    pub fn with_row_height(mut self, px: f64) -> Self {
        self.row_height_px = px;
        self
    }

    /// Sets the resize grip width.
    pub fn with_edge_zone(mut self, px: f64) -> Self {
        self.edge_zone_px = px;
        self
    }

    /// Sets the drag start threshold.
    pub fn with_drag_threshold(mut self, px: f64) -> Self {
        self.drag_threshold_px = px;
        self
    }

    /// Sets the vertical row-change threshold.
    pub fn with_row_change_threshold(mut self, px: f64) -> Self {
        self.row_change_threshold_px = px;
        self
    }

    /// Sets the autoscroll margin, gain, and speed cap.
    pub fn with_autoscroll(mut self, margin_px: f64, gain: f64, max_speed_px: f64) -> Self {
        self.autoscroll_margin_px = margin_px;
        self.autoscroll_gain = gain;
        self.autoscroll_max_speed_px = max_speed_px;
        self
    }

    /// Checks that every limit is usable.
    ///
    /// # Errors
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let measures = [
            ("row_height_px", self.row_height_px),
            ("edge_zone_px", self.edge_zone_px),
            ("drag_threshold_px", self.drag_threshold_px),
            ("row_change_threshold_px", self.row_change_threshold_px),
            ("autoscroll_margin_px", self.autoscroll_margin_px),
            ("autoscroll_gain", self.autoscroll_gain),
            ("autoscroll_max_speed_px", self.autoscroll_max_speed_px),
        ];
        for (field, value) in measures {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if self.max_visible_rows == 0 {
            return Err(ConfigError::ZeroRows {
                field: "max_visible_rows",
            });
        }
        if self.max_rows == 0 {
            return Err(ConfigError::ZeroRows { field: "max_rows" });
        }
        if self.max_rows < self.min_rows {
            return Err(ConfigError::RowLimitBelowMinimum {
                min_rows: self.min_rows,
                max_rows: self.max_rows,
            });
        }
        Ok(())
    }
}
