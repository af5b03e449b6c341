//! Edge autoscroll while dragging.
//!
//! While a drag is in progress and the pointer sits inside a margin at
//! either horizontal edge of the viewport, each animation frame advances
//! the scroll offset by a speed proportional to how deep the pointer is
//! in the margin, capped at a maximum. The loop stops itself when the
//! pointer leaves the margin or the gesture ends.
//!
//! There is never more than one loop: [`AutoScroller::begin`] starts a new
//! generation and silently retires whatever the previous gesture left.

use crate::config::EngineConfig;

/// Frame-driven edge autoscroll.
#[derive(Debug, Clone)]
pub struct AutoScroller {
    margin_px: f64,
    gain: f64,
    max_speed_px: f64,
    velocity: f64,
    armed: bool,
    generation: u64,
}

impl AutoScroller {
    /// Creates an idle autoscroller.
    pub fn new(margin_px: f64, gain: f64, max_speed_px: f64) -> Self {
        Self {
            margin_px,
            gain,
            max_speed_px,
            velocity: 0.0,
            armed: false,
            generation: 0,
        }
    }

    /// Creates an autoscroller from the engine's autoscroll settings.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.autoscroll_margin_px,
            config.autoscroll_gain,
            config.autoscroll_max_speed_px,
        )
    }

    /// Arms for a new drag session, cancelling any previous loop.
    pub fn begin(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.armed = true;
        self.velocity = 0.0;
        self.generation
    }

    /// Stops the loop and disarms until the next [`begin`](Self::begin).
    pub fn stop(&mut self) {
        self.armed = false;
        self.velocity = 0.0;
    }

    /// Current session generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a frame tick would scroll.
    pub fn is_running(&self) -> bool {
        self.armed && self.velocity != 0.0
    }

    /// Signed speed in px/frame (negative scrolls left).
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Recomputes speed from the pointer position within the viewport.
    pub fn update_pointer(&mut self, viewport_x: f64, viewport_width: f64) {
        if !self.armed {
            return;
        }
        let from_left = viewport_x.max(0.0);
        let from_right = (viewport_width - viewport_x).max(0.0);

        self.velocity = if from_left <= from_right && from_left < self.margin_px {
            -self.speed(from_left)
        } else if from_right < from_left && from_right < self.margin_px {
            self.speed(from_right)
        } else {
            0.0
        };
    }

    /// Advances one animation frame; returns the scroll delta to apply.
    pub fn tick(&mut self) -> Option<f64> {
        self.is_running().then_some(self.velocity)
    }

    /// Called when a tick could not move the view (already at a boundary).
    pub fn halt_at_boundary(&mut self) {
        self.velocity = 0.0;
    }

    fn speed(&self, distance_from_edge: f64) -> f64 {
        ((self.margin_px - distance_from_edge) * self.gain).min(self.max_speed_px)
    }
}
