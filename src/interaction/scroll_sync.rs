//! Horizontal scroll synchronization between header and body.
//!
//! The header (grid labels) and the body (bars) scroll independently but
//! must always show the same horizontal offset. When one region reports
//! a scroll, the offset is mirrored onto the other and a guard is armed
//! for that other region, so the echo event it fires for the programmatic
//! change is swallowed instead of bouncing back.
//!
//! # Invariants
//! 1. After any handled event, `header_offset() == body_offset()`.
//! 2. A user-initiated scroll causes at most one handler invocation per
//!    region: the source's own event and one suppressed echo.
//! 3. Guards live for one frame; [`ScrollSynchronizer::end_frame`]
//!    clears any that never fired.

use serde::{Deserialize, Serialize};

const ECHO_EPSILON: f64 = 0.5;

/// One of the two synchronized scroll regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScrollRegion {
    /// Grid label strip.
    Header,
    /// Interval bar area.
    Body,
}

impl ScrollRegion {
    /// The region that mirrors this one.
    pub fn other(self) -> Self {
        match self {
            ScrollRegion::Header => ScrollRegion::Body,
            ScrollRegion::Body => ScrollRegion::Header,
        }
    }

    fn index(self) -> usize {
        match self {
            ScrollRegion::Header => 0,
            ScrollRegion::Body => 1,
        }
    }
}

/// What the host should do after a scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScrollSync {
    /// Apply `offset` to `target`; its echo will be suppressed.
    Mirrored {
        /// Region to update.
        target: ScrollRegion,
        /// Offset to apply (px).
        offset: f64,
    },
    /// The event was the echo of a programmatic change.
    EchoSuppressed,
    /// Both regions already show this offset.
    Unchanged,
}

/// Keeps two scroll regions at the same horizontal offset.
#[derive(Debug, Clone, Default)]
pub struct ScrollSynchronizer {
    offsets: [f64; 2],
    pending_echo: [Option<f64>; 2],
    max_offset: f64,
}

impl ScrollSynchronizer {
    /// Creates a synchronizer at offset 0 with no scrollable extent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of one region (px).
    pub fn offset(&self, region: ScrollRegion) -> f64 {
        self.offsets[region.index()]
    }

    /// Header offset (px).
    pub fn header_offset(&self) -> f64 {
        self.offset(ScrollRegion::Header)
    }

    /// Body offset (px).
    pub fn body_offset(&self) -> f64 {
        self.offset(ScrollRegion::Body)
    }

    /// Largest reachable offset (px).
    pub fn max_offset(&self) -> f64 {
        self.max_offset
    }

    /// Whether an echo guard is armed for a region.
    pub fn is_guarded(&self, region: ScrollRegion) -> bool {
        self.pending_echo[region.index()].is_some()
    }

    /// Handles a scroll event reported by `source`.
    pub fn on_scroll(&mut self, source: ScrollRegion, offset: f64) -> ScrollSync {
        let src = source.index();
        if let Some(expected) = self.pending_echo[src].take() {
            if (expected - offset).abs() < ECHO_EPSILON {
                return ScrollSync::EchoSuppressed;
            }
        }

        let target = source.other();
        self.offsets[src] = offset;
        if (self.offsets[target.index()] - offset).abs() < f64::EPSILON {
            return ScrollSync::Unchanged;
        }
        self.offsets[target.index()] = offset;
        self.pending_echo[target.index()] = Some(offset);
        ScrollSync::Mirrored { target, offset }
    }

    /// Sets both regions to `offset` (clamped) programmatically.
    ///
    /// Both regions will echo; both echoes are suppressed. Returns the
    /// applied offset.
    pub fn scroll_to(&mut self, offset: f64) -> f64 {
        let clamped = offset.clamp(0.0, self.max_offset);
        for region in [ScrollRegion::Header, ScrollRegion::Body] {
            let i = region.index();
            if (self.offsets[i] - clamped).abs() >= f64::EPSILON {
                self.offsets[i] = clamped;
                self.pending_echo[i] = Some(clamped);
            }
        }
        clamped
    }

    /// Moves both regions by `delta` (clamped). Returns the distance moved.
    pub fn scroll_by(&mut self, delta: f64) -> f64 {
        let before = self.body_offset();
        self.scroll_to(before + delta) - before
    }

    /// Updates the scrollable extent, pulling the offset back in range.
    pub fn set_extent(&mut self, content_width: f64, viewport_width: f64) {
        self.max_offset = (content_width - viewport_width).max(0.0);
        if self.body_offset() > self.max_offset || self.header_offset() > self.max_offset {
            self.scroll_to(self.max_offset);
        }
    }

    /// Drops echo guards that did not fire this frame.
    pub fn end_frame(&mut self) {
        self.pending_echo = [None, None];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_scroll_mirrors_to_body() {
        let mut sync = ScrollSynchronizer::new();
        sync.set_extent(2000.0, 800.0);

        let out = sync.on_scroll(ScrollRegion::Header, 340.0);
        assert_eq!(
            out,
            ScrollSync::Mirrored {
                target: ScrollRegion::Body,
                offset: 340.0
            }
        );
        assert_eq!(sync.body_offset(), 340.0);
        assert!(sync.is_guarded(ScrollRegion::Body));

        // The body's echo is swallowed.
        assert_eq!(sync.on_scroll(ScrollRegion::Body, 340.0), ScrollSync::EchoSuppressed);
        assert!(!sync.is_guarded(ScrollRegion::Body));
        assert_eq!(sync.header_offset(), 340.0);
    }

    #[test]
    fn test_body_scroll_mirrors_to_header() {
        let mut sync = ScrollSynchronizer::new();
        let out = sync.on_scroll(ScrollRegion::Body, 120.0);
        assert_eq!(
            out,
            ScrollSync::Mirrored {
                target: ScrollRegion::Header,
                offset: 120.0
            }
        );
        assert_eq!(sync.on_scroll(ScrollRegion::Header, 120.0), ScrollSync::EchoSuppressed);
    }

    #[test]
    fn test_user_scroll_during_guard_is_not_swallowed() {
        let mut sync = ScrollSynchronizer::new();
        sync.on_scroll(ScrollRegion::Header, 100.0);
        // The body reports a different offset: a real user scroll.
        let out = sync.on_scroll(ScrollRegion::Body, 180.0);
        assert_eq!(
            out,
            ScrollSync::Mirrored {
                target: ScrollRegion::Header,
                offset: 180.0
            }
        );
        assert_eq!(sync.header_offset(), 180.0);
    }

    #[test]
    fn test_end_frame_clears_guards() {
        let mut sync = ScrollSynchronizer::new();
        sync.on_scroll(ScrollRegion::Header, 50.0);
        sync.end_frame();
        assert!(!sync.is_guarded(ScrollRegion::Body));
        assert_eq!(sync.on_scroll(ScrollRegion::Body, 50.0), ScrollSync::Unchanged);
    }

    #[test]
    fn test_programmatic_scroll_clamps_and_guards_both() {
        let mut sync = ScrollSynchronizer::new();
        sync.set_extent(1000.0, 600.0);
        assert_eq!(sync.scroll_by(150.0), 150.0);
        assert_eq!(sync.scroll_by(500.0), 250.0);
        assert_eq!(sync.body_offset(), 400.0);
        assert_eq!(sync.scroll_by(10.0), 0.0);
        assert!(sync.is_guarded(ScrollRegion::Header));
        assert!(sync.is_guarded(ScrollRegion::Body));
        assert_eq!(sync.scroll_by(-1000.0), -400.0);
    }

    #[test]
    fn test_shrinking_extent_pulls_offset_back() {
        let mut sync = ScrollSynchronizer::new();
        sync.set_extent(3000.0, 1000.0);
        sync.scroll_to(1800.0);
        sync.set_extent(1500.0, 1000.0);
        assert_eq!(sync.body_offset(), 500.0);
        assert_eq!(sync.header_offset(), 500.0);
    }
}
