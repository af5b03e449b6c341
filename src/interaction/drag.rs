//! Pointer-driven drag state machine.
//!
//! A gesture on an interval bar moves through:
//!
//! ```text
//!   Idle ──down on bar──▶ Armed ──move > threshold──▶ Dragging
//!    ▲                      │                            │
//!    │◀──up (click)─────────┘                            │
//!    │◀──up: resolve + commit / cancel: revert───────────┘
//! ```
//!
//! Pressing within the edge zone of a bar grabs that edge for resizing;
//! anywhere else grabs the whole bar for moving. The offset between the
//! pointer and the grabbed edge is captured on press so the bar does not
//! jump under the pointer.
//!
//! The controller owns no layout state. Every event is evaluated against a
//! [`DragContext`] borrowed from the caller, and nothing is written back:
//! a release yields a [`DragOutcome::Committed`] the caller applies (or
//! rejects) itself.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::layout::{BarGeometry, ConflictResolver, CoordinateMapper, ResolutionStrategy};
use crate::models::{add_days, DateSpan, IntervalUpdated, Placement, RowAssignment};

/// What part of the bar the pointer grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DragMode {
    /// Shift both dates, keep duration; row may change.
    Move,
    /// Move the start date; end fixed.
    ResizeStart,
    /// Move the end date; start fixed.
    ResizeEnd,
}

/// Pointer input in content coordinates (scroll already applied).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// Button pressed.
    Down { x: f64, y: f64 },
    /// Pointer moved.
    Move { x: f64, y: f64 },
    /// Button released.
    Up { x: f64, y: f64 },
    /// Gesture aborted (Escape, focus loss, pointer capture lost).
    Cancel,
}

/// Coarse state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DragPhase {
    /// No gesture.
    Idle,
    /// Pressed on a bar, threshold not yet exceeded.
    Armed,
    /// Live preview running.
    Dragging,
}

/// State captured when a bar is pressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragSession {
    /// Grabbed interval.
    pub interval_id: String,
    /// Grip on the bar.
    pub mode: DragMode,
    /// Placement before the gesture.
    pub origin: Placement,
    /// Pointer x minus the grabbed edge's x at press time.
    pub pointer_anchor_offset: f64,
    /// Press position.
    pub press_x: f64,
    /// Press position.
    pub press_y: f64,
    /// Live candidate placement (equals `origin` until dragging).
    pub candidate: Placement,
}

/// Result of feeding one event to the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DragOutcome {
    /// Event had no effect.
    Ignored,
    /// A bar was pressed.
    Armed {
        /// Pressed interval.
        id: String,
        /// Grip under the pointer.
        mode: DragMode,
    },
    /// Released before the drag threshold.
    Clicked {
        /// Clicked interval.
        id: String,
    },
    /// Live candidate while dragging.
    Preview {
        /// Dragged interval.
        id: String,
        /// Candidate placement (may still conflict).
        placement: Placement,
    },
    /// Drop resolved to a new placement.
    Committed {
        /// Change to report to the host.
        update: IntervalUpdated,
        /// Placement before the gesture.
        origin: Placement,
        /// Strategy that produced the placement.
        strategy: ResolutionStrategy,
    },
    /// Drop resolved back to the origin; nothing to report.
    Unchanged {
        /// Dragged interval.
        id: String,
        /// Strategy that produced the origin placement.
        strategy: ResolutionStrategy,
    },
    /// Gesture aborted; the bar belongs at `origin`.
    Cancelled {
        /// Dragged interval.
        id: String,
        /// Placement before the gesture.
        origin: Placement,
    },
}

/// Read-only layout state a gesture is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct DragContext<'a> {
    /// Active date ↔ pixel mapping.
    pub mapper: &'a CoordinateMapper,
    /// Committed layout.
    pub assignment: &'a RowAssignment,
    /// Hit-test rectangles for the committed layout.
    pub bars: &'a [BarGeometry],
    /// Drop-time resolver.
    pub resolver: &'a ConflictResolver,
}

/// Pixel thresholds for gesture recognition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragSettings {
    /// Width of the resize grip at each bar edge.
    pub edge_zone_px: f64,
    /// Distance the pointer must travel before Armed becomes Dragging.
    pub drag_threshold_px: f64,
    /// Vertical travel before the candidate leaves its origin row.
    pub row_change_threshold_px: f64,
    /// Row pitch.
    pub row_height_px: f64,
}

impl Default for DragSettings {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl DragSettings {
    /// Extracts drag thresholds from an engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            edge_zone_px: config.edge_zone_px,
            drag_threshold_px: config.drag_threshold_px,
            row_change_threshold_px: config.row_change_threshold_px,
            row_height_px: config.row_height_px,
        }
    }
}

#[derive(Debug, Clone, Default)]
enum DragState {
    #[default]
    Idle,
    Armed(DragSession),
    Dragging(DragSession),
}

/// Drag-and-drop / resize controller for interval bars.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    settings: DragSettings,
    state: DragState,
}

impl DragController {
    /// Creates an idle controller.
    pub fn new(settings: DragSettings) -> Self {
        Self {
            settings,
            state: DragState::Idle,
        }
    }

    /// Creates an idle controller from an engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(DragSettings::from_config(config))
    }

    /// Gesture thresholds.
    pub fn settings(&self) -> &DragSettings {
        &self.settings
    }

    /// Current phase.
    pub fn phase(&self) -> DragPhase {
        match self.state {
            DragState::Idle => DragPhase::Idle,
            DragState::Armed(_) => DragPhase::Armed,
            DragState::Dragging(_) => DragPhase::Dragging,
        }
    }

    /// Whether a gesture is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    /// Session of the gesture in progress.
    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Idle => None,
            DragState::Armed(s) | DragState::Dragging(s) => Some(s),
        }
    }

    /// Live candidate, only while dragging.
    pub fn preview(&self) -> Option<(&str, Placement)> {
        match &self.state {
            DragState::Dragging(s) => Some((s.interval_id.as_str(), s.candidate)),
            _ => None,
        }
    }

    /// Feeds one pointer event through the state machine.
    pub fn handle(&mut self, event: PointerEvent, ctx: &DragContext<'_>) -> DragOutcome {
        let state = std::mem::take(&mut self.state);
        let (next, outcome) = match (state, event) {
            (DragState::Idle, PointerEvent::Down { x, y }) => self.press(x, y, ctx),
            (DragState::Idle, _) => (DragState::Idle, DragOutcome::Ignored),

            // A second press mid-gesture is ignored.
            (active @ (DragState::Armed(_) | DragState::Dragging(_)), PointerEvent::Down { .. }) => {
                (active, DragOutcome::Ignored)
            }

            (DragState::Armed(session), PointerEvent::Move { x, y }) => {
                let distance = (x - session.press_x).hypot(y - session.press_y);
                if distance > self.settings.drag_threshold_px {
                    debug!(
                        "drag started on '{}' ({:?}) after {distance:.1}px",
                        session.interval_id, session.mode
                    );
                    self.track(session, x, y, ctx)
                } else {
                    (DragState::Armed(session), DragOutcome::Ignored)
                }
            }
            (DragState::Dragging(session), PointerEvent::Move { x, y }) => self.track(session, x, y, ctx),

            (DragState::Armed(session), PointerEvent::Up { .. }) => (
                DragState::Idle,
                DragOutcome::Clicked {
                    id: session.interval_id,
                },
            ),
            (DragState::Dragging(session), PointerEvent::Up { x, y }) => {
                (DragState::Idle, self.release(session, x, y, ctx))
            }

            (DragState::Armed(session) | DragState::Dragging(session), PointerEvent::Cancel) => {
                debug!("drag on '{}' cancelled", session.interval_id);
                (
                    DragState::Idle,
                    DragOutcome::Cancelled {
                        id: session.interval_id,
                        origin: session.origin,
                    },
                )
            }
        };
        self.state = next;
        outcome
    }

    /// Aborts any gesture without an event (layout replaced underneath).
    pub fn reset(&mut self) -> Option<DragSession> {
        match std::mem::take(&mut self.state) {
            DragState::Idle => None,
            DragState::Armed(s) | DragState::Dragging(s) => Some(s),
        }
    }

    fn press(&self, x: f64, y: f64, ctx: &DragContext<'_>) -> (DragState, DragOutcome) {
        let Some(bar) = ctx.bars.iter().find(|b| b.contains(x, y)) else {
            return (DragState::Idle, DragOutcome::Ignored);
        };
        let mode = grip_at(bar, x, self.settings.edge_zone_px);
        let origin = Placement::new(bar.row, bar.span);
        let grabbed_edge = match mode {
            DragMode::Move | DragMode::ResizeStart => origin.start(),
            DragMode::ResizeEnd => origin.end(),
        };
        let session = DragSession {
            interval_id: bar.id.clone(),
            mode,
            origin,
            pointer_anchor_offset: x - ctx.mapper.position(grabbed_edge),
            press_x: x,
            press_y: y,
            candidate: origin,
        };
        debug!("armed '{}' ({mode:?}) at ({x:.1}, {y:.1})", bar.id);
        let outcome = DragOutcome::Armed {
            id: bar.id.clone(),
            mode,
        };
        (DragState::Armed(session), outcome)
    }

    fn track(&self, mut session: DragSession, x: f64, y: f64, ctx: &DragContext<'_>) -> (DragState, DragOutcome) {
        session.candidate = self.candidate(&session, x, y, ctx);
        let outcome = DragOutcome::Preview {
            id: session.interval_id.clone(),
            placement: session.candidate,
        };
        (DragState::Dragging(session), outcome)
    }

    fn release(&self, session: DragSession, x: f64, y: f64, ctx: &DragContext<'_>) -> DragOutcome {
        let candidate = self.candidate(&session, x, y, ctx);
        let resolution = ctx
            .resolver
            .resolve(&session.interval_id, candidate, ctx.assignment, session.origin);

        if resolution.placement == session.origin {
            debug!("drop of '{}' resolved to its origin", session.interval_id);
            return DragOutcome::Unchanged {
                id: session.interval_id,
                strategy: resolution.strategy,
            };
        }
        DragOutcome::Committed {
            update: IntervalUpdated::new(session.interval_id, resolution.placement),
            origin: session.origin,
            strategy: resolution.strategy,
        }
    }

    /// Candidate placement for a pointer position during `session`.
    fn candidate(&self, session: &DragSession, x: f64, y: f64, ctx: &DragContext<'_>) -> Placement {
        let edge = ctx.mapper.pixels_to_date(x - session.pointer_anchor_offset);
        let origin = session.origin;

        match session.mode {
            DragMode::Move => {
                let row = self.candidate_row(session, y, ctx);
                Placement::new(row, origin.span.starting_at(edge))
            }
            DragMode::ResizeStart => {
                let start = edge.min(add_days(origin.end(), -1));
                Placement::new(origin.row, DateSpan::new(start, origin.end()))
            }
            DragMode::ResizeEnd => {
                let end = edge.max(add_days(origin.start(), 1));
                Placement::new(origin.row, DateSpan::new(origin.start(), end))
            }
        }
    }

    /// Row under the pointer once vertical travel passes the threshold.
    ///
    /// May be one past the last row (a new row), never beyond the limit.
    fn candidate_row(&self, session: &DragSession, y: f64, ctx: &DragContext<'_>) -> usize {
        let dy = y - session.press_y;
        if dy.abs() < self.settings.row_change_threshold_px || self.settings.row_height_px <= 0.0 {
            return session.origin.row;
        }
        let max_row = ctx
            .assignment
            .row_count()
            .min(ctx.resolver.max_rows().saturating_sub(1));
        let target = (session.origin.row as f64 + dy / self.settings.row_height_px).round();
        if target <= 0.0 {
            0
        } else {
            (target as usize).min(max_row)
        }
    }
}

/// Grip for a press at `x` on `bar`.
///
/// Bars too narrow for two edge zones split at their midpoint.
fn grip_at(bar: &BarGeometry, x: f64, edge_zone: f64) -> DragMode {
    let from_left = x - bar.x;
    let from_right = bar.right() - x;
    if bar.width <= 2.0 * edge_zone {
        if from_left < bar.width / 2.0 {
            DragMode::ResizeStart
        } else {
            DragMode::ResizeEnd
        }
    } else if from_left < edge_zone {
        DragMode::ResizeStart
    } else if from_right <= edge_zone {
        DragMode::ResizeEnd
    } else {
        DragMode::Move
    }
}
