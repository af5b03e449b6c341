//! Pointer and scroll interaction.
//!
//! Stateful pieces that sit between host input events and the pure
//! layout functions. None of them mutate the layout; they report what
//! the caller should apply.
//!
//! # Components
//!
//! - `DragController`: press / drag / release state machine with live preview
//! - `AutoScroller`: edge autoscroll loop while dragging
//! - `ScrollSynchronizer`: header/body horizontal scroll mirroring

mod autoscroll;
mod drag;
mod scroll_sync;

pub use autoscroll::AutoScroller;
pub use drag::{
    DragContext, DragController, DragMode, DragOutcome, DragPhase, DragSession, DragSettings,
    PointerEvent,
};
pub use scroll_sync::{ScrollRegion, ScrollSync, ScrollSynchronizer};
