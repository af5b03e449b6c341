//! Timeline engine: one explicit instance per timeline view.
//!
//! Owns the configuration, the working copy of the intervals, the current
//! [`RowAssignment`] and everything derived from it (coordinate mapper,
//! bar geometry), plus the interaction state (drag controller, autoscroll
//! loop, scroll synchronizer) and commits awaiting confirmation.
//!
//! # Commit lifecycle
//!
//! A drop that resolves to a new placement is applied to the working copy
//! immediately and returned as [`DragOutcome::Committed`]; the host
//! forwards the [`IntervalUpdated`] to its store. The commit stays pending
//! until [`TimelineEngine::confirm_commit`] or
//! [`TimelineEngine::reject_commit`].
//!
//! Several commits for the same interval may be outstanding at once; the
//! host answers them in emission order and each answer consumes exactly
//! one. Per interval the engine remembers the last placement the host
//! confirmed (the pre-gesture placement until the first confirmation):
//!
//! | Reply | Working copy |
//! |---|---|
//! | confirm, no earlier rejection | unchanged (already shows the commit or a later one) |
//! | confirm after a rejection | moves to the confirmed placement |
//! | reject | back to the last confirmed placement |
//!
//! [`TimelineEngine::update_dates`] supersedes everything outstanding for
//! the edited interval: later replies for it are acknowledged without
//! moving anything.
//!
//! # Scroll anchoring
//!
//! Whenever geometry is rebuilt (zoom, commit, edit, load) the date at the
//! left edge of the viewport stays at the left edge, clamped to the new
//! scroll range.
//!
//! # Coordinates
//!
//! [`TimelineEngine::handle_pointer`] takes viewport coordinates (relative
//! to the top-left of the visible body) and applies the current scroll
//! offsets before hit-testing.

use std::collections::{BTreeMap, HashSet, VecDeque};

use chrono::NaiveDate;
use log::{debug, error, info, warn};
use thiserror::Error;

use crate::config::{ConfigError, EngineConfig};
use crate::interaction::{
    AutoScroller, DragContext, DragController, DragOutcome, DragPhase, PointerEvent, ScrollRegion,
    ScrollSync, ScrollSynchronizer,
};
use crate::layout::{
    BarGeometry, ConflictResolver, CoordinateMapper, GridCell, LayoutStats, RowAssigner,
    TimelineBounds,
};
use crate::models::{
    add_days, hints_from_intervals, Interval, IntervalUpdated, Placement, RowAssignment, RowEntry,
    ZoomLevel,
};
use crate::validation::check_no_overlap;

/// Errors from id-based engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// No interval with this id is loaded.
    #[error("unknown interval '{0}'")]
    UnknownInterval(String),
    /// An interval with this id is already loaded.
    #[error("interval '{0}' already exists")]
    DuplicateInterval(String),
    /// The interval has no commit awaiting confirmation.
    #[error("no pending commit for interval '{0}'")]
    NoPendingCommit(String),
}

/// A commit handed to the host and not yet confirmed or rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommit {
    /// The change reported to the host.
    pub update: IntervalUpdated,
    /// Placement a rejection restores: the last one the host confirmed.
    pub origin: Placement,
    /// Set once an external edit has replaced this change.
    pub superseded: bool,
}

/// Outstanding commits for one interval, oldest first.
#[derive(Debug, Clone)]
struct CommitQueue {
    confirmed: Placement,
    commits: VecDeque<(IntervalUpdated, bool)>,
    /// The working copy shows `confirmed` rather than the newest commit.
    reverted: bool,
}

/// Layout and interaction engine for one timeline.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_timeline::config::EngineConfig;
/// use u_timeline::engine::TimelineEngine;
/// use u_timeline::models::{Interval, ZoomLevel};
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
/// let mut engine = TimelineEngine::new(EngineConfig::default(), ZoomLevel::Week).unwrap();
/// engine.load(vec![
///     Interval::new("P1", d(1), d(10)),
///     Interval::new("P2", d(5), d(15)),
/// ]);
///
/// assert_eq!(engine.assignment().row_of("P1"), Some(0));
/// assert_eq!(engine.assignment().row_of("P2"), Some(1));
/// assert_eq!(engine.bars().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TimelineEngine {
    config: EngineConfig,
    zoom: ZoomLevel,
    intervals: Vec<Interval>,
    assigner: RowAssigner,
    resolver: ConflictResolver,
    assignment: RowAssignment,
    mapper: CoordinateMapper,
    bars: Vec<BarGeometry>,
    drag: DragController,
    autoscroll: AutoScroller,
    scroll: ScrollSynchronizer,
    viewport_width: f64,
    vertical_offset: f64,
    last_pointer: Option<(f64, f64)>,
    pending: BTreeMap<String, CommitQueue>,
}

impl TimelineEngine {
    /// Creates an empty engine.
    ///
    /// # Errors
    /// Returns the configuration problem if `config` does not validate.
    pub fn new(config: EngineConfig, zoom: ZoomLevel) -> Result<Self, ConfigError> {
        config.validate()?;
        let assigner = RowAssigner::from_config(&config);
        let assignment = assigner.assign(&[], None);
        let mapper = CoordinateMapper::new(NaiveDate::default(), zoom);
        Ok(Self {
            assigner,
            resolver: ConflictResolver::from_config(&config),
            drag: DragController::from_config(&config),
            autoscroll: AutoScroller::from_config(&config),
            scroll: ScrollSynchronizer::new(),
            config,
            zoom,
            intervals: Vec::new(),
            assignment,
            mapper,
            bars: Vec::new(),
            viewport_width: 0.0,
            vertical_offset: 0.0,
            last_pointer: None,
            pending: BTreeMap::new(),
        })
    }

    // ---- Data ----

    /// Replaces the interval set and lays it out from scratch.
    ///
    /// Intervals shorter than one day are clamped; later duplicates of an
    /// id are dropped. Row hints come from [`Interval::row`]. Any gesture
    /// in progress is abandoned and pending commits are forgotten, since
    /// the supplied list is authoritative.
    pub fn load(&mut self, intervals: Vec<Interval>) {
        self.abandon_gesture();
        if !self.pending.is_empty() {
            debug!("load discards pending commits for {} intervals", self.pending.len());
            self.pending.clear();
        }

        let mut seen = HashSet::new();
        self.intervals = intervals
            .into_iter()
            .filter(|iv| {
                let fresh = seen.insert(iv.id.clone());
                if !fresh {
                    warn!("duplicate interval id '{}' dropped", iv.id);
                }
                fresh
            })
            .map(normalize)
            .collect();

        let hints = hints_from_intervals(&self.intervals);
        self.assignment = self.assigner.assign(&self.intervals, Some(&hints));
        self.refresh_geometry();
        info!(
            "loaded {} intervals into {} rows",
            self.intervals.len(),
            self.assignment.row_count()
        );
    }

    /// Adds one interval without moving any existing one.
    ///
    /// Uses the interval's row hint when that row is free, otherwise the
    /// first free row, otherwise a new row.
    ///
    /// # Errors
    /// [`EngineError::DuplicateInterval`] if the id is already loaded.
    pub fn add_interval(&mut self, interval: Interval) -> Result<Placement, EngineError> {
        if self.index_of(&interval.id).is_some() {
            return Err(EngineError::DuplicateInterval(interval.id));
        }
        let interval = normalize(interval);
        let hint = interval.row.and_then(|r| usize::try_from(r).ok());
        let placement =
            self.assigner
                .insert_pinned(&mut self.assignment, &interval.id, interval.span(), hint);
        let idx = self.intervals.len();
        self.intervals.push(interval);
        self.write_back(idx, placement);
        self.refresh_geometry();
        debug!("added interval at row {}", placement.row);
        Ok(placement)
    }

    /// Applies an external date edit.
    ///
    /// The interval keeps its row if the new dates fit there; every other
    /// interval stays where it is. The edit becomes the interval's
    /// confirmed placement, so replies to commits still outstanding for it
    /// no longer move it.
    ///
    /// # Errors
    /// [`EngineError::UnknownInterval`] if the id is not loaded.
    pub fn update_dates(
        &mut self,
        id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Placement, EngineError> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| EngineError::UnknownInterval(id.to_string()))?;
        if self.drag.session().is_some_and(|s| s.interval_id == id) {
            self.abandon_gesture();
        }

        let mut edited = self.intervals[idx].clone();
        edited.start = start;
        edited.end = end;
        let edited = normalize(edited);

        let current_row = self.assignment.remove(id).map(|p| p.row);
        let placement = self
            .assigner
            .insert_pinned(&mut self.assignment, id, edited.span(), current_row);
        self.intervals[idx] = edited;
        self.write_back(idx, placement);

        if let Some(queue) = self.pending.get_mut(id) {
            debug!(
                "edit to '{id}' supersedes {} pending commits",
                queue.commits.len()
            );
            queue.confirmed = placement;
            queue.reverted = true;
            for (_, superseded) in &mut queue.commits {
                *superseded = true;
            }
        }
        self.refresh_geometry();
        Ok(placement)
    }

    /// Removes an interval; other rows keep their indices.
    ///
    /// # Errors
    /// [`EngineError::UnknownInterval`] if the id is not loaded.
    pub fn remove_interval(&mut self, id: &str) -> Result<Placement, EngineError> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| EngineError::UnknownInterval(id.to_string()))?;
        if self.drag.session().is_some_and(|s| s.interval_id == id) {
            self.abandon_gesture();
        }
        self.intervals.remove(idx);
        self.pending.remove(id);
        let placement = self
            .assignment
            .remove(id)
            .ok_or_else(|| EngineError::UnknownInterval(id.to_string()))?;
        self.refresh_geometry();
        Ok(placement)
    }

    /// Switches zoom level; interval data is untouched.
    ///
    /// The date at the left edge of the viewport stays at the left edge.
    pub fn set_zoom(&mut self, zoom: ZoomLevel) {
        if zoom == self.zoom {
            return;
        }
        self.abandon_gesture();
        self.zoom = zoom;
        self.refresh_geometry();
        debug!("zoom set to {zoom:?}");
    }

    // ---- Input ----

    /// Sets the visible body width (px).
    pub fn set_viewport(&mut self, width: f64) {
        self.viewport_width = width.max(0.0);
        self.scroll
            .set_extent(self.mapper.total_width(), self.viewport_width);
    }

    /// Sets the body's vertical scroll offset (px).
    pub fn set_vertical_scroll(&mut self, offset: f64) {
        self.vertical_offset = offset.max(0.0);
    }

    /// Feeds a pointer event in viewport coordinates.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> DragOutcome {
        if let PointerEvent::Down { x, y } | PointerEvent::Move { x, y } | PointerEvent::Up { x, y } =
            event
        {
            self.last_pointer = Some((x, y));
        }
        let was_dragging = self.drag.phase() == DragPhase::Dragging;
        let outcome = self.dispatch(self.to_content(event));

        match &outcome {
            DragOutcome::Preview { .. } => {
                if !was_dragging {
                    self.autoscroll.begin();
                }
                if let Some((x, _)) = self.last_pointer {
                    self.autoscroll.update_pointer(x, self.viewport_width);
                }
            }
            DragOutcome::Committed { update, origin, .. } => {
                self.autoscroll.stop();
                self.apply_commit(update.clone(), *origin);
            }
            DragOutcome::Unchanged { .. }
            | DragOutcome::Cancelled { .. }
            | DragOutcome::Clicked { .. } => self.autoscroll.stop(),
            DragOutcome::Ignored | DragOutcome::Armed { .. } => {}
        }
        outcome
    }

    /// Runs one animation frame of edge autoscroll.
    ///
    /// Returns the applied scroll delta, or `None` when nothing scrolled.
    /// The live preview follows the pointer across the scrolled content.
    pub fn tick_autoscroll(&mut self) -> Option<f64> {
        if self.drag.phase() != DragPhase::Dragging {
            self.autoscroll.stop();
            return None;
        }
        let delta = self.autoscroll.tick()?;
        let applied = self.scroll.scroll_by(delta);
        if applied == 0.0 {
            self.autoscroll.halt_at_boundary();
            return None;
        }
        if let Some((x, y)) = self.last_pointer {
            self.dispatch(self.to_content(PointerEvent::Move { x, y }));
        }
        Some(applied)
    }

    /// Handles a scroll event from the header or body.
    pub fn on_scroll(&mut self, region: ScrollRegion, offset: f64) -> ScrollSync {
        self.scroll.on_scroll(region, offset)
    }

    /// Ends the current frame, dropping unfired scroll echo guards.
    pub fn end_frame(&mut self) {
        self.scroll.end_frame();
    }

    // ---- Commits ----

    /// Marks the oldest outstanding commit for `id` as persisted.
    ///
    /// # Errors
    /// [`EngineError::NoPendingCommit`] if nothing is pending for `id`.
    pub fn confirm_commit(&mut self, id: &str) -> Result<IntervalUpdated, EngineError> {
        let reverted = self.pending.get(id).is_some_and(|queue| queue.reverted);
        let (update, superseded) = self.pop_commit(id)?;
        if superseded {
            debug!("superseded commit for '{id}' confirmed; no change");
            return Ok(update);
        }

        let placement = update.placement();
        if let Some(queue) = self.pending.get_mut(id) {
            queue.confirmed = placement;
        }
        if reverted {
            self.relocate(id, placement)?;
        }
        info!("commit for '{id}' confirmed");
        Ok(update)
    }

    /// Reverts the oldest outstanding commit for `id`.
    ///
    /// The interval returns to the last placement the host confirmed; if
    /// that spot has since been taken it goes to the first free row at
    /// those dates. Commits still outstanding for `id` stay pending.
    ///
    /// # Errors
    /// [`EngineError::NoPendingCommit`] if nothing is pending for `id`.
    pub fn reject_commit(&mut self, id: &str) -> Result<Placement, EngineError> {
        let confirmed = self
            .pending
            .get(id)
            .map(|queue| queue.confirmed)
            .ok_or_else(|| EngineError::NoPendingCommit(id.to_string()))?;
        let (_, superseded) = self.pop_commit(id)?;
        if superseded {
            debug!("superseded commit for '{id}' rejected; no change");
            return self
                .assignment
                .placement_of(id)
                .ok_or_else(|| EngineError::UnknownInterval(id.to_string()));
        }

        if let Some(queue) = self.pending.get_mut(id) {
            queue.reverted = true;
        }
        let placement = self.relocate(id, confirmed)?;
        info!(
            "commit for '{id}' rejected; reverted to row {} [{}, {})",
            placement.row,
            placement.start(),
            placement.end()
        );
        Ok(placement)
    }

    /// Commits awaiting confirmation, grouped by interval id and oldest
    /// first within each interval.
    pub fn pending_commits(&self) -> impl Iterator<Item = PendingCommit> + '_ {
        self.pending.values().flat_map(|queue| {
            queue
                .commits
                .iter()
                .map(move |(update, superseded)| PendingCommit {
                    update: update.clone(),
                    origin: queue.confirmed,
                    superseded: *superseded,
                })
        })
    }

    // ---- Read side ----

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Active zoom level.
    pub fn zoom(&self) -> ZoomLevel {
        self.zoom
    }

    /// Working copy of the intervals (rows reflect the current layout).
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Current committed layout.
    pub fn assignment(&self) -> &RowAssignment {
        &self.assignment
    }

    /// Current coordinate mapping.
    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// Bar rectangles for the committed layout.
    pub fn bars(&self) -> &[BarGeometry] {
        &self.bars
    }

    /// Bar rectangle of the live drag candidate.
    pub fn preview(&self) -> Option<BarGeometry> {
        self.drag.preview().map(|(id, placement)| {
            self.mapper
                .bar(id, placement.span, placement.row, self.config.row_height_px)
        })
    }

    /// Phase of the gesture in progress.
    pub fn drag_phase(&self) -> DragPhase {
        self.drag.phase()
    }

    /// Header grid cells.
    pub fn grid_labels(&self) -> Vec<GridCell> {
        self.mapper.grid_labels()
    }

    /// Scrollable content width (px).
    pub fn timeline_width(&self) -> f64 {
        self.mapper.total_width()
    }

    /// Content height (px).
    pub fn timeline_height(&self) -> f64 {
        self.assignment.row_count() as f64 * self.config.row_height_px
    }

    /// Shared horizontal scroll offset (px).
    pub fn scroll_offset(&self) -> f64 {
        self.scroll.body_offset()
    }

    /// Layout statistics.
    pub fn stats(&self) -> LayoutStats {
        LayoutStats::calculate(&self.assignment)
    }

    /// Whether the body needs vertical scrolling.
    pub fn is_scrollable(&self) -> bool {
        self.assignment.is_scrollable()
    }

    // ---- Internals ----

    fn dispatch(&mut self, event: PointerEvent) -> DragOutcome {
        let ctx = DragContext {
            mapper: &self.mapper,
            assignment: &self.assignment,
            bars: &self.bars,
            resolver: &self.resolver,
        };
        self.drag.handle(event, &ctx)
    }

    fn to_content(&self, event: PointerEvent) -> PointerEvent {
        let dx = self.scroll.body_offset();
        let dy = self.vertical_offset;
        match event {
            PointerEvent::Down { x, y } => PointerEvent::Down { x: x + dx, y: y + dy },
            PointerEvent::Move { x, y } => PointerEvent::Move { x: x + dx, y: y + dy },
            PointerEvent::Up { x, y } => PointerEvent::Up { x: x + dx, y: y + dy },
            PointerEvent::Cancel => PointerEvent::Cancel,
        }
    }

    fn abandon_gesture(&mut self) {
        if let Some(session) = self.drag.reset() {
            debug!("gesture on '{}' abandoned", session.interval_id);
        }
        self.autoscroll.stop();
    }

    fn apply_commit(&mut self, update: IntervalUpdated, origin: Placement) {
        let placement = update.placement();
        let Some(idx) = self.index_of(&update.id) else {
            warn!("commit for unknown interval '{}' ignored", update.id);
            return;
        };
        self.assignment.remove(&update.id);
        self.assignment
            .insert(placement.row, RowEntry::new(update.id.clone(), placement.span));
        self.write_back(idx, placement);

        if let Err(errors) = check_no_overlap(&self.assignment) {
            for e in &errors {
                error!("post-commit audit: {}", e.message);
            }
            let hints = hints_from_intervals(&self.intervals);
            self.assignment = self.assigner.assign(&self.intervals, Some(&hints));
        }
        self.refresh_geometry();

        info!(
            "commit '{}' -> row {} [{}, {})",
            update.id, update.new_row, update.new_start, update.new_end
        );
        let queue = self
            .pending
            .entry(update.id.clone())
            .or_insert_with(|| CommitQueue {
                confirmed: origin,
                commits: VecDeque::new(),
                reverted: false,
            });
        queue.commits.push_back((update, false));
        queue.reverted = false;
    }

    /// Removes the oldest commit for `id`, dropping the queue once empty.
    fn pop_commit(&mut self, id: &str) -> Result<(IntervalUpdated, bool), EngineError> {
        let queue = self
            .pending
            .get_mut(id)
            .ok_or_else(|| EngineError::NoPendingCommit(id.to_string()))?;
        let front = queue
            .commits
            .pop_front()
            .ok_or_else(|| EngineError::NoPendingCommit(id.to_string()));
        if queue.commits.is_empty() {
            self.pending.remove(id);
        }
        front
    }

    /// Moves `id` to `target`, or to the first free row at its dates.
    fn relocate(&mut self, id: &str, target: Placement) -> Result<Placement, EngineError> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| EngineError::UnknownInterval(id.to_string()))?;
        self.assignment.remove(id);
        let placement =
            self.assigner
                .insert_pinned(&mut self.assignment, id, target.span, Some(target.row));
        self.write_back(idx, placement);
        self.refresh_geometry();
        Ok(placement)
    }

    fn write_back(&mut self, idx: usize, placement: Placement) {
        if let Some(interval) = self.intervals.get_mut(idx) {
            interval.start = placement.start();
            interval.end = placement.end();
            interval.row = i64::try_from(placement.row).ok();
        }
    }

    fn refresh_geometry(&mut self) {
        let old_anchor = self.mapper.anchor();
        let old_scale = self.mapper.pixels_per_day();
        let old_offset = self.scroll.body_offset();

        self.mapper = match TimelineBounds::from_assignment(&self.assignment) {
            Some(bounds) => CoordinateMapper::for_bounds(bounds, self.zoom),
            None => CoordinateMapper::new(NaiveDate::default(), self.zoom),
        };
        self.bars = self
            .mapper
            .bars(&self.assignment, self.config.row_height_px);
        self.scroll
            .set_extent(self.mapper.total_width(), self.viewport_width);
        let scale = self.mapper.pixels_per_day() / old_scale;
        let left_edge = self.mapper.position(old_anchor) + old_offset * scale;
        self.scroll.scroll_to(left_edge);
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.intervals.iter().position(|iv| iv.id == id)
    }
}

/// Clamps an interval to the one-day minimum, logging the correction.
fn normalize(mut interval: Interval) -> Interval {
    if !interval.is_well_formed() {
        warn!(
            "interval '{}' ends {} before start {} + 1 day; clamped to one day",
            interval.id, interval.end, interval.start
        );
        interval.end = add_days(interval.start, 1);
    }
    interval
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ResolutionStrategy;
    use crate::models::DateSpan;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn engine() -> TimelineEngine {
        let config = EngineConfig::default().with_min_rows(3);
        let mut engine = TimelineEngine::new(config, ZoomLevel::Week).unwrap();
        engine.set_viewport(800.0);
        engine
    }

    fn sequential() -> Vec<Interval> {
        vec![
            Interval::new("P1", d(1), d(10)),
            Interval::new("P3", d(11), d(20)),
        ]
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = EngineConfig::default().with_row_height(0.0);
        assert!(TimelineEngine::new(config, ZoomLevel::Month).is_err());
    }

    #[test]
    fn test_load_normalizes_and_dedupes() {
        let mut e = engine();
        e.load(vec![
            Interval::new("A", d(5), d(2)),
            Interval::new("A", d(1), d(3)),
            Interval::new("B", d(1), d(3)).with_row(2),
        ]);
        assert_eq!(e.intervals().len(), 2);
        assert_eq!(e.intervals()[0].end, d(6));
        assert_eq!(e.assignment().row_of("B"), Some(2));
        assert_eq!(e.assignment().row_count(), 3);
    }

    #[test]
    fn test_empty_engine_geometry() {
        let e = engine();
        assert_eq!(e.timeline_width(), 0.0);
        assert!(e.bars().is_empty());
        assert!(e.grid_labels().is_empty());
        assert!(e.preview().is_none());
    }

    #[test]
    fn test_add_interval_keeps_existing_rows() {
        let mut e = engine();
        e.load(sequential());
        let placement = e.add_interval(Interval::new("P2", d(5), d(15))).unwrap();
        assert_eq!(placement.row, 1);
        assert_eq!(e.assignment().row_of("P1"), Some(0));
        assert_eq!(e.assignment().row_of("P3"), Some(0));
        assert_eq!(
            e.add_interval(Interval::new("P2", d(1), d(2))),
            Err(EngineError::DuplicateInterval("P2".into()))
        );
    }

    #[test]
    fn test_add_interval_with_hint() {
        let mut e = engine();
        e.load(sequential());
        let p = e.add_interval(Interval::new("X", d(1), d(4)).with_row(2)).unwrap();
        assert_eq!(p.row, 2);
        assert_eq!(e.intervals().last().and_then(|iv| iv.row), Some(2));
    }

    #[test]
    fn test_update_dates_moves_only_when_needed() {
        let mut e = engine();
        e.load(sequential());
        // Still fits on row 0.
        let p = e.update_dates("P1", d(2), d(11)).unwrap();
        assert_eq!(p, Placement::new(0, DateSpan::new(d(2), d(11))));
        // Now collides with P3: first free row.
        let p = e.update_dates("P1", d(8), d(14)).unwrap();
        assert_eq!(p.row, 1);
        assert_eq!(e.assignment().row_of("P3"), Some(0));
        assert_eq!(
            e.update_dates("nope", d(1), d(2)),
            Err(EngineError::UnknownInterval("nope".into()))
        );
    }

    #[test]
    fn test_remove_keeps_row_indices() {
        let mut e = engine();
        e.load(vec![
            Interval::new("A", d(1), d(10)),
            Interval::new("B", d(2), d(10)),
            Interval::new("C", d(3), d(10)),
        ]);
        assert_eq!(e.assignment().row_of("C"), Some(2));
        e.remove_interval("B").unwrap();
        assert_eq!(e.assignment().row_of("C"), Some(2));
        assert!(e.assignment().row(1).is_some_and(|r| r.is_empty()));
        assert!(e.remove_interval("B").is_err());
    }

    #[test]
    fn test_zoom_scales_geometry() {
        let mut e = engine();
        e.load(sequential());
        e.set_zoom(ZoomLevel::Quarter);
        let anchor = e.mapper().anchor();
        let narrow = e.bars()[0].clone();
        e.set_zoom(ZoomLevel::Week);
        assert_eq!(e.mapper().anchor(), anchor);
        let wide = &e.bars()[0];
        assert_eq!(wide.width, narrow.width * 10.0);
        assert_eq!(e.intervals()[0].start, d(1));
    }

    #[test]
    fn test_drag_commit_confirm() {
        let mut e = engine();
        e.load(sequential());
        e.handle_pointer(PointerEvent::Down { x: 30.0, y: 10.0 });
        e.handle_pointer(PointerEvent::Move { x: 190.0, y: 10.0 });
        assert!(e.preview().is_some());
        let out = e.handle_pointer(PointerEvent::Up { x: 190.0, y: 10.0 });

        let DragOutcome::Committed { update, strategy, .. } = out else {
            panic!("expected commit, got {out:?}");
        };
        assert_eq!(strategy, ResolutionStrategy::SnapToGap);
        assert_eq!(e.assignment().placement_of("P1"), Some(update.placement()));
        assert_eq!(e.pending_commits().count(), 1);

        assert_eq!(e.confirm_commit("P1"), Ok(update));
        assert_eq!(e.pending_commits().count(), 0);
        assert!(e.confirm_commit("P1").is_err());
    }

    #[test]
    fn test_rejected_commit_reverts() {
        let mut e = engine();
        e.load(sequential());
        e.handle_pointer(PointerEvent::Down { x: 100.0, y: 10.0 });
        e.handle_pointer(PointerEvent::Move { x: 100.0, y: 50.0 });
        e.handle_pointer(PointerEvent::Up { x: 100.0, y: 50.0 });
        assert_eq!(e.assignment().row_of("P1"), Some(1));

        let p = e.reject_commit("P1").unwrap();
        assert_eq!(p, Placement::new(0, DateSpan::new(d(1), d(10))));
        assert_eq!(e.assignment().row_of("P1"), Some(0));
        assert_eq!(e.intervals()[0].row, Some(0));
        assert!(check_no_overlap(e.assignment()).is_ok());
    }

    /// Drags P1 straight down from `from_y` to `to_y` at x 100.
    fn drag_down(e: &mut TimelineEngine, from_y: f64, to_y: f64) -> IntervalUpdated {
        e.handle_pointer(PointerEvent::Down { x: 100.0, y: from_y });
        e.handle_pointer(PointerEvent::Move { x: 100.0, y: to_y });
        match e.handle_pointer(PointerEvent::Up { x: 100.0, y: to_y }) {
            DragOutcome::Committed { update, .. } => update,
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn test_outstanding_commits_rejected_in_order() {
        let mut e = engine();
        e.load(sequential());
        let origin = Placement::new(0, DateSpan::new(d(1), d(10)));
        assert_eq!(drag_down(&mut e, 10.0, 50.0).new_row, 1);
        assert_eq!(drag_down(&mut e, 40.0, 80.0).new_row, 2);
        assert_eq!(e.assignment().row_of("P1"), Some(2));

        let pending: Vec<PendingCommit> = e.pending_commits().collect();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|c| c.origin == origin && !c.superseded));

        assert_eq!(e.reject_commit("P1"), Ok(origin));
        assert_eq!(e.assignment().row_of("P1"), Some(0));
        assert_eq!(e.pending_commits().count(), 1);

        assert_eq!(e.reject_commit("P1"), Ok(origin));
        assert_eq!(e.intervals()[0].row, Some(0));
        assert_eq!(
            e.reject_commit("P1"),
            Err(EngineError::NoPendingCommit("P1".into()))
        );
        assert!(check_no_overlap(e.assignment()).is_ok());
    }

    #[test]
    fn test_reject_after_confirm_restores_confirmed_placement() {
        let mut e = engine();
        e.load(sequential());
        let first = drag_down(&mut e, 10.0, 50.0);
        drag_down(&mut e, 40.0, 80.0);

        assert_eq!(e.confirm_commit("P1"), Ok(first.clone()));
        assert_eq!(e.assignment().row_of("P1"), Some(2));
        assert_eq!(
            e.pending_commits().map(|c| c.origin).collect::<Vec<_>>(),
            vec![first.placement()]
        );

        assert_eq!(e.reject_commit("P1"), Ok(first.placement()));
        assert_eq!(e.assignment().placement_of("P1"), Some(first.placement()));
        assert_eq!(e.pending_commits().count(), 0);
    }

    #[test]
    fn test_confirm_after_reject_applies_later_commit() {
        let mut e = engine();
        e.load(sequential());
        drag_down(&mut e, 10.0, 50.0);
        let second = drag_down(&mut e, 40.0, 80.0);

        e.reject_commit("P1").unwrap();
        assert_eq!(e.assignment().row_of("P1"), Some(0));
        assert_eq!(e.confirm_commit("P1"), Ok(second.clone()));
        assert_eq!(e.assignment().placement_of("P1"), Some(second.placement()));
        assert_eq!(e.intervals()[0].row, Some(2));
        assert!(e.confirm_commit("P1").is_err());
    }

    #[test]
    fn test_edit_supersedes_pending_commit() {
        let mut e = engine();
        e.load(sequential());
        drag_down(&mut e, 10.0, 50.0);

        let feb = |day| NaiveDate::from_ymd_opt(2024, 2, day).unwrap();
        let edited = e.update_dates("P1", feb(1), feb(5)).unwrap();
        assert_eq!(edited, Placement::new(1, DateSpan::new(feb(1), feb(5))));
        assert!(e.pending_commits().all(|c| c.superseded && c.origin == edited));

        // The store already holds the edit; the late rejection must not undo it.
        assert_eq!(e.reject_commit("P1"), Ok(edited));
        assert_eq!(e.intervals()[0].start, feb(1));
        assert_eq!(e.intervals()[0].end, feb(5));
        assert_eq!(e.pending_commits().count(), 0);
    }

    #[test]
    fn test_commit_keeps_left_edge_date() {
        let mut e = engine();
        e.load(vec![
            Interval::new("P1", d(1), d(10)),
            Interval::new("Z", d(5), add_days(d(1), 60)),
        ]);
        e.on_scroll(ScrollRegion::Body, 200.0);
        e.end_frame();
        assert_eq!(e.mapper().pixels_to_date(e.scroll_offset()), d(6));

        // P1 spans content x 0..360, viewport -200..160; move it one day later.
        e.handle_pointer(PointerEvent::Down { x: 100.0, y: 10.0 });
        e.handle_pointer(PointerEvent::Move { x: 140.0, y: 10.0 });
        let out = e.handle_pointer(PointerEvent::Up { x: 140.0, y: 10.0 });
        assert!(matches!(out, DragOutcome::Committed { ref update, .. } if update.new_start == d(2)));

        assert_eq!(e.mapper().anchor(), d(2));
        assert_eq!(e.scroll_offset(), 160.0);
        assert_eq!(e.mapper().pixels_to_date(e.scroll_offset()), d(6));
    }

    #[test]
    fn test_pointer_uses_scroll_offset() {
        let mut e = engine();
        e.load(vec![
            Interval::new("A", d(1), d(5)),
            Interval::new("B", d(25), d(30)),
        ]);
        assert_eq!(e.timeline_width(), 1160.0);
        // Scroll so B (x 960..1160) is visible at viewport x 600..800.
        assert_eq!(
            e.on_scroll(ScrollRegion::Body, 360.0),
            ScrollSync::Mirrored {
                target: ScrollRegion::Header,
                offset: 360.0
            }
        );
        let out = e.handle_pointer(PointerEvent::Down { x: 700.0, y: 5.0 });
        assert!(matches!(out, DragOutcome::Armed { ref id, .. } if id == "B"));
    }

    #[test]
    fn test_autoscroll_follows_pointer() {
        let mut e = engine();
        e.load(vec![
            Interval::new("A", d(1), d(5)),
            Interval::new("B", d(25), d(30)),
        ]);
        e.handle_pointer(PointerEvent::Down { x: 80.0, y: 5.0 });
        e.handle_pointer(PointerEvent::Move { x: 795.0, y: 5.0 });
        assert_eq!(e.drag_phase(), DragPhase::Dragging);

        let before = e.preview().map(|b| b.x);
        let delta = e.tick_autoscroll().unwrap();
        assert!(delta > 0.0);
        assert_eq!(e.scroll_offset(), delta);
        let after = e.preview().map(|b| b.x);
        assert!(after >= before);

        e.handle_pointer(PointerEvent::Cancel);
        assert_eq!(e.tick_autoscroll(), None);
        assert_eq!(e.assignment().placement_of("A").map(|p| p.start()), Some(d(1)));
    }
}
