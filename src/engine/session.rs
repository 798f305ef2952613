//! DragSession - the only mutable drag state.
//!
//! # State Machine
//!
//! ```text
//!            start(i)                 update(offset)
//!   Idle ───────────────▶ Dragging ◀──────────────┐
//!    ▲                      │  │                   │
//!    │        end()         │  └───────────────────┘
//!    ├──────────────────────┤
//!    │        cancel()      │
//!    └──────────────────────┘
//! ```
//!
//! `active_index` is `Some` iff a gesture is in progress. While dragging,
//! `destination_index` is always a valid index into the sequence the
//! session was last resolved against.
//!
//! `update` and `end` are no-ops while idle. `start` while already dragging
//! replaces the prior session without committing it; the displaced index is
//! returned so the caller can log the preemption.

use super::layout::LayoutRegistry;
use super::resolver::resolve_drop_index;
use crate::model::{clamp_index, LayoutBox, Reorder};

/// Whether a drag is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A gesture is in progress.
    Dragging,
}

/// State of one drag gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragSession {
    /// Index of the dragged item; `None` when idle.
    active_index: Option<usize>,
    /// Signed pointer travel since start, already scroll-compensated.
    pointer_offset: f32,
    /// Index the dragged item would occupy if released now.
    destination_index: Option<usize>,
    /// Box of the dragged item captured at start.
    origin: LayoutBox,
}

impl DragSession {
    /// Create an idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> DragPhase {
        if self.active_index.is_some() {
            DragPhase::Dragging
        } else {
            DragPhase::Idle
        }
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.active_index.is_some()
    }

    /// Index of the dragged item.
    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// Index the dragged item would land on.
    pub fn destination_index(&self) -> Option<usize> {
        self.destination_index
    }

    /// Signed pointer travel since the drag started.
    pub fn pointer_offset(&self) -> f32 {
        self.pointer_offset
    }

    /// Box of the dragged item when the drag started.
    pub fn origin(&self) -> LayoutBox {
        self.origin
    }

    /// Current center of the dragged item in content coordinates.
    pub fn dragged_center(&self) -> f32 {
        self.origin.center() + self.pointer_offset
    }

    /// Begin dragging `index`, whose box at this instant is `origin`.
    ///
    /// Returns the index of a session that was still active and has been
    /// discarded without a commit.
    pub fn start(&mut self, index: usize, origin: LayoutBox) -> Option<usize> {
        let preempted = self.active_index;
        self.active_index = Some(index);
        self.pointer_offset = 0.0;
        self.destination_index = Some(index);
        self.origin = origin;
        preempted
    }

    /// Record new pointer travel and re-resolve the destination.
    ///
    /// Returns the new destination when it changed. Non-finite offsets keep
    /// the previous offset.
    pub fn update(
        &mut self,
        offset: f32,
        registry: &LayoutRegistry,
        item_count: usize,
    ) -> Option<usize> {
        if self.active_index.is_none() || item_count == 0 {
            return None;
        }
        if offset.is_finite() {
            self.pointer_offset = offset;
        }
        let resolved = clamp_index(
            resolve_drop_index(self.dragged_center(), registry, item_count),
            item_count,
        );
        if self.destination_index == Some(resolved) {
            return None;
        }
        self.destination_index = Some(resolved);
        Some(resolved)
    }

    /// Finish the drag and reset to idle.
    ///
    /// Returns the move to commit when origin and destination differ. A
    /// missing destination is re-resolved from the last pointer offset
    /// instead of aborting the drag.
    pub fn end(&mut self, registry: &LayoutRegistry, item_count: usize) -> Option<Reorder> {
        let active = self.active_index?;
        let destination = self
            .destination_index
            .unwrap_or_else(|| resolve_drop_index(self.dragged_center(), registry, item_count));
        self.reset();

        if item_count == 0 {
            return None;
        }
        let reorder = Reorder::new(
            clamp_index(active, item_count),
            clamp_index(destination, item_count),
        );
        (!reorder.is_noop()).then_some(reorder)
    }

    /// Abandon the drag without committing.
    ///
    /// Returns the index that was being dragged, if any.
    pub fn cancel(&mut self) -> Option<usize> {
        let active = self.active_index;
        self.reset();
        active
    }

    /// Forget the destination so the next `end` re-resolves it.
    pub(crate) fn clear_destination(&mut self) {
        self.destination_index = None;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abcd() -> LayoutRegistry {
        let mut registry = LayoutRegistry::new();
        for i in 0..4 {
            registry.record(i, LayoutBox::new(i as f32 * 50.0, 50.0));
        }
        registry
    }

    fn start_on(session: &mut DragSession, registry: &LayoutRegistry, index: usize) {
        let origin = registry.get_or_estimate(index, 50.0);
        session.start(index, origin);
    }

    #[test]
    fn new_session_is_idle() {
        let session = DragSession::new();
        assert_eq!(session.phase(), DragPhase::Idle);
        assert_eq!(session.active_index(), None);
        assert_eq!(session.destination_index(), None);
    }

    #[test]
    fn start_sets_active_and_destination() {
        let registry = abcd();
        for i in 0..4 {
            let mut session = DragSession::new();
            start_on(&mut session, &registry, i);
            assert_eq!(session.phase(), DragPhase::Dragging);
            assert_eq!(session.active_index(), Some(i));
            assert_eq!(session.destination_index(), Some(i));
            assert_eq!(session.pointer_offset(), 0.0);
        }
    }

    #[test]
    fn update_resolves_forward_destination() {
        let registry = abcd();
        let mut session = DragSession::new();
        start_on(&mut session, &registry, 0);

        let changed = session.update(120.0, &registry, 4);

        assert_eq!(session.dragged_center(), 145.0);
        assert_eq!(changed, Some(2));
        assert_eq!(session.destination_index(), Some(2));
    }

    #[test]
    fn update_reports_only_changes() {
        let registry = abcd();
        let mut session = DragSession::new();
        start_on(&mut session, &registry, 0);

        assert_eq!(session.update(10.0, &registry, 4), None);
        assert_eq!(session.update(60.0, &registry, 4), Some(1));
        assert_eq!(session.update(65.0, &registry, 4), None);
    }

    #[test]
    fn update_while_idle_is_noop() {
        let registry = abcd();
        let mut session = DragSession::new();
        assert_eq!(session.update(100.0, &registry, 4), None);
        assert_eq!(session, DragSession::new());
    }

    #[test]
    fn non_finite_offset_keeps_previous() {
        let registry = abcd();
        let mut session = DragSession::new();
        start_on(&mut session, &registry, 0);
        session.update(60.0, &registry, 4);
        session.update(f32::NAN, &registry, 4);
        assert_eq!(session.pointer_offset(), 60.0);
        assert_eq!(session.destination_index(), Some(1));
    }

    #[test]
    fn end_returns_reorder_and_resets() {
        let registry = abcd();
        let mut session = DragSession::new();
        start_on(&mut session, &registry, 3);
        session.update(-120.0, &registry, 4);

        let reorder = session.end(&registry, 4);

        assert_eq!(reorder, Some(Reorder::new(3, 1)));
        assert_eq!(session.phase(), DragPhase::Idle);
        assert_eq!(session.destination_index(), None);
    }

    #[test]
    fn end_without_movement_commits_nothing() {
        let registry = abcd();
        let mut session = DragSession::new();
        start_on(&mut session, &registry, 1);
        assert_eq!(session.end(&registry, 4), None);
        assert!(!session.is_dragging());
    }

    #[test]
    fn end_while_idle_is_noop() {
        let registry = abcd();
        let mut session = DragSession::new();
        assert_eq!(session.end(&registry, 4), None);
    }

    #[test]
    fn end_without_destination_resolves_from_pointer() {
        let registry = abcd();
        let mut session = DragSession::new();
        start_on(&mut session, &registry, 0);
        session.update(120.0, &registry, 4);
        session.clear_destination();

        assert_eq!(session.end(&registry, 4), Some(Reorder::new(0, 2)));
    }

    #[test]
    fn start_while_dragging_discards_prior() {
        let registry = abcd();
        let mut session = DragSession::new();
        start_on(&mut session, &registry, 0);
        session.update(120.0, &registry, 4);

        let preempted = session.start(3, registry.get_or_estimate(3, 50.0));

        assert_eq!(preempted, Some(0));
        assert_eq!(session.active_index(), Some(3));
        assert_eq!(session.destination_index(), Some(3));
        assert_eq!(session.pointer_offset(), 0.0);
    }

    #[test]
    fn cancel_resets_without_reorder() {
        let registry = abcd();
        let mut session = DragSession::new();
        start_on(&mut session, &registry, 2);
        session.update(-100.0, &registry, 4);

        assert_eq!(session.cancel(), Some(2));
        assert_eq!(session, DragSession::new());
        assert_eq!(session.cancel(), None);
    }

    #[test]
    fn destination_clamped_when_records_exceed_count() {
        let registry = abcd();
        let mut session = DragSession::new();
        start_on(&mut session, &registry, 0);
        // Sequence shrank to 2 but records for 2 and 3 linger
        session.update(150.0, &registry, 2);
        assert_eq!(session.destination_index(), Some(1));
    }
}
