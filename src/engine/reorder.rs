//! ReorderEngine - the state-owning context.
//!
//! Owns the drag session, the layout registry and the caller's sequence, and
//! is their only writer. Gesture recognizers on the input context talk to it
//! exclusively through the [`DragEvent`] channel; the host calls
//! [`ReorderEngine::pump`] once per frame to apply queued events, advance
//! the settle animation and commit finished drags.
//!
//! # Lifecycle
//!
//! ```text
//!          Start                End (moved)          settle done
//!   Idle ────────▶ Dragging ─────────────▶ Settling ────────────▶ Idle (+ commit)
//!    ▲               │  │ End (in place)                ▲
//!    │               │  └──────────▶ Idle               │ Start / set_sequence /
//!    └── Cancel ─────┘                                  │ unmount: commit now
//! ```
//!
//! A new drag always wins: starting while another drag is active, in this
//! engine or in any engine sharing the same [`DragArbiter`], cancels the
//! older drag without committing it. Queued events stamped with an older
//! [`GestureId`] are dropped, so a superseded recognizer can never move or
//! release the newer drag.

use super::arbiter::{ClaimTicket, DragArbiter, EngineId};
use super::autoscroll::{AutoScrollConfig, AutoScrollController};
use super::binding::BindingConfig;
use super::channel::{
    drag_channel, CancelReason, DragEvent, DragEventReceiver, DragEventSender, GestureId,
};
use super::commit::{DragEnd, ReorderCommitter};
use super::haptics::{HapticPulse, Haptics, TracingHaptics};
use super::layout::LayoutRegistry;
use super::motion::{ItemMotion, ItemMotionPresenter, MotionInput};
use super::session::{DragPhase, DragSession};
use super::settle::{slot_displacement, SettleAnimation};
use crate::model::{clamp_index, LayoutBox, OrderedSequence, Reorder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

// ===== Configuration =====

/// Tuning for one engine and the recognizers bound to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Hold time before a press becomes a drag.
    pub activation_delay: Duration,
    /// Movement tolerated during the hold.
    pub touch_slop: f32,
    /// Edge-zone scrolling.
    pub autoscroll: AutoScrollConfig,
    /// Height assumed for items that have not been measured.
    pub default_item_height: f32,
    /// Length of the release animation. Zero commits on release.
    pub settle_duration: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            activation_delay: Duration::from_millis(200),
            touch_slop: 8.0,
            autoscroll: AutoScrollConfig::default(),
            default_item_height: 50.0,
            settle_duration: Duration::from_millis(150),
        }
    }
}

impl EngineConfig {
    /// Recognizer settings derived from this config.
    pub fn binding_config(&self) -> BindingConfig {
        BindingConfig {
            activation_delay: self.activation_delay,
            touch_slop: self.touch_slop,
        }
    }
}

// ===== Render snapshot =====

/// Read-only values a host needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    /// Index of the dragged (or settling) item.
    pub active_index: Option<usize>,
    /// Where the dragged item lands.
    pub destination_index: Option<usize>,
    /// Height of the dragged item, for reserving its slot.
    pub dragged_height: Option<f32>,
    /// One entry per item, in index order.
    pub motions: Vec<ItemMotion>,
    /// Settle animation progress in `[0, 1]` while settling.
    pub settle_progress: Option<f32>,
}

impl RenderState {
    /// Displacement of the item at `index`; 0 for unknown indices.
    pub fn displacement(&self, index: usize) -> f32 {
        self.motions
            .get(index)
            .map_or(0.0, |motion| motion.displacement)
    }
}

#[derive(Debug, Clone, Copy)]
struct Settling {
    animation: SettleAnimation,
    reorder: Reorder,
    height: f32,
}

// ===== Engine =====

/// Drag-and-drop reordering engine for one list.
pub struct ReorderEngine<T: Clone> {
    config: EngineConfig,
    sequence: OrderedSequence<T>,
    layout: LayoutRegistry,
    session: DragSession,
    committer: ReorderCommitter<T>,
    haptics: Box<dyn Haptics>,
    arbiter: Arc<DragArbiter>,
    engine_id: EngineId,
    ticket: Option<ClaimTicket>,
    gesture: Option<GestureId>,
    active_key: Option<String>,
    sender: DragEventSender,
    receiver: DragEventReceiver,
    autoscroll: Option<Arc<AutoScrollController>>,
    settling: Option<Settling>,
    last_cancel: Option<CancelReason>,
}

impl<T: Clone> ReorderEngine<T> {
    /// Create an idle engine over `sequence`, registered with the
    /// process-wide arbiter.
    pub fn new(sequence: OrderedSequence<T>, config: EngineConfig) -> Self {
        let arbiter = DragArbiter::global();
        let engine_id = arbiter.register();
        let (sender, receiver) = drag_channel();
        Self {
            config,
            sequence,
            layout: LayoutRegistry::new(),
            session: DragSession::new(),
            committer: ReorderCommitter::new(),
            haptics: Box::new(TracingHaptics),
            arbiter,
            engine_id,
            ticket: None,
            gesture: None,
            active_key: None,
            sender,
            receiver,
            autoscroll: None,
            settling: None,
            last_cancel: None,
        }
    }

    /// Share a different arbiter (e.g. one per window, or one per test).
    pub fn with_arbiter(mut self, arbiter: Arc<DragArbiter>) -> Self {
        self.engine_id = arbiter.register();
        self.arbiter = arbiter;
        self
    }

    /// Replace the haptics collaborator.
    pub fn with_haptics(mut self, haptics: Box<dyn Haptics>) -> Self {
        self.haptics = haptics;
        self
    }

    /// Stop `autoscroll` whenever a drag ends, is cancelled or unmounts.
    pub fn with_autoscroll(mut self, autoscroll: Arc<AutoScrollController>) -> Self {
        self.autoscroll = Some(autoscroll);
        self
    }

    /// Install the completion callback.
    pub fn on_drag_end<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&DragEnd<T>) + Send + 'static,
    {
        self.committer.set_on_drag_end(Box::new(callback));
        self
    }

    // ----- Accessors -----

    /// Engine tuning.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A sender for the input context. Clone one per recognizer.
    pub fn sender(&self) -> DragEventSender {
        self.sender.clone()
    }

    /// Identity within the arbiter.
    pub fn engine_id(&self) -> EngineId {
        self.engine_id
    }

    /// The current (last committed) sequence.
    pub fn sequence(&self) -> &OrderedSequence<T> {
        &self.sequence
    }

    /// Measured layout.
    pub fn layout(&self) -> &LayoutRegistry {
        &self.layout
    }

    /// Drag state.
    pub fn session(&self) -> &DragSession {
        &self.session
    }

    /// Whether a drag gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        self.session.phase() == DragPhase::Dragging
    }

    /// Whether a released drag is still animating into place.
    pub fn is_settling(&self) -> bool {
        self.settling.is_some()
    }

    /// Why the most recent drag was cancelled.
    pub fn last_cancel(&self) -> Option<CancelReason> {
        self.last_cancel
    }

    // ----- Host callbacks -----

    /// Record the measured box of the item at `index`.
    ///
    /// Non-finite boxes are dropped; the previous record (if any) stays.
    pub fn on_layout(&mut self, index: usize, layout: LayoutBox) {
        if !layout.is_finite() {
            warn!(index, ?layout, "Ignoring non-finite layout");
            return;
        }
        self.layout.record(index, layout);
    }

    /// Apply every queued event, then advance the settle animation.
    ///
    /// Runs of pointer updates are coalesced to their latest sample.
    /// Returns how many events were applied.
    pub fn pump(&mut self, now: Instant) -> usize {
        let events = self.receiver.drain_coalesced();
        let count = events.len();
        for event in events {
            self.handle_event(event, now);
        }
        self.advance(now);
        count
    }

    /// Apply one event from the input context.
    ///
    /// `Update`, `End` and `Cancel` only apply to the gesture that started
    /// the current drag; anything else is dropped.
    pub fn handle_event(&mut self, event: DragEvent, now: Instant) {
        trace!(?event, "Drag event");
        match event {
            DragEvent::Start { index, gesture } => {
                self.start_drag(index, now);
                if self.is_dragging() {
                    self.gesture = Some(gesture);
                }
            }
            DragEvent::Update { gesture, .. }
            | DragEvent::End { gesture }
            | DragEvent::Cancel { gesture, .. }
                if self.gesture != Some(gesture) =>
            {
                debug!(?gesture, "Ignoring event from superseded gesture");
            }
            DragEvent::Update { offset, .. } => self.update_drag_position(offset),
            DragEvent::End { .. } => {
                self.end_drag(now);
            }
            DragEvent::Cancel { reason, .. } => self.cancel_drag(reason),
            DragEvent::Preempted { ticket } => {
                if self.ticket == Some(ticket) {
                    self.cancel_drag(CancelReason::Preempted);
                } else {
                    trace!(?ticket, "Ignoring stale preemption notice");
                }
            }
        }
    }

    // ----- Drag transitions -----

    /// Begin dragging the item at `index`.
    ///
    /// `index` refers to the order on screen. A settling drag commits
    /// first, and `index` follows its item through that commit. An active
    /// drag (here or in another engine on the same arbiter) is cancelled.
    pub fn start_drag(&mut self, index: usize, now: Instant) {
        let index = match self.settling {
            Some(settling) => settling.reorder.map_index(index),
            None => index,
        };
        self.finish_settle();
        self.gesture = None;
        let len = self.sequence.len();
        if len == 0 {
            warn!(index, "Drag start on empty sequence ignored");
            return;
        }
        let index = clamp_index(index, len);
        let origin = self.layout.get_or_estimate(index, self.config.default_item_height);

        if let Some(previous) = self.session.start(index, origin) {
            warn!(previous, index, "New drag preempted active drag");
            self.last_cancel = Some(CancelReason::Preempted);
            self.stop_autoscroll();
        }
        if let Some(ticket) = self.ticket.take() {
            self.arbiter.release(ticket);
        }
        let claimed = self.arbiter.claim(self.engine_id, self.sender.clone());
        if let Some(victim) = claimed.preempted {
            debug!(?victim, "Took drag slot from another list");
        }
        self.ticket = Some(claimed.ticket);
        self.active_key = self.sequence.key_at(index);

        self.haptics.pulse(HapticPulse::DragStart);
        debug!(index, origin = ?origin, at = ?now, "Drag started");
    }

    /// Record scroll-compensated pointer travel and re-resolve the drop slot.
    pub fn update_drag_position(&mut self, offset: f32) {
        if let Some(destination) = self.session.update(offset, &self.layout, self.sequence.len()) {
            self.haptics.pulse(HapticPulse::Selection);
            debug!(destination, offset, "Destination changed");
        }
    }

    /// Release the drag.
    ///
    /// Returns the resolved move, if any. It is committed immediately when
    /// the settle duration is zero, otherwise once the animation finishes.
    pub fn end_drag(&mut self, now: Instant) -> Option<Reorder> {
        if !self.is_dragging() {
            return None;
        }
        self.stop_autoscroll();
        let pointer_offset = self.session.pointer_offset();
        let origin = self.session.origin();
        let reorder = self.session.end(&self.layout, self.sequence.len());
        self.release_claim();

        let Some(reorder) = reorder else {
            debug!("Dropped in place");
            return None;
        };

        if self.config.settle_duration.is_zero() {
            self.commit(reorder);
        } else {
            let target = slot_displacement(reorder, &self.layout, self.config.default_item_height);
            debug!(from = reorder.from, to = reorder.to, target, "Settling");
            let duration = self.config.settle_duration;
            self.settling = Some(Settling {
                animation: SettleAnimation::new(pointer_offset, target, now, duration),
                reorder,
                height: origin.height,
            });
        }
        Some(reorder)
    }

    /// Abandon the active drag without committing.
    pub fn cancel_drag(&mut self, reason: CancelReason) {
        let Some(index) = self.session.cancel() else {
            return;
        };
        self.stop_autoscroll();
        self.release_claim();
        self.last_cancel = Some(reason);
        info!(index, ?reason, "Drag cancelled");
    }

    /// Commit a finished settle animation. Returns whether a commit happened.
    pub fn advance(&mut self, now: Instant) -> bool {
        match self.settling {
            Some(settling) if settling.animation.is_finished(now) => {
                self.settling = None;
                self.commit(settling.reorder);
                true
            }
            _ => false,
        }
    }

    // ----- Caller-driven changes -----

    /// Replace the sequence with upstream data.
    ///
    /// A settling drag commits against the old sequence first. Layout
    /// records beyond the new length are pruned. An active drag survives
    /// only if its item still sits at the same index; otherwise it is
    /// cancelled.
    pub fn set_sequence(&mut self, sequence: OrderedSequence<T>) {
        self.finish_settle();
        let len = sequence.len();
        self.layout.prune(len);

        if let Some(active) = self.session.active_index() {
            let same_item = active < len && sequence.key_at(active) == self.active_key;
            self.sequence = sequence;
            if same_item {
                self.session.clear_destination();
                self.session
                    .update(self.session.pointer_offset(), &self.layout, len);
            } else {
                self.cancel_drag(CancelReason::SequenceChanged);
            }
        } else {
            self.sequence = sequence;
        }
    }

    /// Tear down: commit any settle, cancel any drag and stop scrolling.
    pub fn unmount(&mut self) {
        self.finish_settle();
        self.cancel_drag(CancelReason::Unmount);
        self.stop_autoscroll();
        self.release_claim();
    }

    // ----- Rendering -----

    /// Snapshot for drawing the frame at `now`.
    pub fn render_state(&self, now: Instant) -> RenderState {
        let count = self.sequence.len();
        let (input, settle_progress) = if let Some(settling) = &self.settling {
            let input = MotionInput {
                active_index: settling.reorder.from,
                destination_index: settling.reorder.to,
                active_height: settling.height,
                active_offset: settling.animation.value_at(now),
            };
            (Some(input), Some(settling.animation.progress(now)))
        } else {
            let input = match (self.session.active_index(), self.session.destination_index()) {
                (Some(active), destination) => Some(MotionInput {
                    active_index: active,
                    destination_index: destination.unwrap_or(active),
                    active_height: self.session.origin().height,
                    active_offset: self.session.pointer_offset(),
                }),
                (None, _) => None,
            };
            (input, None)
        };

        RenderState {
            active_index: input.map(|i| i.active_index),
            destination_index: input.map(|i| i.destination_index),
            dragged_height: input.map(|i| i.active_height),
            motions: ItemMotionPresenter::present(input.as_ref(), count),
            settle_progress,
        }
    }

    // ----- Internals -----

    fn finish_settle(&mut self) {
        if let Some(settling) = self.settling.take() {
            debug!("Settle interrupted; committing now");
            self.commit(settling.reorder);
        }
    }

    fn commit(&mut self, reorder: Reorder) {
        if let Some(next) = self.committer.commit(reorder, &self.sequence) {
            self.sequence = next;
            self.layout.apply_move(reorder.from, reorder.to);
        }
    }

    fn release_claim(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.arbiter.release(ticket);
        }
        self.gesture = None;
        self.active_key = None;
    }

    fn stop_autoscroll(&self) {
        if let Some(autoscroll) = &self.autoscroll {
            autoscroll.stop();
        }
    }
}

impl<T: Clone> Drop for ReorderEngine<T> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<T: Clone> std::fmt::Debug for ReorderEngine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReorderEngine")
            .field("engine_id", &self.engine_id)
            .field("len", &self.sequence.len())
            .field("session", &self.session)
            .field("settling", &self.settling)
            .field("last_cancel", &self.last_cancel)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "reorder_tests.rs"]
mod tests;
