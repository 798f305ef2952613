//! One-directional event queue from the input context to the state context.
//!
//! The input context (pointer recognizers) only ever sends; the
//! state-owning context is the sole reader and the sole writer of drag
//! state. Sending is fire-and-forget.
//!
//! # Coalescing
//!
//! Under load the state context may fall behind the pointer sampling rate.
//! [`DragEventReceiver::drain_coalesced`] collapses each run of consecutive
//! `Update` events into its latest sample. `Start`, `End`, `Cancel` and
//! `Preempted` are never dropped or reordered, so the two contexts cannot
//! desynchronize on gesture boundaries.
//!
//! # Gesture identity
//!
//! Every recognized gesture takes a fresh [`GestureId`] from a counter
//! shared by all clones of one sender. `Update`, `End` and `Cancel` carry
//! it, and the engine drops any that do not belong to the drag it is
//! running. A recognizer whose gesture is no longer the latest knows it
//! was superseded.

use super::arbiter::ClaimTicket;
use crate::model::EngineError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

/// Why a drag was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The user cancelled (e.g. pressed Escape).
    Explicit,
    /// A newer drag took over.
    Preempted,
    /// The host list went away.
    Unmount,
    /// The caller replaced the sequence and the dragged item is gone.
    SequenceChanged,
}

/// Identity of one recognized gesture on one engine's channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GestureId(u64);

impl GestureId {
    /// Wrap a raw id, e.g. when replaying recorded events.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// A gesture transition marshalled to the state context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEvent {
    /// A press on `index`'s drag handle was recognized as a drag.
    Start {
        /// Row index being dragged.
        index: usize,
        /// Identity of the new gesture.
        gesture: GestureId,
    },
    /// The pointer moved.
    Update {
        /// Gesture the sample belongs to.
        gesture: GestureId,
        /// Pointer travel since start, compensated for scrolling.
        offset: f32,
        /// Raw pointer position in viewport coordinates.
        absolute_y: f32,
    },
    /// The pointer was released.
    End {
        /// Gesture being released.
        gesture: GestureId,
    },
    /// The gesture was abandoned.
    Cancel {
        /// Gesture being abandoned.
        gesture: GestureId,
        /// Why.
        reason: CancelReason,
    },
    /// Another list claimed the process-wide drag slot.
    Preempted {
        /// The claim that was revoked.
        ticket: ClaimTicket,
    },
}

impl DragEvent {
    /// Whether this is a coalescable pointer sample.
    pub fn is_update(&self) -> bool {
        matches!(self, DragEvent::Update { .. })
    }

    /// The gesture this event belongs to; `None` for arbiter notices.
    pub fn gesture(&self) -> Option<GestureId> {
        match *self {
            DragEvent::Start { gesture, .. }
            | DragEvent::Update { gesture, .. }
            | DragEvent::End { gesture }
            | DragEvent::Cancel { gesture, .. } => Some(gesture),
            DragEvent::Preempted { .. } => None,
        }
    }
}

/// Create a connected sender/receiver pair.
pub fn drag_channel() -> (DragEventSender, DragEventReceiver) {
    let (tx, rx) = mpsc::channel();
    let sender = DragEventSender {
        tx,
        latest: Arc::new(AtomicU64::new(0)),
    };
    (sender, DragEventReceiver { rx })
}

/// Input-context end of the queue. Cheap to clone; one per recognizer.
#[derive(Debug, Clone)]
pub struct DragEventSender {
    tx: mpsc::Sender<DragEvent>,
    latest: Arc<AtomicU64>,
}

impl DragEventSender {
    /// Allocate the id for a gesture that is about to start.
    ///
    /// Every earlier gesture on this channel is superseded from now on.
    pub fn begin_gesture(&self) -> GestureId {
        GestureId(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether `gesture` is the most recently started one on this channel.
    pub fn is_latest(&self, gesture: GestureId) -> bool {
        self.latest.load(Ordering::Acquire) == gesture.0
    }

    /// Enqueue `event` without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Disconnected`] once the engine is gone.
    pub fn send(&self, event: DragEvent) -> Result<(), EngineError> {
        self.tx.send(event).map_err(|_| EngineError::Disconnected)
    }
}

/// State-context end of the queue.
#[derive(Debug)]
pub struct DragEventReceiver {
    rx: mpsc::Receiver<DragEvent>,
}

impl DragEventReceiver {
    /// Take every queued event, collapsing runs of updates to the latest.
    pub fn drain_coalesced(&self) -> Vec<DragEvent> {
        let mut events: Vec<DragEvent> = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    let same_run = |last: &DragEvent| {
                        last.is_update() && last.gesture() == event.gesture()
                    };
                    let replaces_last = event.is_update() && events.last().is_some_and(same_run);
                    if replaces_last {
                        events.pop();
                    }
                    events.push(event);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    /// Block up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<DragEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
