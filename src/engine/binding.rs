//! GestureBinding - per-item pointer recognizer on the input context.
//!
//! Translates raw press/move/release samples on one item's drag handle into
//! [`DragEvent`]s for the state context. Only the handle region reacts, so
//! presses elsewhere on the row stay available to the host's scroll
//! gesture.
//!
//! # Recognition
//!
//! ```text
//!  Idle ──press in handle──▶ Pending ──held >= activation_delay──▶ Active
//!   ▲                          │  moved > slop before delay           │
//!   │                          ▼                                      │
//!   └──────────────────── (abort: host scrolls) ◀── release / cancel ─┘
//! ```
//!
//! While active, every move is sent as an update whose offset is the raw
//! pointer travel plus the scroll distance accrued since activation, so the
//! dragged item tracks the pointer even while the surface auto-scrolls.
//! The raw viewport position goes to the auto-scroll controller.
//!
//! A binding whose gesture was superseded by a newer one on the same
//! engine goes idle on its next sample and sends nothing further.

use super::autoscroll::AutoScrollController;
use super::channel::{CancelReason, DragEvent, DragEventSender, GestureId};
use super::surface::ScrollSurface;
use crate::model::EngineError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Horizontal band of a row that starts drags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleRegion {
    /// Left edge relative to the row.
    pub left: f32,
    /// Width of the band.
    pub width: f32,
}

impl HandleRegion {
    /// Create a handle band.
    pub fn new(left: f32, width: f32) -> Self {
        Self { left, width }
    }

    /// A band covering the whole row.
    pub fn whole_row() -> Self {
        Self {
            left: 0.0,
            width: f32::INFINITY,
        }
    }

    /// Whether a row-relative `x` falls inside the band.
    pub fn contains(&self, x: f32) -> bool {
        x >= self.left && x < self.left + self.width
    }
}

/// Recognizer tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BindingConfig {
    /// Hold time before a press becomes a drag.
    pub activation_delay: Duration,
    /// Movement tolerated during the hold before the press is abandoned.
    pub touch_slop: f32,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            activation_delay: Duration::from_millis(200),
            touch_slop: 8.0,
        }
    }
}

/// What a pointer sample did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureResponse {
    /// Not for this binding.
    Ignored,
    /// Press is being held, not yet a drag.
    Pending,
    /// Drag started on this sample.
    Started,
    /// Drag in progress; update sent.
    Dragging,
    /// Press moved too far before activation; the host should scroll.
    Aborted,
    /// Press released before activation.
    Tapped,
    /// Drag released; end sent.
    Released,
    /// Drag cancelled; cancel sent.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Recognizer {
    Idle,
    Pending { pressed_at: Instant, origin_y: f32 },
    Active {
        gesture: GestureId,
        origin_y: f32,
        baseline_scroll: f32,
    },
}

/// Pointer recognizer bound to the drag handle of the row at `index`.
pub struct GestureBinding {
    index: usize,
    handle: HandleRegion,
    config: BindingConfig,
    sender: DragEventSender,
    surface: Arc<dyn ScrollSurface>,
    autoscroll: Option<Arc<AutoScrollController>>,
    state: Recognizer,
}

impl GestureBinding {
    /// Bind a recognizer to row `index`.
    pub fn new(
        index: usize,
        handle: HandleRegion,
        config: BindingConfig,
        sender: DragEventSender,
        surface: Arc<dyn ScrollSurface>,
    ) -> Self {
        Self {
            index,
            handle,
            config,
            sender,
            surface,
            autoscroll: None,
            state: Recognizer::Idle,
        }
    }

    /// Forward raw pointer positions to `autoscroll` while dragging.
    pub fn with_autoscroll(mut self, autoscroll: Arc<AutoScrollController>) -> Self {
        self.autoscroll = Some(autoscroll);
        self
    }

    /// Row this binding belongs to.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether a drag is in progress on this binding.
    ///
    /// False once a newer gesture on the same engine has started.
    pub fn is_active(&self) -> bool {
        match self.state {
            Recognizer::Active { gesture, .. } => self.sender.is_latest(gesture),
            _ => false,
        }
    }

    /// Whether a press is being held but has not activated yet.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, Recognizer::Pending { .. })
    }

    /// Pointer pressed at row-relative `x`, viewport `y`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Disconnected`] if a zero activation delay
    /// starts the drag immediately and the engine is gone.
    pub fn press(&mut self, x: f32, y: f32, now: Instant) -> Result<GestureResponse, EngineError> {
        if !self.handle.contains(x) || !matches!(self.state, Recognizer::Idle) {
            return Ok(GestureResponse::Ignored);
        }
        self.state = Recognizer::Pending {
            pressed_at: now,
            origin_y: y,
        };
        trace!(index = self.index, y, "Handle pressed");
        if self.config.activation_delay.is_zero() {
            self.activate(y)?;
            return Ok(GestureResponse::Started);
        }
        Ok(GestureResponse::Pending)
    }

    /// Activate a held press once the delay has elapsed without movement.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Disconnected`] if the engine is gone.
    pub fn poll(&mut self, now: Instant) -> Result<GestureResponse, EngineError> {
        if self.yield_if_superseded() {
            return Ok(GestureResponse::Ignored);
        }
        match self.state {
            Recognizer::Pending { pressed_at, origin_y } if self.delay_elapsed(pressed_at, now) => {
                self.activate(origin_y)?;
                Ok(GestureResponse::Started)
            }
            Recognizer::Pending { .. } => Ok(GestureResponse::Pending),
            Recognizer::Active { .. } => Ok(GestureResponse::Dragging),
            Recognizer::Idle => Ok(GestureResponse::Ignored),
        }
    }

    /// Pointer moved to viewport `y`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Disconnected`] if the engine is gone; the
    /// binding resets to idle.
    pub fn move_to(&mut self, y: f32, now: Instant) -> Result<GestureResponse, EngineError> {
        if self.yield_if_superseded() {
            return Ok(GestureResponse::Ignored);
        }
        match self.state {
            Recognizer::Idle => Ok(GestureResponse::Ignored),
            Recognizer::Pending { pressed_at, origin_y } => {
                if self.delay_elapsed(pressed_at, now) {
                    self.activate(origin_y)?;
                    self.send_update(y)?;
                    Ok(GestureResponse::Started)
                } else if (y - origin_y).abs() > self.config.touch_slop {
                    trace!(
                        index = self.index,
                        "Press moved before activation; yielding to scroll"
                    );
                    self.state = Recognizer::Idle;
                    Ok(GestureResponse::Aborted)
                } else {
                    Ok(GestureResponse::Pending)
                }
            }
            Recognizer::Active { .. } => {
                self.send_update(y)?;
                Ok(GestureResponse::Dragging)
            }
        }
    }

    /// Pointer released.
    ///
    /// Stops auto-scroll before the end event is sent so the surface is
    /// still when the state context resolves the drop.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Disconnected`] if the engine is gone.
    pub fn release(&mut self, now: Instant) -> Result<GestureResponse, EngineError> {
        if self.yield_if_superseded() {
            return Ok(GestureResponse::Ignored);
        }
        match self.state {
            Recognizer::Idle => Ok(GestureResponse::Ignored),
            Recognizer::Pending { pressed_at, origin_y } => {
                if self.delay_elapsed(pressed_at, now) {
                    // Held long enough but no poll happened in between
                    let gesture = self.activate(origin_y)?;
                    self.finish(DragEvent::End { gesture }, GestureResponse::Released)
                } else {
                    self.state = Recognizer::Idle;
                    Ok(GestureResponse::Tapped)
                }
            }
            Recognizer::Active { gesture, .. } => {
                self.finish(DragEvent::End { gesture }, GestureResponse::Released)
            }
        }
    }

    /// Abandon the gesture.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Disconnected`] if the engine is gone.
    pub fn cancel(&mut self, reason: CancelReason) -> Result<GestureResponse, EngineError> {
        if self.yield_if_superseded() {
            return Ok(GestureResponse::Ignored);
        }
        match self.state {
            Recognizer::Idle => Ok(GestureResponse::Ignored),
            Recognizer::Pending { .. } => {
                self.state = Recognizer::Idle;
                Ok(GestureResponse::Ignored)
            }
            Recognizer::Active { gesture, .. } => {
                self.finish(DragEvent::Cancel { gesture, reason }, GestureResponse::Cancelled)
            }
        }
    }

    fn delay_elapsed(&self, pressed_at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(pressed_at) >= self.config.activation_delay
    }

    /// Drop back to idle if a newer gesture took over the engine.
    ///
    /// Auto-scroll is left alone; it now follows the newer gesture.
    fn yield_if_superseded(&mut self) -> bool {
        let superseded = matches!(
            self.state,
            Recognizer::Active { gesture, .. } if !self.sender.is_latest(gesture)
        );
        if superseded {
            debug!(index = self.index, "Gesture superseded by a newer drag");
            self.state = Recognizer::Idle;
        }
        superseded
    }

    fn activate(&mut self, origin_y: f32) -> Result<GestureId, EngineError> {
        let baseline_scroll = self.surface.scroll_offset();
        let gesture = self.sender.begin_gesture();
        self.state = Recognizer::Active {
            gesture,
            origin_y,
            baseline_scroll,
        };
        debug!(index = self.index, baseline_scroll, "Drag recognized");
        self.send(DragEvent::Start {
            index: self.index,
            gesture,
        })?;
        Ok(gesture)
    }

    fn send_update(&mut self, y: f32) -> Result<(), EngineError> {
        let Recognizer::Active {
            gesture,
            origin_y,
            baseline_scroll,
        } = self.state
        else {
            return Ok(());
        };
        let scroll_delta = self.surface.scroll_offset() - baseline_scroll;
        let offset = (y - origin_y) + scroll_delta;
        if let Some(autoscroll) = &self.autoscroll {
            autoscroll.on_pointer_moved(y);
        }
        self.send(DragEvent::Update {
            gesture,
            offset,
            absolute_y: y,
        })
    }

    fn finish(
        &mut self,
        event: DragEvent,
        response: GestureResponse,
    ) -> Result<GestureResponse, EngineError> {
        if let Some(autoscroll) = &self.autoscroll {
            autoscroll.stop();
        }
        self.state = Recognizer::Idle;
        self.sender.send(event)?;
        Ok(response)
    }

    fn send(&mut self, event: DragEvent) -> Result<(), EngineError> {
        let result = self.sender.send(event);
        if result.is_err() {
            if let Some(autoscroll) = &self.autoscroll {
                autoscroll.stop();
            }
            self.state = Recognizer::Idle;
        }
        result
    }
}

impl Drop for GestureBinding {
    fn drop(&mut self) {
        if self.is_active() {
            // The engine may already be gone; nothing left to tell it then
            let _ = self.cancel(CancelReason::Unmount);
        }
    }
}

impl std::fmt::Debug for GestureBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureBinding")
            .field("index", &self.index)
            .field("handle", &self.handle)
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "binding_tests.rs"]
mod tests;
