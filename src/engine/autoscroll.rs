//! AutoScrollController - edge-zone driven scrolling of the host surface.
//!
//! While the dragged pointer sits inside the top or bottom edge zone of the
//! viewport, a repeating timer (independent of the pointer sampling rate)
//! nudges the host scroll offset. Speed grows with how deep the pointer is
//! inside the zone and never drops below a minimum, so scrolling does not
//! stall near the zone boundary.
//!
//! # Zones
//!
//! ```text
//!   0 ┬──────────────┐
//!     │   top zone   │  y < threshold           -> scroll up
//!     ├──────────────┤
//!     │  dead zone   │  threshold <= y <= h - threshold
//!     ├──────────────┤
//!     │ bottom zone  │  y > h - threshold       -> scroll down
//!   h ┴──────────────┘
//! ```
//!
//! At most one timer exists at a time. Switching direction stops and joins
//! the old timer before the new one starts, so two timers never mutate the
//! offset concurrently. After [`AutoScrollController::stop`] returns, no
//! further scroll mutation happens.

use super::surface::ScrollSurface;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Auto-scroll tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoScrollConfig {
    /// Depth of each edge zone.
    pub threshold: f32,
    /// Scroll distance per tick at full zone depth.
    pub speed: f32,
    /// Lower bound on the per-tick distance while inside a zone.
    pub min_speed: f32,
    /// Timer period.
    pub tick: Duration,
}

impl Default for AutoScrollConfig {
    fn default() -> Self {
        Self {
            threshold: 80.0,
            speed: 10.0,
            min_speed: 1.0,
            tick: Duration::from_millis(16),
        }
    }
}

/// Direction of an active auto-scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Decrease the scroll offset.
    Up,
    /// Increase the scroll offset.
    Down,
}

/// Which edge zone (if any) contains `y`.
///
/// Positions above the viewport count as the top zone and positions below
/// it as the bottom zone. When the zones overlap (viewport shorter than two
/// thresholds) the top zone wins.
pub fn zone_for(y: f32, viewport_height: f32, threshold: f32) -> Option<ScrollDirection> {
    if !y.is_finite() || threshold <= 0.0 {
        return None;
    }
    if y < threshold {
        Some(ScrollDirection::Up)
    } else if y > viewport_height - threshold {
        Some(ScrollDirection::Down)
    } else {
        None
    }
}

/// Per-tick scroll distance for a pointer at `y` inside `direction`'s zone.
///
/// Proportional to the pointer's depth into the zone, clamped into
/// `[min_speed, speed]`.
pub fn scroll_speed(
    direction: ScrollDirection,
    y: f32,
    viewport_height: f32,
    config: &AutoScrollConfig,
) -> f32 {
    let depth = match direction {
        ScrollDirection::Up => config.threshold - y,
        ScrollDirection::Down => y - (viewport_height - config.threshold),
    };
    let ratio = (depth / config.threshold).clamp(0.0, 1.0);
    (config.speed * ratio).max(config.min_speed)
}

/// Offset after one tick. Never scrolls above zero; the upper bound is the
/// host surface's responsibility.
pub fn scroll_step(direction: ScrollDirection, current: f32, speed: f32) -> f32 {
    match direction {
        ScrollDirection::Up => (current - speed).max(0.0),
        ScrollDirection::Down => current + speed,
    }
}

struct ScrollTimer {
    direction: ScrollDirection,
    stop: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// Drives the host surface while the pointer rests in an edge zone.
///
/// All methods take `&self`; share it behind an `Arc` between the input
/// context (which reports pointer positions) and the state context (which
/// stops it when a drag ends or is cancelled).
pub struct AutoScrollController {
    config: AutoScrollConfig,
    surface: Weak<dyn ScrollSurface>,
    viewport_height: AtomicU32,
    speed: Arc<AtomicU32>,
    timer: Mutex<Option<ScrollTimer>>,
}

impl AutoScrollController {
    /// Create a stopped controller for `surface`.
    ///
    /// Only a weak handle is kept: once the host drops the surface, ticks
    /// become silent no-ops and the timer exits.
    pub fn new(
        config: AutoScrollConfig,
        surface: &Arc<dyn ScrollSurface>,
        viewport_height: f32,
    ) -> Self {
        Self {
            config,
            surface: Arc::downgrade(surface),
            viewport_height: AtomicU32::new(viewport_height.to_bits()),
            speed: Arc::new(AtomicU32::new(0f32.to_bits())),
            timer: Mutex::new(None),
        }
    }

    /// The tuning this controller was built with.
    pub fn config(&self) -> &AutoScrollConfig {
        &self.config
    }

    /// Update the viewport height after a resize.
    pub fn set_viewport_height(&self, height: f32) {
        self.viewport_height.store(height.to_bits(), Ordering::Relaxed);
    }

    /// Current viewport height.
    pub fn viewport_height(&self) -> f32 {
        f32::from_bits(self.viewport_height.load(Ordering::Relaxed))
    }

    /// Direction of the running timer, if any.
    pub fn direction(&self) -> Option<ScrollDirection> {
        self.lock_timer().as_ref().map(|timer| timer.direction)
    }

    /// Per-tick distance the running timer applies.
    pub fn current_speed(&self) -> f32 {
        f32::from_bits(self.speed.load(Ordering::Relaxed))
    }

    /// React to a new pointer position in viewport coordinates.
    pub fn on_pointer_moved(&self, absolute_y: f32) {
        let viewport_height = self.viewport_height();
        let zone = zone_for(absolute_y, viewport_height, self.config.threshold);
        let mut timer = self.lock_timer();

        let Some(direction) = zone else {
            Self::stop_locked(&mut timer);
            return;
        };

        let speed = scroll_speed(direction, absolute_y, viewport_height, &self.config);
        self.speed.store(speed.to_bits(), Ordering::Relaxed);

        if timer.as_ref().map(|t| t.direction) != Some(direction) {
            Self::stop_locked(&mut timer);
            *timer = self.spawn_timer(direction);
        }
    }

    /// Stop scrolling. Returns once the timer thread has exited.
    pub fn stop(&self) {
        let mut timer = self.lock_timer();
        Self::stop_locked(&mut timer);
    }

    fn lock_timer(&self) -> MutexGuard<'_, Option<ScrollTimer>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stop_locked(timer: &mut Option<ScrollTimer>) {
        if let Some(timer) = timer.take() {
            // Send fails only if the thread already exited
            let _ = timer.stop.send(());
            if timer.handle.join().is_err() {
                warn!("Auto-scroll timer thread panicked");
            }
            debug!(direction = ?timer.direction, "Auto-scroll stopped");
        }
    }

    fn spawn_timer(&self, direction: ScrollDirection) -> Option<ScrollTimer> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let surface = Weak::clone(&self.surface);
        let speed = Arc::clone(&self.speed);
        let tick = self.config.tick;

        let spawned = thread::Builder::new()
            .name("dragorder-autoscroll".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(tick) {
                    Err(RecvTimeoutError::Timeout) => {
                        let Some(surface) = surface.upgrade() else {
                            trace!("Scroll surface dropped, auto-scroll exiting");
                            break;
                        };
                        let step = f32::from_bits(speed.load(Ordering::Relaxed));
                        let current = surface.scroll_offset();
                        let next = scroll_step(direction, current, step);
                        trace!(?direction, current, next, "Auto-scroll tick");
                        surface.scroll_to(next);
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            });

        match spawned {
            Ok(handle) => {
                debug!(?direction, "Auto-scroll started");
                Some(ScrollTimer {
                    direction,
                    stop: stop_tx,
                    handle,
                })
            }
            Err(err) => {
                warn!(error = %err, "Failed to spawn auto-scroll timer");
                None
            }
        }
    }
}

impl Drop for AutoScrollController {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for AutoScrollController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoScrollController")
            .field("config", &self.config)
            .field("viewport_height", &self.viewport_height())
            .field("direction", &self.direction())
            .finish()
    }
}

#[cfg(test)]
#[path = "autoscroll_tests.rs"]
mod tests;
