//! Host scroll surface abstraction.

use std::sync::atomic::{AtomicU32, Ordering};

/// The scrollable container hosting the list.
///
/// Implementations are shared between the input context, the auto-scroll
/// timer and the host's render loop, so both operations take `&self`.
pub trait ScrollSurface: Send + Sync {
    /// Current vertical scroll offset.
    fn scroll_offset(&self) -> f32;

    /// Imperatively scroll to `offset`. The surface clamps to its extent.
    fn scroll_to(&self, offset: f32);
}

/// Lock-free scroll offset cell with a host-maintained upper bound.
///
/// Stores `f32` bit patterns in atomics so the auto-scroll timer thread can
/// write while the render loop reads.
#[derive(Debug)]
pub struct SharedScrollOffset {
    offset: AtomicU32,
    max_offset: AtomicU32,
}

impl Default for SharedScrollOffset {
    fn default() -> Self {
        Self::new(f32::INFINITY)
    }
}

impl SharedScrollOffset {
    /// Create a surface at offset 0 that can scroll up to `max_offset`.
    pub fn new(max_offset: f32) -> Self {
        Self {
            offset: AtomicU32::new(0f32.to_bits()),
            max_offset: AtomicU32::new(max_offset.max(0.0).to_bits()),
        }
    }

    /// Update the scrollable extent, re-clamping the current offset.
    pub fn set_max_offset(&self, max_offset: f32) {
        self.max_offset
            .store(max_offset.max(0.0).to_bits(), Ordering::Relaxed);
        self.scroll_to(self.scroll_offset());
    }

    /// Current upper bound.
    pub fn max_offset(&self) -> f32 {
        f32::from_bits(self.max_offset.load(Ordering::Relaxed))
    }

    /// Scroll by a signed delta.
    pub fn scroll_by(&self, delta: f32) {
        self.scroll_to(self.scroll_offset() + delta);
    }
}

impl ScrollSurface for SharedScrollOffset {
    fn scroll_offset(&self) -> f32 {
        f32::from_bits(self.offset.load(Ordering::Relaxed))
    }

    fn scroll_to(&self, offset: f32) {
        if !offset.is_finite() {
            return;
        }
        let clamped = offset.clamp(0.0, self.max_offset());
        self.offset.store(clamped.to_bits(), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let surface = SharedScrollOffset::new(100.0);
        assert_eq!(surface.scroll_offset(), 0.0);
    }

    #[test]
    fn scroll_to_clamps_to_extent() {
        let surface = SharedScrollOffset::new(100.0);
        surface.scroll_to(250.0);
        assert_eq!(surface.scroll_offset(), 100.0);
        surface.scroll_to(-5.0);
        assert_eq!(surface.scroll_offset(), 0.0);
    }

    #[test]
    fn shrinking_extent_reclamps() {
        let surface = SharedScrollOffset::new(100.0);
        surface.scroll_to(80.0);
        surface.set_max_offset(30.0);
        assert_eq!(surface.scroll_offset(), 30.0);
    }

    #[test]
    fn non_finite_target_is_ignored() {
        let surface = SharedScrollOffset::new(100.0);
        surface.scroll_to(40.0);
        surface.scroll_to(f32::NAN);
        assert_eq!(surface.scroll_offset(), 40.0);
    }

    #[test]
    fn scroll_by_is_relative() {
        let surface = SharedScrollOffset::default();
        surface.scroll_by(12.5);
        surface.scroll_by(-2.5);
        assert_eq!(surface.scroll_offset(), 10.0);
    }
}
