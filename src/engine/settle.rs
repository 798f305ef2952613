//! Settle animation played between release and commit.
//!
//! After release the dragged item glides from wherever the pointer left it
//! to its resolved slot; the reorder is committed only once it arrives, so
//! the rendered order and the committed order never disagree.

use super::layout::LayoutRegistry;
use crate::model::Reorder;
use std::time::{Duration, Instant};

/// Interpolates the dragged item's displacement toward its final slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleAnimation {
    from: f32,
    to: f32,
    started: Instant,
    duration: Duration,
}

impl SettleAnimation {
    /// Animate from displacement `from` to `to` over `duration`.
    pub fn new(from: f32, to: f32, started: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started,
            duration,
        }
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Displacement at `now`, eased out (fast start, gentle arrival).
    pub fn value_at(&self, now: Instant) -> f32 {
        let eased = ease_out_cubic(self.progress(now));
        self.from + (self.to - self.from) * eased
    }

    /// Whether the item has arrived.
    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// Final displacement.
    pub fn target(&self) -> f32 {
        self.to
    }
}

fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

/// Displacement that puts the item at `reorder.from` exactly into the slot
/// it will occupy once `reorder` is committed.
///
/// Moving forward, the item's top lands where the destination item's bottom
/// is minus its own height; moving backward, on the destination item's top.
pub fn slot_displacement(reorder: Reorder, registry: &LayoutRegistry, default_height: f32) -> f32 {
    let origin = registry.get_or_estimate(reorder.from, default_height);
    let target = registry.get_or_estimate(reorder.to, default_height);
    if reorder.to > reorder.from {
        target.bottom() - origin.height - origin.offset
    } else {
        target.offset - origin.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LayoutBox;

    #[test]
    fn zero_duration_is_immediately_finished() {
        let now = Instant::now();
        let anim = SettleAnimation::new(10.0, 100.0, now, Duration::ZERO);
        assert!(anim.is_finished(now));
        assert_eq!(anim.value_at(now), 100.0);
    }

    #[test]
    fn starts_at_from_and_ends_at_to() {
        let start = Instant::now();
        let anim = SettleAnimation::new(120.0, 100.0, start, Duration::from_millis(100));
        assert_eq!(anim.value_at(start), 120.0);
        assert_eq!(anim.value_at(start + Duration::from_millis(100)), 100.0);
        assert!(anim.is_finished(start + Duration::from_millis(150)));
        assert!(!anim.is_finished(start + Duration::from_millis(50)));
    }

    #[test]
    fn ease_out_is_ahead_of_linear() {
        let start = Instant::now();
        let anim = SettleAnimation::new(0.0, 100.0, start, Duration::from_millis(100));
        let halfway = anim.value_at(start + Duration::from_millis(50));
        assert!(halfway > 50.0 && halfway < 100.0);
    }

    #[test]
    fn slot_forward_with_uniform_heights() {
        let mut registry = LayoutRegistry::new();
        for i in 0..4 {
            registry.record(i, LayoutBox::new(i as f32 * 50.0, 50.0));
        }
        assert_eq!(slot_displacement(Reorder::new(0, 2), &registry, 50.0), 100.0);
        assert_eq!(slot_displacement(Reorder::new(3, 1), &registry, 50.0), -100.0);
    }

    #[test]
    fn slot_forward_with_mixed_heights() {
        let mut registry = LayoutRegistry::new();
        registry.record(0, LayoutBox::new(0.0, 20.0));
        registry.record(1, LayoutBox::new(20.0, 60.0));
        // Item 0 moves below item 1: its top lands at 80 - 20 = 60
        assert_eq!(slot_displacement(Reorder::new(0, 1), &registry, 50.0), 60.0);
    }
}
