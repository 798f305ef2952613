//! Tactile feedback signals.

use tracing::debug;

/// Kind of tactile signal the engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticPulse {
    /// A drag has started.
    DragStart,
    /// The resolved destination changed (lighter signal).
    Selection,
}

/// Device feedback collaborator. Called on the state-owning context.
pub trait Haptics: Send {
    /// Emit one pulse.
    fn pulse(&self, pulse: HapticPulse);
}

/// Discards every pulse.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn pulse(&self, _pulse: HapticPulse) {}
}

/// Logs pulses instead of vibrating; the default for hosts without a device.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHaptics;

impl Haptics for TracingHaptics {
    fn pulse(&self, pulse: HapticPulse) {
        debug!(?pulse, "Haptic pulse");
    }
}
