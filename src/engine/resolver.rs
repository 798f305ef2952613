//! Drop index resolution: nearest item center wins.

use super::layout::LayoutRegistry;

/// Resolve the index whose vertical center is nearest to `pointer_y`.
///
/// Only indices in `[0, item_count)` with a known layout record take part.
///
/// # Tie-break
///
/// On exact ties the **lowest** index wins: candidates are visited in
/// ascending index order and a later candidate replaces the current best
/// only when it is strictly closer. A pointer exactly between the centers
/// of `k` and `k + 1` therefore resolves to `k`.
///
/// # Fallbacks
///
/// - No usable record (none measured, or all non-finite): returns 0.
/// - Non-finite `pointer_y`: every distance is non-finite, returns 0.
///
/// The result is always `< item_count` when `item_count >= 1`.
pub fn resolve_drop_index(pointer_y: f32, registry: &LayoutRegistry, item_count: usize) -> usize {
    let mut best: Option<(usize, f32)> = None;

    for (index, layout) in registry.records_below(item_count) {
        let distance = (pointer_y - layout.center()).abs();
        if !distance.is_finite() {
            continue;
        }
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((index, distance)),
        }
    }

    best.map_or(0, |(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LayoutBox;

    /// Four 50px items stacked from 0: centers at 25, 75, 125, 175.
    fn abcd() -> LayoutRegistry {
        let mut registry = LayoutRegistry::new();
        for i in 0..4 {
            registry.record(i, LayoutBox::new(i as f32 * 50.0, 50.0));
        }
        registry
    }

    #[test]
    fn picks_nearest_center() {
        let registry = abcd();
        assert_eq!(resolve_drop_index(145.0, &registry, 4), 2);
        assert_eq!(resolve_drop_index(55.0, &registry, 4), 1);
        assert_eq!(resolve_drop_index(-500.0, &registry, 4), 0);
        assert_eq!(resolve_drop_index(10_000.0, &registry, 4), 3);
    }

    #[test]
    fn exact_midpoint_resolves_to_lower_index() {
        let registry = abcd();
        // Midpoint between centers 75 and 125
        assert_eq!(resolve_drop_index(100.0, &registry, 4), 1);
        // Midpoint between centers 25 and 75
        assert_eq!(resolve_drop_index(50.0, &registry, 4), 0);
    }

    #[test]
    fn no_records_defaults_to_zero() {
        let registry = LayoutRegistry::new();
        assert_eq!(resolve_drop_index(300.0, &registry, 4), 0);
    }

    #[test]
    fn ignores_records_beyond_item_count() {
        let registry = abcd();
        // Only A and B are in range; pointer nearest D's center still maps to B
        assert_eq!(resolve_drop_index(175.0, &registry, 2), 1);
    }

    #[test]
    fn skips_missing_candidates() {
        let mut registry = LayoutRegistry::new();
        registry.record(0, LayoutBox::new(0.0, 50.0));
        registry.record(3, LayoutBox::new(150.0, 50.0));
        assert_eq!(resolve_drop_index(90.0, &registry, 4), 0);
        assert_eq!(resolve_drop_index(110.0, &registry, 4), 3);
    }

    #[test]
    fn nan_pointer_defaults_to_zero() {
        let registry = abcd();
        assert_eq!(resolve_drop_index(f32::NAN, &registry, 4), 0);
    }

    #[test]
    fn non_finite_record_is_skipped() {
        let mut registry = abcd();
        registry.record(3, LayoutBox::new(f32::NAN, 50.0));
        assert_eq!(resolve_drop_index(175.0, &registry, 4), 2);
    }
}
