//! Per-item displacement derived from drag state.

/// Inputs the presenter needs from the drag session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionInput {
    /// Index being dragged.
    pub active_index: usize,
    /// Where the dragged item would land.
    pub destination_index: usize,
    /// Measured height of the dragged item.
    pub active_height: f32,
    /// Offset applied to the dragged item itself.
    pub active_offset: f32,
}

/// Rendering offset for one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemMotion {
    /// Index of the item in the current sequence.
    pub index: usize,
    /// Vertical offset to add to the item's measured position.
    pub displacement: f32,
    /// Whether this is the dragged item.
    pub is_active: bool,
}

/// Computes target offsets for every item during a drag.
///
/// Displaced siblings shift by the dragged item's height, never their own:
/// it is the space the dragged item vacates or occupies that moves them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemMotionPresenter;

impl ItemMotionPresenter {
    /// Offset for the item at `index`.
    pub fn displacement(index: usize, input: &MotionInput) -> f32 {
        let MotionInput {
            active_index: active,
            destination_index: destination,
            active_height,
            active_offset,
        } = *input;

        if index == active {
            active_offset
        } else if active < destination && active < index && index <= destination {
            -active_height
        } else if active > destination && destination <= index && index < active {
            active_height
        } else {
            0.0
        }
    }

    /// Motions for all `item_count` items; all zero when no drag is active.
    pub fn present(input: Option<&MotionInput>, item_count: usize) -> Vec<ItemMotion> {
        (0..item_count)
            .map(|index| match input {
                Some(input) => ItemMotion {
                    index,
                    displacement: Self::displacement(index, input),
                    is_active: index == input.active_index,
                },
                None => ItemMotion {
                    index,
                    displacement: 0.0,
                    is_active: false,
                },
            })
            .collect()
    }
}
