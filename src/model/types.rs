//! Core geometry newtypes

/// Last-measured vertical extent of one item, in content coordinates.
///
/// `offset` is measured from the top of the scrollable content (not the
/// viewport), so it stays valid while the host surface scrolls.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutBox {
    /// Distance from the top of the content to the top edge of the item.
    pub offset: f32,
    /// Rendered height of the item.
    pub height: f32,
}

impl LayoutBox {
    /// Create a new layout box.
    pub fn new(offset: f32, height: f32) -> Self {
        Self { offset, height }
    }

    /// Vertical center: `offset + height / 2`.
    pub fn center(&self) -> f32 {
        self.offset + self.height / 2.0
    }

    /// Bottom edge: `offset + height`.
    pub fn bottom(&self) -> f32 {
        self.offset + self.height
    }

    /// Whether both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.offset.is_finite() && self.height.is_finite()
    }
}

/// A resolved single-element move: the item at `from` ends up at `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reorder {
    /// Index of the dragged item before the move.
    pub from: usize,
    /// Index of the dragged item after the move.
    pub to: usize,
}

impl Reorder {
    /// Create a new reorder.
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// A move onto its own slot changes nothing.
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }

    /// The move that undoes this one, tracked by item identity.
    ///
    /// After `from -> to` the moved item sits at `to`, so moving it from
    /// `to` back to `from` restores the original order.
    pub fn inverse(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }

    /// Where the item at `index` sits once this move is applied.
    pub fn map_index(&self, index: usize) -> usize {
        let Self { from, to } = *self;
        if index == from {
            to
        } else if from < to && (from..=to).contains(&index) {
            index - 1
        } else if to < from && (to..from).contains(&index) {
            index + 1
        } else {
            index
        }
    }
}

/// Clamp an index into `[0, len - 1]`.
///
/// Returns 0 for an empty sequence; callers never start a drag on one.
pub fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}
