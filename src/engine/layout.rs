//! LayoutRegistry - last-measured item boxes keyed by index.
//!
//! Populated by per-item measurement callbacks, read by the drop index
//! resolver. Writes are idempotent upserts ("last write wins per index");
//! reads always tolerate a missing key.

use crate::model::LayoutBox;
use std::collections::BTreeMap;

/// Mapping from item index to its last-measured layout box.
///
/// Backed by an ordered map so iteration visits indices in ascending
/// order, which the resolver relies on for its lowest-index tie-break.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutRegistry {
    records: BTreeMap<usize, LayoutBox>,
}

impl LayoutRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the measured box for `index`.
    ///
    /// No validation against the sequence length happens here; stale high
    /// indices are removed by [`LayoutRegistry::prune`].
    pub fn record(&mut self, index: usize, layout: LayoutBox) {
        self.records.insert(index, layout);
    }

    /// Last-measured box for `index`.
    pub fn get(&self, index: usize) -> Option<LayoutBox> {
        self.records.get(&index).copied()
    }

    /// Number of indices with a record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no item has been measured yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record at or beyond `len`.
    pub fn prune(&mut self, len: usize) {
        let stale = self.records.split_off(&len);
        if !stale.is_empty() {
            tracing::debug!(
                removed = stale.len(),
                len,
                "Pruned stale layout records"
            );
        }
    }

    /// Remove all records.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Records for indices in `[0, item_count)`, ascending by index.
    pub fn records_below(
        &self,
        item_count: usize,
    ) -> impl Iterator<Item = (usize, LayoutBox)> + '_ {
        self.records
            .range(..item_count)
            .map(|(&index, &layout)| (index, layout))
    }

    /// Measured box for `index`, or an estimate when it was never measured.
    ///
    /// The estimate stacks `default_height` items below the nearest measured
    /// predecessor (or from offset 0 when there is none).
    pub fn get_or_estimate(&self, index: usize, default_height: f32) -> LayoutBox {
        if let Some(layout) = self.get(index) {
            return layout;
        }
        let offset = match self.records.range(..index).next_back() {
            Some((&prev_index, prev)) => {
                prev.bottom() + (index - prev_index - 1) as f32 * default_height
            }
            None => index as f32 * default_height,
        };
        LayoutBox::new(offset, default_height)
    }

    /// Rewrite records in `[min(from, to), max(from, to)]` to reflect a committed move.
    ///
    /// Heights travel with their items and offsets are re-stacked from the
    /// top of the affected range, keeping the gap that followed each slot.
    /// When any record in the range is missing, the whole range is dropped
    /// instead so the host's next measurement pass starts clean.
    pub fn apply_move(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        let (lo, hi) = (from.min(to), from.max(to));
        let boxes: Option<Vec<LayoutBox>> = (lo..=hi).map(|i| self.get(i)).collect();
        let Some(boxes) = boxes else {
            for i in lo..=hi {
                self.records.remove(&i);
            }
            return;
        };

        let gaps: Vec<f32> = boxes
            .windows(2)
            .map(|pair| pair[1].offset - pair[0].bottom())
            .chain(std::iter::once(0.0))
            .collect();

        let mut heights: Vec<f32> = boxes.iter().map(|b| b.height).collect();
        crate::engine::commit::move_item(&mut heights, from - lo, to - lo);

        let mut cursor = boxes[0].offset;
        for (slot, (height, gap)) in heights.iter().zip(&gaps).enumerate() {
            self.records.insert(lo + slot, LayoutBox::new(cursor, *height));
            cursor += height + gap;
        }
    }
}
