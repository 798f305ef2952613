//! Committing a resolved move to the caller's sequence.

use crate::model::{clamp_index, OrderedSequence, Reorder};
use tracing::info;

/// Move the element at `from` so that it ends up at index `to`.
///
/// The element is removed first and reinserted into the shortened vector,
/// so all other elements keep their relative order. Out-of-range indices
/// are clamped into `[0, len - 1]`; an empty vector is left untouched.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if items.is_empty() {
        return;
    }
    let last = items.len() - 1;
    let (from, to) = (from.min(last), to.min(last));
    if from == to {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

/// Pure reorder: a new sequence with the item at `from` moved to `to`.
///
/// When `from == to` the result equals the input.
pub fn commit<T: Clone>(
    from: usize,
    to: usize,
    sequence: &OrderedSequence<T>,
) -> OrderedSequence<T> {
    sequence.with_move(from, to)
}

/// Payload of the completion callback.
#[derive(Debug, Clone, PartialEq)]
pub struct DragEnd<T> {
    /// The reordered sequence.
    pub data: OrderedSequence<T>,
    /// Index of the dragged item before the move.
    pub from: usize,
    /// Index of the dragged item after the move.
    pub to: usize,
}

/// Completion callback invoked once per committed drag.
pub type DragEndCallback<T> = Box<dyn FnMut(&DragEnd<T>) + Send>;

/// Applies resolved moves and notifies the caller.
///
/// The callback fires exactly once per effective move and never for a
/// move onto the same index.
pub struct ReorderCommitter<T> {
    on_drag_end: Option<DragEndCallback<T>>,
}

impl<T> Default for ReorderCommitter<T> {
    fn default() -> Self {
        Self { on_drag_end: None }
    }
}

impl<T: Clone> ReorderCommitter<T> {
    /// Create a committer without a callback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the completion callback, replacing any previous one.
    pub fn set_on_drag_end(&mut self, callback: DragEndCallback<T>) {
        self.on_drag_end = Some(callback);
    }

    /// Apply `reorder` to `sequence`.
    ///
    /// Both indices are clamped into range first, and the callback reports
    /// the clamped values. Returns `None` (and stays silent) when the
    /// clamped move is a no-op; otherwise returns the new sequence after
    /// invoking the callback.
    pub fn commit(
        &mut self,
        reorder: Reorder,
        sequence: &OrderedSequence<T>,
    ) -> Option<OrderedSequence<T>> {
        if sequence.is_empty() {
            return None;
        }
        let len = sequence.len();
        let reorder = Reorder::new(clamp_index(reorder.from, len), clamp_index(reorder.to, len));
        if reorder.is_noop() {
            return None;
        }
        let data = commit(reorder.from, reorder.to, sequence);
        let event = DragEnd {
            data,
            from: reorder.from,
            to: reorder.to,
        };
        info!(from = event.from, to = event.to, len = event.data.len(), "Committed reorder");
        if let Some(callback) = self.on_drag_end.as_mut() {
            callback(&event);
        }
        Some(event.data)
    }
}
