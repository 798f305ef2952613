//! Ordered, identity-keyed item sequences.
//!
//! The engine never inspects item payloads. It addresses items purely by
//! index and uses the caller-supplied key extractor only to check that a
//! replacement sequence still holds the same item at the dragged index.

use super::error::SequenceError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Caller-supplied stable identity for an item.
pub type KeyFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// An opaque payload together with its current index in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item<T> {
    /// Position of the item in the sequence.
    pub index: usize,
    /// The payload. Never inspected by the engine.
    pub payload: T,
}

/// Ordered, index-addressable list of items with unique keys.
///
/// # Invariants
/// - Every item's key (as produced by the key extractor) is unique.
/// - Reordering through [`OrderedSequence::with_move`] preserves length and
///   identity; only the position of the moved item changes.
pub struct OrderedSequence<T> {
    items: Vec<T>,
    key_fn: KeyFn<T>,
}

impl<T> OrderedSequence<T> {
    /// Build a sequence, validating that keys are unique.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::DuplicateKey`] naming the first repeated key.
    pub fn new<F>(items: Vec<T>, key_fn: F) -> Result<Self, SequenceError>
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self::from_shared(items, Arc::new(key_fn))
    }

    /// Build a sequence reusing an existing key extractor.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::DuplicateKey`] naming the first repeated key.
    pub fn from_shared(items: Vec<T>, key_fn: KeyFn<T>) -> Result<Self, SequenceError> {
        let mut seen: HashMap<String, usize> = HashMap::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let key = key_fn(item);
            if let Some(&first) = seen.get(&key) {
                return Err(SequenceError::DuplicateKey {
                    key,
                    first,
                    second: index,
                });
            }
            seen.insert(key, index);
        }
        Ok(Self { items, key_fn })
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the sequence holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Payload at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Stable key of the item at `index`, if in range.
    pub fn key_at(&self, index: usize) -> Option<String> {
        self.items.get(index).map(|item| (self.key_fn)(item))
    }

    /// Keys of all items, in order.
    pub fn keys(&self) -> Vec<String> {
        self.items.iter().map(|item| (self.key_fn)(item)).collect()
    }

    /// Position of the item with the given key.
    pub fn position_of(&self, key: &str) -> Option<usize> {
        self.items.iter().position(|item| (self.key_fn)(item) == key)
    }

    /// Items paired with their indices.
    pub fn iter(&self) -> impl Iterator<Item = Item<&T>> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(|(index, payload)| Item { index, payload })
    }

    /// Borrow the payloads as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Consume the sequence, returning the payloads.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Shared handle to the key extractor.
    pub fn key_fn(&self) -> KeyFn<T> {
        Arc::clone(&self.key_fn)
    }

    /// Return a new sequence with the item at `from` moved to `to`.
    ///
    /// Both indices are clamped into range. Keys cannot collide because the
    /// set of items is unchanged, so no revalidation happens.
    pub fn with_move(&self, from: usize, to: usize) -> Self
    where
        T: Clone,
    {
        let mut items = self.items.clone();
        crate::engine::commit::move_item(&mut items, from, to);
        Self {
            items,
            key_fn: Arc::clone(&self.key_fn),
        }
    }
}

impl<T: Clone> Clone for OrderedSequence<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            key_fn: Arc::clone(&self.key_fn),
        }
    }
}

impl<T: PartialEq> PartialEq for OrderedSequence<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedSequence")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}
