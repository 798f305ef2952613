//! Domain model: items, ordered sequences, geometry and errors.

pub mod error;
pub mod sequence;
pub mod types;

pub use error::{AppError, EngineError, SequenceError};
pub use sequence::{Item, KeyFn, OrderedSequence};
pub use types::{clamp_index, LayoutBox, Reorder};
