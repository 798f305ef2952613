//! Error types for dragorder.
//!
//! This module defines the error taxonomy using `thiserror`. Errors compose
//! via `?` and `From` conversions up to [`AppError`], the type returned by
//! the binary's entry point.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level application error
//!   - [`ConfigError`] - Config file path, read or TOML parse failures
//!   - [`LoggingError`] - Tracing subscriber initialization failures
//!   - [`ListFileError`] - List file read, parse or write failures
//!   - [`SequenceError`] - Invalid item sequences (duplicate keys)
//!   - [`TuiError`] - Terminal setup, drawing or input thread failures
//! - [`EngineError`] - Failures crossing the gesture/state boundary
//!
//! # Recovery Strategy
//!
//! The reorder core has no failure path: every gesture input produces a
//! bounded state transition, and missing layout data falls back to
//! defaults. Errors only surface at construction and I/O boundaries.

use crate::config::ConfigError;
use crate::list_file::ListFileError;
use crate::logging::LoggingError;
use crate::tui::TuiError;
use thiserror::Error;

/// Top-level application error encompassing all failure modes of the binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// The list being edited could not be loaded or saved.
    #[error("List file error: {0}")]
    ListFile(#[from] ListFileError),

    /// The loaded list is not a valid ordered sequence.
    #[error("Invalid list: {0}")]
    Sequence(#[from] SequenceError),

    /// Terminal or TUI rendering error.
    ///
    /// Fatal: the host attempts terminal cleanup, then exits.
    #[error("Terminal error: {0}")]
    Tui(#[from] TuiError),
}

/// Errors building an [`OrderedSequence`](super::sequence::OrderedSequence).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// Two items produced the same key.
    ///
    /// Keys must be unique so that identity survives reordering.
    #[error("Duplicate item key {key:?} at indices {first} and {second}")]
    DuplicateKey {
        /// The repeated key.
        key: String,
        /// Index of the first occurrence.
        first: usize,
        /// Index of the repeated occurrence.
        second: usize,
    },
}

/// Errors crossing the boundary between the input context and the
/// state-owning context.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// The state-owning side of the drag channel has been dropped.
    ///
    /// Returned to the input context when it tries to deliver an event
    /// after the engine was unmounted. The gesture should be abandoned.
    #[error("Drag channel disconnected: the reorder engine has shut down")]
    Disconnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_message_names_key_and_indices() {
        let err = SequenceError::DuplicateKey {
            key: "flour".to_string(),
            first: 0,
            second: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("flour"));
        assert!(msg.contains('0') && msg.contains('3'));
    }

    #[test]
    fn app_error_from_tui_error() {
        let tui_err: TuiError = std::io::Error::other("broken pipe").into();
        let app_err: AppError = tui_err.into();
        assert!(matches!(app_err, AppError::Tui(TuiError::Io(_))));
        assert!(app_err.to_string().contains("broken pipe"));
    }

    #[test]
    fn app_error_from_sequence_error() {
        let err = SequenceError::DuplicateKey {
            key: "x".to_string(),
            first: 0,
            second: 1,
        };
        let app_err: AppError = err.into();
        assert!(app_err.to_string().starts_with("Invalid list"));
    }
}
