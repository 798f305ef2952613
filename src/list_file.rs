//! Loading and saving the list being edited.
//!
//! A list file is a JSON array, either of plain strings or of
//! `{ "id": ..., "text": ... }` objects. Plain strings are keyed by their
//! position at load time, so duplicate lines stay distinct. Saving writes
//! the same shape back.

use crate::model::{OrderedSequence, SequenceError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors loading or saving a list file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListFileError {
    /// The file could not be read.
    #[error("Failed to read list file at {path}: {reason}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// The file is not a JSON array of strings or `{id, text}` objects.
    #[error("Invalid list in {path}: {reason}")]
    Parse {
        /// Path with invalid contents.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// The file could not be written.
    #[error("Failed to write list file at {path}: {reason}")]
    Write {
        /// Path that failed to write.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },
}

/// One row of the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListEntry {
    /// Stable identity across reorders.
    pub id: String,
    /// Displayed text.
    pub text: String,
}

/// On-disk shape of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    /// `["flour", "sugar"]`
    Plain,
    /// `[{"id": "a", "text": "flour"}]`
    Keyed,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawList {
    Plain(Vec<String>),
    Keyed(Vec<ListEntry>),
}

/// A loaded list file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFile {
    /// Where it was loaded from.
    pub path: PathBuf,
    /// Shape to write back.
    pub format: ListFormat,
    /// Rows in file order.
    pub entries: Vec<ListEntry>,
}

/// Parse list JSON into its format and rows.
///
/// # Errors
///
/// Returns the `serde_json` message when the input is neither shape.
pub fn parse_list(json: &str) -> Result<(ListFormat, Vec<ListEntry>), String> {
    let raw: RawList = serde_json::from_str(json).map_err(|e| e.to_string())?;
    Ok(match raw {
        RawList::Plain(lines) => {
            let entries = lines
                .into_iter()
                .enumerate()
                .map(|(position, text)| ListEntry {
                    id: format!("#{position}"),
                    text,
                })
                .collect();
            (ListFormat::Plain, entries)
        }
        RawList::Keyed(entries) => (ListFormat::Keyed, entries),
    })
}

/// Render rows back to pretty JSON in `format`.
///
/// # Errors
///
/// Returns the `serde_json` message on serialization failure.
pub fn render_list(format: ListFormat, entries: &[ListEntry]) -> Result<String, String> {
    let rendered = match format {
        ListFormat::Plain => {
            let lines: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
            serde_json::to_string_pretty(&lines)
        }
        ListFormat::Keyed => serde_json::to_string_pretty(entries),
    };
    rendered.map(|mut json| {
        json.push('\n');
        json
    })
    .map_err(|e| e.to_string())
}

impl ListFile {
    /// Read and parse `path`.
    ///
    /// # Errors
    ///
    /// [`ListFileError::Read`] or [`ListFileError::Parse`].
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ListFileError> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path).map_err(|e| ListFileError::Read {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let (format, entries) = parse_list(&contents).map_err(|reason| ListFileError::Parse {
            path: path.clone(),
            reason,
        })?;
        info!(path = %path.display(), count = entries.len(), ?format, "Loaded list");
        Ok(Self {
            path,
            format,
            entries,
        })
    }

    /// Build the engine sequence, keyed by entry id.
    ///
    /// # Errors
    ///
    /// [`SequenceError::DuplicateKey`] when two entries share an id.
    pub fn to_sequence(&self) -> Result<OrderedSequence<ListEntry>, SequenceError> {
        OrderedSequence::new(self.entries.clone(), |entry: &ListEntry| entry.id.clone())
    }

    /// Write `entries` back to this file's path in its original shape.
    ///
    /// # Errors
    ///
    /// [`ListFileError::Write`] on serialization or I/O failure.
    pub fn save(&self, entries: &[ListEntry]) -> Result<(), ListFileError> {
        save_to(&self.path, self.format, entries)
    }
}

/// Write `entries` to `path` in `format`.
///
/// # Errors
///
/// [`ListFileError::Write`] on serialization or I/O failure.
pub fn save_to(
    path: &Path,
    format: ListFormat,
    entries: &[ListEntry],
) -> Result<(), ListFileError> {
    let write_error = |reason: String| ListFileError::Write {
        path: path.to_path_buf(),
        reason,
    };
    let json = render_list(format, entries).map_err(write_error)?;
    std::fs::write(path, json).map_err(|e| write_error(e.to_string()))?;
    info!(path = %path.display(), count = entries.len(), "Saved list");
    Ok(())
}
