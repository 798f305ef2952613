//! dragorder
//!
//! A drag-and-drop reordering engine for vertical lists, and a terminal
//! host that uses it to edit ordered lists stored as JSON.
//!
//! The engine ([`engine`]) is a pure state machine fed by gesture events;
//! everything that touches the terminal lives in [`tui`].

pub mod config;
pub mod engine;
pub mod list_file;
pub mod logging;
pub mod model;
pub mod tui;
