//! Terminal host for the reorder engine (impure shell).
//!
//! Two threads: the input thread owns the gesture recognizers, the main
//! thread owns the [`ReorderEngine`] and draws. They meet at the drag
//! channel, the shared scroll offset and the [`input::HitMap`].

pub mod input;
pub mod render;
pub mod rows;

use crate::engine::{
    AutoScrollController, DragEnd, EngineConfig, ReorderEngine, ScrollSurface, SharedScrollOffset,
};
use crate::list_file::ListEntry;
use crate::model::{LayoutBox, OrderedSequence};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use input::{spawn_input_thread, HitMap, HostCommand, InputRouter};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::widgets::Paragraph;
use ratatui::Terminal;
use render::{draw_list, status_line, ListView, GUTTER};
use rows::{cells_to_px, wrap_text, RowHeights};
use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Frame period of the main loop.
const FRAME: Duration = Duration::from_millis(16);

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// The input thread panicked
    #[error("Input thread panicked")]
    InputThread,
}

/// Wrapped lines and heights for the current order and width.
#[derive(Debug, Default)]
struct Measured {
    width: u16,
    commits: usize,
    lines: Vec<Vec<String>>,
    rows: RowHeights,
}

impl Measured {
    fn measure(entries: &[ListEntry], width: u16, commits: usize) -> Self {
        let text_width = usize::from(width.saturating_sub(GUTTER));
        let lines: Vec<Vec<String>> = entries
            .iter()
            .map(|e| wrap_text(&e.text, text_width))
            .collect();
        let heights: Vec<usize> = lines.iter().map(Vec::len).collect();
        Self {
            width,
            commits,
            rows: RowHeights::from_heights(&heights),
            lines,
        }
    }

    fn is_stale(&self, width: u16, commits: usize) -> bool {
        self.width != width || self.commits != commits
    }

    fn layout_box(&self, index: usize) -> LayoutBox {
        LayoutBox::new(
            cells_to_px(self.rows.offset_of(index)),
            cells_to_px(self.rows.height(index)),
        )
    }
}

/// Split the screen into the list and a one-row status line.
fn split(area: Rect) -> (Rect, Rect) {
    let [list, status] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
    (list, status)
}

/// Run the interactive reorder UI on `sequence` until the user quits.
///
/// Returns the items in their final order.
///
/// # Errors
///
/// Returns [`TuiError`] if the terminal cannot be set up or drawn to. The
/// terminal is restored before returning either way.
pub fn run(
    sequence: OrderedSequence<ListEntry>,
    config: EngineConfig,
) -> Result<Vec<ListEntry>, TuiError> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, sequence, config);
    let restored = restore_terminal();
    let entries = result?;
    restored?;
    Ok(entries)
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    sequence: OrderedSequence<ListEntry>,
    config: EngineConfig,
) -> Result<Vec<ListEntry>, TuiError> {
    let size = terminal.size()?;
    let (list_area, _) = split(Rect::new(0, 0, size.width, size.height));

    let surface = Arc::new(SharedScrollOffset::new(0.0));
    let scroll_surface: Arc<dyn ScrollSurface> = surface.clone();
    let autoscroll = Arc::new(AutoScrollController::new(
        config.autoscroll,
        &scroll_surface,
        cells_to_px(usize::from(list_area.height)),
    ));

    let commits = Arc::new(AtomicUsize::new(0));
    let commit_counter = Arc::clone(&commits);
    let mut engine = ReorderEngine::new(sequence, config)
        .with_autoscroll(Arc::clone(&autoscroll))
        .on_drag_end(move |end: &DragEnd<ListEntry>| {
            commit_counter.fetch_add(1, Ordering::Relaxed);
            info!(from = end.from, to = end.to, "Item moved");
        });

    let hits = Arc::new(Mutex::new(HitMap::default()));
    let (command_tx, commands) = mpsc::channel();
    let router = InputRouter::new(
        engine.sender(),
        Arc::clone(&scroll_surface),
        Arc::clone(&autoscroll),
        config.binding_config(),
        Arc::clone(&hits),
        command_tx,
    );
    let shutdown = Arc::new(AtomicBool::new(false));
    let input = spawn_input_thread(router, Arc::clone(&shutdown))?;
    info!(items = engine.sequence().len(), "Reorder UI started");

    let mut measured = Measured::default();
    let mut result = Ok(());
    loop {
        match commands.recv_timeout(FRAME) {
            Ok(HostCommand::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Ok(HostCommand::Resize { width, height }) => {
                debug!(width, height, "Terminal resized");
                if let Err(err) = terminal.autoresize() {
                    result = Err(err);
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
        }

        let now = Instant::now();
        engine.pump(now);

        let size = match terminal.size() {
            Ok(size) => size,
            Err(err) => {
                result = Err(err);
                break;
            }
        };
        let (list_area, status_area) = split(Rect::new(0, 0, size.width, size.height));
        let commit_count = commits.load(Ordering::Relaxed);
        let entries = engine.sequence().as_slice();
        let len_changed = measured.lines.len() != entries.len();
        if len_changed || measured.is_stale(list_area.width, commit_count) {
            measured = Measured::measure(entries, list_area.width, commit_count);
            for index in 0..measured.lines.len() {
                engine.on_layout(index, measured.layout_box(index));
            }
            let overflow = measured.rows.total().saturating_sub(usize::from(list_area.height));
            surface.set_max_offset(cells_to_px(overflow));
            autoscroll.set_viewport_height(cells_to_px(usize::from(list_area.height)));
        }

        let state = engine.render_state(now);
        let view = ListView {
            lines: &measured.lines,
            rows: &measured.rows,
            state: &state,
            scroll_px: surface.scroll_offset(),
        };
        let drawn = terminal.draw(|frame| {
            let hit_map = draw_list(frame.buffer_mut(), list_area, &view);
            frame.render_widget(Paragraph::new(status_line(&state, commit_count)), status_area);
            *hits.lock().unwrap_or_else(PoisonError::into_inner) = hit_map;
        });
        if let Err(err) = drawn {
            result = Err(err);
            break;
        }
    }

    shutdown.store(true, Ordering::Relaxed);
    engine.unmount();
    if input.join().is_err() {
        warn!("Input thread panicked");
        return Err(TuiError::InputThread);
    }
    result?;

    let entries = engine.sequence().as_slice().to_vec();
    info!(moves = commits.load(Ordering::Relaxed), "Reorder UI finished");
    Ok(entries)
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

/// Restore terminal to normal state.
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, text: &str) -> ListEntry {
        ListEntry {
            id: id.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn tui_error_from_io_error() {
        let err: TuiError = io::Error::other("boom").into();
        assert!(matches!(err, TuiError::Io(_)));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn split_reserves_status_row() {
        let (list, status) = split(Rect::new(0, 0, 40, 10));
        assert_eq!(list, Rect::new(0, 0, 40, 9));
        assert_eq!(status, Rect::new(0, 9, 40, 1));
    }

    #[test]
    fn measure_wraps_to_width_minus_gutter() {
        let entries = vec![entry("a", "abcdefgh"), entry("b", "xy")];
        let measured = Measured::measure(&entries, 6, 0);
        assert_eq!(measured.lines[0], vec!["abcd", "efgh"]);
        assert_eq!(measured.rows.total(), 3);
        assert_eq!(measured.layout_box(1), LayoutBox::new(cells_to_px(2), cells_to_px(1)));
    }

    #[test]
    fn measurement_goes_stale_on_resize_or_commit() {
        let measured = Measured::measure(&[entry("a", "x")], 20, 3);
        assert!(!measured.is_stale(20, 3));
        assert!(measured.is_stale(21, 3));
        assert!(measured.is_stale(20, 4));
    }
}
