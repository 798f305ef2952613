//! Input context: terminal events to gesture recognizers.
//!
//! Runs on its own thread so pointer samples are never held up by drawing.
//! It owns one [`GestureBinding`] per row and forwards recognized gestures
//! to the engine over the drag channel. Host-level requests (quit, resize)
//! travel to the main thread as [`HostCommand`]s.

use super::rows::{cells_to_px, CELL_PX};
use crate::engine::{
    AutoScrollController, BindingConfig, CancelReason, DragEventSender, GestureBinding,
    GestureResponse, HandleRegion, ScrollSurface,
};
use crate::model::EngineError;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::layout::Rect;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Columns at the left of each row that start a drag.
pub const HANDLE_COLUMNS: f32 = 2.0;

/// Rows scrolled per mouse wheel notch.
const WHEEL_ROWS: f32 = 3.0;

/// How long the input thread waits for an event before polling bindings.
const POLL_INTERVAL: Duration = Duration::from_millis(8);

/// Requests from the input thread to the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// Leave the app.
    Quit,
    /// The terminal was resized.
    Resize {
        /// New width in columns.
        width: u16,
        /// New height in rows.
        height: u16,
    },
}

/// Screen rows occupied by one item as last drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpan {
    /// Item index.
    pub index: usize,
    /// First screen row.
    pub top: u16,
    /// One past the last screen row.
    pub bottom: u16,
}

/// What the last frame put where; written by the renderer, read here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HitMap {
    /// The list area.
    pub area: Rect,
    /// Visible items, top to bottom.
    pub spans: Vec<RowSpan>,
    /// Number of items in the list.
    pub item_count: usize,
}

impl HitMap {
    /// Item under the cell, with the column relative to the list's left edge.
    pub fn hit(&self, column: u16, row: u16) -> Option<(usize, f32)> {
        if column < self.area.x || column >= self.area.right() {
            return None;
        }
        self.spans
            .iter()
            .find(|span| span.top <= row && row < span.bottom)
            .map(|span| (span.index, f32::from(column - self.area.x)))
    }

    /// Engine y of a screen row, measured from the top of the list area.
    ///
    /// Uses the middle of the cell, so a pointer on the first row sits half
    /// a cell inside the top auto-scroll zone.
    pub fn viewport_y(&self, row: u16) -> f32 {
        (f32::from(row) - f32::from(self.area.y)) * CELL_PX + CELL_PX / 2.0
    }
}

/// Shared between the renderer (writer) and the input thread (reader).
pub type SharedHitMap = Arc<Mutex<HitMap>>;

/// Whether the input loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading.
    Continue,
    /// Stop the input thread.
    Exit,
}

/// Routes terminal events to the binding under the pointer.
pub struct InputRouter {
    bindings: Vec<GestureBinding>,
    captured: Option<usize>,
    last_y: f32,
    last_scroll: f32,
    sender: DragEventSender,
    surface: Arc<dyn ScrollSurface>,
    autoscroll: Arc<AutoScrollController>,
    config: BindingConfig,
    hits: SharedHitMap,
    commands: mpsc::Sender<HostCommand>,
}

impl InputRouter {
    /// Create a router with no bindings yet; they follow the hit map.
    pub fn new(
        sender: DragEventSender,
        surface: Arc<dyn ScrollSurface>,
        autoscroll: Arc<AutoScrollController>,
        config: BindingConfig,
        hits: SharedHitMap,
        commands: mpsc::Sender<HostCommand>,
    ) -> Self {
        Self {
            bindings: Vec::new(),
            captured: None,
            last_y: 0.0,
            last_scroll: 0.0,
            sender,
            surface,
            autoscroll,
            config,
            hits,
            commands,
        }
    }

    /// Whether a drag is in progress on any binding.
    pub fn is_dragging(&self) -> bool {
        self.captured_binding().is_some_and(GestureBinding::is_active)
    }

    /// Apply one terminal event.
    pub fn handle(&mut self, event: Event, now: Instant) -> Flow {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse, now),
            Event::Resize(width, height) => self.command(HostCommand::Resize { width, height }),
            _ => Flow::Continue,
        }
    }

    /// Periodic work between events: activate held presses and keep the
    /// dragged item under the pointer while the surface auto-scrolls.
    pub fn tick(&mut self, now: Instant) -> Flow {
        let scroll = self.surface.scroll_offset();
        let scrolled = scroll != self.last_scroll;
        self.last_scroll = scroll;
        let last_y = self.last_y;

        let result = match self.captured_binding_mut() {
            Some(binding) if binding.is_pending() => binding.poll(now),
            Some(binding) if binding.is_active() && scrolled => binding.move_to(last_y, now),
            _ => return Flow::Continue,
        };
        self.check(result)
    }

    /// Read events until shutdown or until the engine is gone.
    pub fn run(mut self, shutdown: &AtomicBool) {
        while !shutdown.load(Ordering::Relaxed) {
            let flow = match event::poll(POLL_INTERVAL) {
                Ok(true) => match event::read() {
                    Ok(event) => self.handle(event, Instant::now()),
                    Err(err) => {
                        warn!(error = %err, "Failed to read terminal event");
                        self.command(HostCommand::Quit)
                    }
                },
                Ok(false) => Flow::Continue,
                Err(err) => {
                    warn!(error = %err, "Failed to poll terminal events");
                    self.command(HostCommand::Quit)
                }
            };
            if flow == Flow::Exit || self.tick(Instant::now()) == Flow::Exit {
                break;
            }
        }
        debug!("Input thread exiting");
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }
        match key.code {
            KeyCode::Esc if self.is_dragging() => {
                let result = match self.captured.take().and_then(|i| self.bindings.get_mut(i)) {
                    Some(binding) => binding.cancel(CancelReason::Explicit),
                    None => Ok(GestureResponse::Ignored),
                };
                self.check(result)
            }
            KeyCode::Esc | KeyCode::Char('q') => self.command(HostCommand::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.command(HostCommand::Quit)
            }
            _ => Flow::Continue,
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) -> Flow {
        let hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner).clone();
        let y = hits.viewport_y(mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.sync_bindings(hits.item_count);
                let Some((index, x)) = hits.hit(mouse.column, mouse.row) else {
                    return Flow::Continue;
                };
                let Some(binding) = self.bindings.get_mut(index) else {
                    return Flow::Continue;
                };
                let result = binding.press(x, y, now);
                if matches!(result, Ok(GestureResponse::Pending | GestureResponse::Started)) {
                    self.captured = Some(index);
                    self.last_y = y;
                }
                self.check(result)
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.last_y = y;
                let result = match self.captured_binding_mut() {
                    Some(binding) => binding.move_to(y, now),
                    None => return Flow::Continue,
                };
                if result == Ok(GestureResponse::Aborted) {
                    self.captured = None;
                }
                self.check(result)
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let result = match self.captured.take().and_then(|i| self.bindings.get_mut(i)) {
                    Some(binding) => binding.release(now),
                    None => return Flow::Continue,
                };
                self.check(result)
            }
            MouseEventKind::ScrollUp if !self.is_dragging() => {
                self.scroll_by(-WHEEL_ROWS);
                Flow::Continue
            }
            MouseEventKind::ScrollDown if !self.is_dragging() => {
                self.scroll_by(WHEEL_ROWS);
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    /// Keep one binding per item. Never reshapes mid-gesture.
    fn sync_bindings(&mut self, item_count: usize) {
        if self.bindings.len() == item_count || self.captured.is_some() {
            return;
        }
        self.bindings.truncate(item_count);
        for index in self.bindings.len()..item_count {
            let binding = GestureBinding::new(
                index,
                HandleRegion::new(0.0, HANDLE_COLUMNS),
                self.config,
                self.sender.clone(),
                Arc::clone(&self.surface),
            )
            .with_autoscroll(Arc::clone(&self.autoscroll));
            self.bindings.push(binding);
        }
    }

    fn scroll_by(&self, rows: f32) {
        let target = self.surface.scroll_offset() + rows * cells_to_px(1);
        self.surface.scroll_to(target.max(0.0));
    }

    fn captured_binding(&self) -> Option<&GestureBinding> {
        self.captured.and_then(|i| self.bindings.get(i))
    }

    fn captured_binding_mut(&mut self) -> Option<&mut GestureBinding> {
        self.captured.and_then(|i| self.bindings.get_mut(i))
    }

    fn check(&mut self, result: Result<GestureResponse, EngineError>) -> Flow {
        match result {
            Ok(_) => Flow::Continue,
            Err(err) => {
                warn!(error = %err, "Engine gone; stopping input");
                self.captured = None;
                Flow::Exit
            }
        }
    }

    fn command(&self, command: HostCommand) -> Flow {
        let quitting = command == HostCommand::Quit;
        if self.commands.send(command).is_err() || quitting {
            return Flow::Exit;
        }
        Flow::Continue
    }
}

/// Start the input thread.
///
/// # Errors
///
/// Returns the OS error if the thread cannot be spawned.
pub fn spawn_input_thread(
    router: InputRouter,
    shutdown: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("dragorder-input".to_string())
        .spawn(move || router.run(&shutdown))
}
