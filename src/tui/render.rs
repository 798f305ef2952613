//! Drawing one frame of the list.

use super::input::{HitMap, RowSpan};
use super::rows::{cells_to_px, px_to_cells, RowHeights};
use crate::engine::RenderState;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Drawn at the start of every item's first line.
pub const HANDLE: &str = "⠿ ";

/// Columns taken by [`HANDLE`] and the continuation indent.
pub const GUTTER: u16 = 2;

const CONTINUATION: &str = "  ";

fn handle_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn active_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

/// Everything needed to draw the list for one frame.
#[derive(Debug, Clone, Copy)]
pub struct ListView<'a> {
    /// Wrapped lines per item, in sequence order.
    pub lines: &'a [Vec<String>],
    /// Measured heights matching `lines`.
    pub rows: &'a RowHeights,
    /// Engine snapshot for this frame.
    pub state: &'a RenderState,
    /// Current scroll offset of the list surface.
    pub scroll_px: f32,
}

impl ListView<'_> {
    /// Screen row (relative to the list top) where `index` is drawn.
    fn drawn_top(&self, index: usize) -> i32 {
        let base = cells_to_px(self.rows.offset_of(index));
        px_to_cells(base + self.state.displacement(index) - self.scroll_px)
    }

    /// Screen row of `index` ignoring drag displacement.
    fn resting_top(&self, index: usize) -> i32 {
        self.rows.offset_of(index) as i32 - px_to_cells(self.scroll_px)
    }
}

/// Draw the list into `area` and return where each item landed.
///
/// Siblings are drawn first and the dragged item last, on top.
pub fn draw_list(buf: &mut Buffer, area: Rect, view: &ListView<'_>) -> HitMap {
    let active = view.state.active_index;
    let order = (0..view.lines.len())
        .filter(|&i| Some(i) != active)
        .chain(active.filter(|&i| i < view.lines.len()));

    for index in order {
        let style = if Some(index) == active {
            active_style()
        } else {
            Style::default()
        };
        draw_item(buf, area, view.drawn_top(index), &view.lines[index], style);
    }

    let height = i32::from(area.height);
    let spans = (0..view.lines.len())
        .filter_map(|index| {
            let top = view.resting_top(index);
            let bottom = top + view.rows.height(index) as i32;
            (bottom > 0 && top < height).then(|| RowSpan {
                index,
                top: area.y + top.max(0) as u16,
                bottom: area.y + bottom.min(height) as u16,
            })
        })
        .collect();

    HitMap {
        area,
        spans,
        item_count: view.lines.len(),
    }
}

fn draw_item(buf: &mut Buffer, area: Rect, top: i32, lines: &[String], style: Style) {
    for (k, text) in lines.iter().enumerate() {
        let row = top + k as i32;
        if row < 0 || row >= i32::from(area.height) {
            continue;
        }
        let y = area.y + row as u16;
        let highlighted = style != Style::default();
        if highlighted {
            // Blank the row so a covered sibling does not show through
            let blank = " ".repeat(usize::from(area.width));
            buf.set_stringn(area.x, y, blank, usize::from(area.width), style);
        }
        let (prefix, prefix_style) = match (k, highlighted) {
            (0, false) => (HANDLE, handle_style()),
            (0, true) => (HANDLE, style),
            _ => (CONTINUATION, style),
        };
        let (x, _) = buf.set_stringn(area.x, y, prefix, usize::from(area.width), prefix_style);
        let remaining = usize::from(area.right().saturating_sub(x));
        buf.set_stringn(x, y, text, remaining, style);
    }
}

/// One-line summary shown under the list.
pub fn status_line(state: &RenderState, moves: usize) -> Line<'static> {
    let hint = match (state.active_index, state.destination_index) {
        (Some(from), Some(to)) if state.settle_progress.is_none() => {
            format!(" moving {} → {}  ·  Esc cancels", from + 1, to + 1)
        }
        (Some(_), _) => " dropping…".to_string(),
        _ => " drag ⠿ to reorder  ·  wheel scrolls  ·  q quits".to_string(),
    };
    Line::from(vec![
        Span::styled(hint, Style::default().fg(Color::Gray)),
        Span::styled(format!("  [{moves} moved]"), Style::default().fg(Color::DarkGray)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ItemMotion;
    use crate::tui::rows::CELL_PX;

    fn lines(texts: &[&str]) -> Vec<Vec<String>> {
        texts.iter().map(|t| vec![(*t).to_string()]).collect()
    }

    fn idle(len: usize) -> RenderState {
        RenderState {
            active_index: None,
            destination_index: None,
            dragged_height: None,
            motions: (0..len)
                .map(|index| ItemMotion {
                    index,
                    displacement: 0.0,
                    is_active: false,
                })
                .collect(),
            settle_progress: None,
        }
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (buf.area.x..buf.area.right())
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn idle_list_draws_in_order_with_handles() {
        let lines = lines(&["one", "two", "three"]);
        let rows = RowHeights::from_heights(&[1, 1, 1]);
        let state = idle(3);
        let mut buf = Buffer::empty(Rect::new(0, 0, 12, 4));
        let view = ListView {
            lines: &lines,
            rows: &rows,
            state: &state,
            scroll_px: 0.0,
        };

        let area = buf.area;
        let hits = draw_list(&mut buf, area, &view);

        assert_eq!(row_text(&buf, 0), "⠿ one");
        assert_eq!(row_text(&buf, 1), "⠿ two");
        assert_eq!(row_text(&buf, 2), "⠿ three");
        assert_eq!(row_text(&buf, 3), "");
        assert_eq!(hits.item_count, 3);
        assert_eq!(hits.spans.len(), 3);
        assert_eq!(hits.spans[2], RowSpan { index: 2, top: 2, bottom: 3 });
    }

    #[test]
    fn wrapped_item_indents_continuation() {
        let lines = vec![
            vec!["mix the".to_string(), "batter".to_string()],
            vec!["bake".to_string()],
        ];
        let rows = RowHeights::from_heights(&[2, 1]);
        let state = idle(2);
        let mut buf = Buffer::empty(Rect::new(0, 0, 12, 3));
        let view = ListView {
            lines: &lines,
            rows: &rows,
            state: &state,
            scroll_px: 0.0,
        };

        let area = buf.area;
        let hits = draw_list(&mut buf, area, &view);

        assert_eq!(row_text(&buf, 0), "⠿ mix the");
        assert_eq!(row_text(&buf, 1), "  batter");
        assert_eq!(row_text(&buf, 2), "⠿ bake");
        assert_eq!(hits.spans[0], RowSpan { index: 0, top: 0, bottom: 2 });
    }

    #[test]
    fn dragged_item_draws_displaced_and_highlighted() {
        let lines = lines(&["one", "two", "three"]);
        let rows = RowHeights::from_heights(&[1, 1, 1]);
        let mut state = idle(3);
        state.active_index = Some(0);
        state.destination_index = Some(2);
        state.motions[0].displacement = 2.0 * CELL_PX;
        state.motions[0].is_active = true;
        state.motions[1].displacement = -CELL_PX;
        state.motions[2].displacement = -CELL_PX;
        let mut buf = Buffer::empty(Rect::new(0, 0, 12, 3));
        let view = ListView {
            lines: &lines,
            rows: &rows,
            state: &state,
            scroll_px: 0.0,
        };

        let area = buf.area;
        draw_list(&mut buf, area, &view);

        assert_eq!(row_text(&buf, 0), "⠿ two");
        assert_eq!(row_text(&buf, 1), "⠿ three");
        assert_eq!(row_text(&buf, 2), "⠿ one");
        assert_eq!(buf[(4, 2)].bg, Color::Yellow);
        assert_eq!(buf[(4, 0)].bg, Color::Reset);
    }

    #[test]
    fn active_item_covers_sibling_it_overlaps() {
        let lines = lines(&["a long sibling", "x"]);
        let rows = RowHeights::from_heights(&[1, 1]);
        let mut state = idle(2);
        state.active_index = Some(1);
        state.destination_index = Some(1);
        state.motions[1].displacement = -CELL_PX;
        let mut buf = Buffer::empty(Rect::new(0, 0, 16, 2));
        let view = ListView {
            lines: &lines,
            rows: &rows,
            state: &state,
            scroll_px: 0.0,
        };

        let area = buf.area;
        draw_list(&mut buf, area, &view);

        assert_eq!(row_text(&buf, 0), "⠿ x");
    }

    #[test]
    fn scrolled_list_clips_top_rows() {
        let lines = lines(&["one", "two", "three"]);
        let rows = RowHeights::from_heights(&[1, 1, 1]);
        let state = idle(3);
        let mut buf = Buffer::empty(Rect::new(0, 5, 12, 2));
        let view = ListView {
            lines: &lines,
            rows: &rows,
            state: &state,
            scroll_px: CELL_PX,
        };

        let area = buf.area;
        let hits = draw_list(&mut buf, area, &view);

        assert_eq!(row_text(&buf, 5), "⠿ two");
        assert_eq!(row_text(&buf, 6), "⠿ three");
        assert_eq!(hits.spans.first(), Some(&RowSpan { index: 1, top: 5, bottom: 6 }));
        assert_eq!(hits.hit(0, 6), Some((2, 0.0)));
    }

    #[test]
    fn narrow_area_truncates_text() {
        let lines = lines(&["abcdefghij"]);
        let rows = RowHeights::from_heights(&[1]);
        let state = idle(1);
        let mut buf = Buffer::empty(Rect::new(0, 0, 5, 1));
        let view = ListView {
            lines: &lines,
            rows: &rows,
            state: &state,
            scroll_px: 0.0,
        };

        let area = buf.area;
        draw_list(&mut buf, area, &view);

        assert_eq!(row_text(&buf, 0), "⠿ abc");
    }

    #[test]
    fn status_line_describes_drag() {
        let mut state = idle(3);
        assert!(status_line(&state, 0).to_string().contains("q quits"));

        state.active_index = Some(0);
        state.destination_index = Some(2);
        let text = status_line(&state, 4).to_string();
        assert!(text.contains("moving 1 → 3"));
        assert!(text.contains("[4 moved]"));

        state.settle_progress = Some(0.5);
        assert!(status_line(&state, 4).to_string().contains("dropping"));
    }
}
