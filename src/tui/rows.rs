//! Row geometry for the terminal host.
//!
//! Terminal rows are whole cells, the engine works in continuous units.
//! One cell is [`CELL_PX`] engine units tall, so engine defaults tuned for
//! pixels (80 px edge zones, 10 px per tick) feel right in a terminal.
//!
//! Cumulative row offsets come from a Fenwick tree so that re-measuring a
//! single item after a resize or reorder stays O(log n).

use unicode_width::UnicodeWidthChar;

/// Engine units per terminal cell.
pub const CELL_PX: f32 = 40.0;

/// Convert a cell count to engine units.
pub fn cells_to_px(cells: usize) -> f32 {
    cells as f32 * CELL_PX
}

/// Convert engine units to the nearest whole cell offset.
pub fn px_to_cells(px: f32) -> i32 {
    (px / CELL_PX).round() as i32
}

/// Greedily wrap `text` into lines at most `width` columns wide.
///
/// Wide characters are never split; a character wider than `width` gets a
/// line of its own. Embedded newlines start new lines. Always returns at
/// least one line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut used = 0;
        for ch in paragraph.chars() {
            let w = ch.width().unwrap_or(0);
            if used + w > width && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                used = 0;
            }
            line.push(ch);
            used += w;
        }
        lines.push(line);
    }
    lines
}

/// Cumulative heights (in cells) of the rendered rows.
#[derive(Debug, Clone, Default)]
pub struct RowHeights {
    tree: Vec<isize>,
    heights: Vec<usize>,
}

impl RowHeights {
    /// Build from per-row heights.
    pub fn from_heights(heights: &[usize]) -> Self {
        let mut rows = Self {
            tree: vec![0; heights.len()],
            heights: vec![0; heights.len()],
        };
        for (index, &height) in heights.iter().enumerate() {
            rows.set(index, height);
        }
        rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Height of `index` in cells; 0 when out of range.
    pub fn height(&self, index: usize) -> usize {
        self.heights.get(index).copied().unwrap_or(0)
    }

    /// Change one row's height. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, height: usize) {
        let Some(current) = self.heights.get_mut(index) else {
            return;
        };
        let delta = height as isize - *current as isize;
        *current = height;
        if delta != 0 {
            fenwick::array::update(&mut self.tree, index, delta);
        }
    }

    /// Cells above row `index` (its top offset). `index == len()` gives the
    /// total.
    pub fn offset_of(&self, index: usize) -> usize {
        if index == 0 || self.is_empty() {
            return 0;
        }
        let last = index.min(self.len()) - 1;
        fenwick::array::prefix_sum(&self.tree, last).max(0) as usize
    }

    /// Total height of all rows.
    pub fn total(&self) -> usize {
        self.offset_of(self.len())
    }

    /// Row covering content cell `y`, or `None` past the end.
    pub fn row_at(&self, y: usize) -> Option<usize> {
        let (mut lo, mut hi) = (0, self.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.offset_of(mid + 1) > y {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        (lo < self.len()).then_some(lo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn wrap_short_text_is_one_line() {
        assert_eq!(wrap_text("flour", 20), vec!["flour"]);
    }

    #[test]
    fn wrap_splits_at_width() {
        assert_eq!(wrap_text("abcdefg", 3), vec!["abc", "def", "g"]);
    }

    #[test]
    fn wrap_respects_wide_characters() {
        // Each CJK character is two columns wide
        assert_eq!(wrap_text("卵卵卵", 4), vec!["卵卵", "卵"]);
    }

    #[test]
    fn wrap_empty_text_keeps_one_line() {
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn wrap_honours_newlines() {
        assert_eq!(wrap_text("mix\nbake", 10), vec!["mix", "bake"]);
    }

    #[test]
    fn offsets_and_lookup() {
        let rows = RowHeights::from_heights(&[1, 3, 2]);
        assert_eq!(rows.offset_of(0), 0);
        assert_eq!(rows.offset_of(1), 1);
        assert_eq!(rows.offset_of(2), 4);
        assert_eq!(rows.total(), 6);
        assert_eq!(rows.row_at(0), Some(0));
        assert_eq!(rows.row_at(1), Some(1));
        assert_eq!(rows.row_at(3), Some(1));
        assert_eq!(rows.row_at(4), Some(2));
        assert_eq!(rows.row_at(6), None);
    }

    #[test]
    fn set_changes_later_offsets() {
        let mut rows = RowHeights::from_heights(&[2, 2, 2]);
        rows.set(0, 5);
        assert_eq!(rows.offset_of(1), 5);
        assert_eq!(rows.total(), 9);
        rows.set(7, 100);
        assert_eq!(rows.total(), 9);
    }

    #[test]
    fn empty_rows() {
        let rows = RowHeights::default();
        assert_eq!(rows.total(), 0);
        assert_eq!(rows.row_at(0), None);
    }

    #[test]
    fn px_round_trip() {
        assert_eq!(px_to_cells(cells_to_px(7)), 7);
        assert_eq!(px_to_cells(CELL_PX * 0.6), 1);
    }

    proptest! {
        #[test]
        fn offset_is_sum_of_heights(heights in prop::collection::vec(0usize..=8, 0..40)) {
            let rows = RowHeights::from_heights(&heights);
            let mut expected = 0;
            for (i, h) in heights.iter().enumerate() {
                prop_assert_eq!(rows.offset_of(i), expected);
                expected += h;
            }
            prop_assert_eq!(rows.total(), expected);
        }

        #[test]
        fn row_at_finds_the_covering_row(heights in prop::collection::vec(1usize..=8, 1..40)) {
            let rows = RowHeights::from_heights(&heights);
            for y in 0..rows.total() {
                let row = rows.row_at(y).unwrap();
                prop_assert!(rows.offset_of(row) <= y && y < rows.offset_of(row + 1));
            }
        }

        #[test]
        fn wrapped_lines_fit(text in "[a-z ]{0,60}", width in 1usize..20) {
            for line in wrap_text(&text, width) {
                prop_assert!(line.chars().count() <= width);
            }
        }
    }
}
