//! Selection state: one rectangular range defined by an anchor and an
//! extent, plus the mode that shapes drag-extension.

/// How a drag clamps the selection rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Standard cell rectangle (default).
    #[default]
    Cell,
    /// Full-row rectangle: column span pinned to the full width.
    Row,
    /// Full-column rectangle: row span pinned to the full height.
    Column,
}

/// Selection state supporting cell, row, and column modes.
///
/// `anchor` is fixed during a drag; `extent` follows the pointer. The
/// normalized rectangle is derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub mode: SelectionMode,
    /// (row, col) of the fixed corner.
    pub anchor: (usize, usize),
    /// (row, col) of the moving corner.
    pub extent: (usize, usize),
}

impl Selection {
    /// Single-cell selection.
    pub fn cell(row: usize, col: usize) -> Self {
        Selection {
            mode: SelectionMode::Cell,
            anchor: (row, col),
            extent: (row, col),
        }
    }

    /// Full-row selection across `max_col`.
    pub fn row(row: usize, max_col: usize) -> Self {
        Selection {
            mode: SelectionMode::Row,
            anchor: (row, 0),
            extent: (row, max_col),
        }
    }

    /// Full-column selection down to `max_row`.
    pub fn column(col: usize, max_row: usize) -> Self {
        Selection {
            mode: SelectionMode::Column,
            anchor: (0, col),
            extent: (max_row, col),
        }
    }

    /// Normalized bounds `(start_row, start_col, end_row, end_col)` with
    /// `start_row <= end_row` and `start_col <= end_col` regardless of
    /// drag direction.
    pub fn bounds(&self) -> (usize, usize, usize, usize) {
        (
            self.anchor.0.min(self.extent.0),
            self.anchor.1.min(self.extent.1),
            self.anchor.0.max(self.extent.0),
            self.anchor.1.max(self.extent.1),
        )
    }

    /// O(1) membership test used for highlight styling.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        let (r0, c0, r1, c1) = self.bounds();
        row >= r0 && row <= r1 && col >= c0 && col <= c1
    }

    /// Move the extent during a drag, clamping per the selection mode.
    ///
    /// Row mode pins the column span to the full width; column mode pins
    /// the row span to the full height.
    pub fn extend_to(&mut self, row: usize, col: usize, max_row: usize, max_col: usize) {
        match self.mode {
            SelectionMode::Cell => {
                self.extent = (row.min(max_row), col.min(max_col));
            }
            SelectionMode::Row => {
                self.anchor.1 = 0;
                self.extent = (row.min(max_row), max_col);
            }
            SelectionMode::Column => {
                self.anchor.0 = 0;
                self.extent = (max_row, col.min(max_col));
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_normalized_any_direction() {
        let mut sel = Selection::cell(5, 5);
        sel.extend_to(2, 8, 100, 100);
        assert_eq!(sel.bounds(), (2, 5, 5, 8));

        let mut sel = Selection::cell(1, 1);
        sel.extend_to(9, 0, 100, 100);
        assert_eq!(sel.bounds(), (1, 0, 9, 1));
    }

    #[test]
    fn test_contains() {
        let mut sel = Selection::cell(2, 2);
        sel.extend_to(4, 4, 100, 100);
        assert!(sel.contains(3, 3));
        assert!(sel.contains(2, 4));
        assert!(!sel.contains(1, 3));
        assert!(!sel.contains(5, 2));
    }

    #[test]
    fn test_row_mode_pins_columns() {
        let mut sel = Selection::row(3, 6);
        sel.extend_to(5, 2, 100, 6);
        assert_eq!(sel.bounds(), (3, 0, 5, 6));
    }

    #[test]
    fn test_column_mode_pins_rows() {
        let mut sel = Selection::column(2, 9);
        sel.extend_to(4, 4, 9, 100);
        assert_eq!(sel.bounds(), (0, 2, 9, 4));
    }

    #[test]
    fn test_extend_clamps_to_grid() {
        let mut sel = Selection::cell(0, 0);
        sel.extend_to(50, 50, 9, 3);
        assert_eq!(sel.extent, (9, 3));
    }
}
