//! Pointer event handling: press/drag/release, clicks, context menu.
//!
//! The web layer translates DOM events into these calls; the methods
//! are plain so native tests can drive the same paths.

use super::{DragSession, GridView, SelectOptions};
use crate::types::SelectionMode;

impl GridView {
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Pointer press on a cell. Anchors the selection (or extends it with
    /// shift) and opens a drag session.
    pub fn pointer_down(&mut self, row_index: usize, column_key: &str, shift: bool) {
        let Some(col) = self.column_index_of(column_key) else {
            return;
        };
        let started_on_active = !shift && self.active == Some((row_index, col));

        self.begin_selection(
            row_index,
            column_key,
            SelectOptions {
                extend: shift,
                mode: SelectionMode::Cell,
                end: None,
            },
        );
        // Selection may have refused (out of range); no drag then.
        if self.selection.is_none() {
            return;
        }
        self.drag = Some(DragSession {
            mode: SelectionMode::Cell,
            anchor: (row_index, col),
            moved: false,
            started_on_active,
        });
    }

    /// Pointer entered a cell while a drag session is open: grow the
    /// selection to span anchor..cell. A no-op outside a drag.
    pub fn pointer_enter(&mut self, row_index: usize, column_key: &str) {
        if self.is_resizing_column() {
            return;
        }
        let Some(col) = self.column_index_of(column_key) else {
            return;
        };
        let rows = self.processed_count();
        if rows == 0 || row_index >= rows {
            return;
        }
        let Some(ref mut drag) = self.drag else {
            return;
        };
        if (row_index, col) != drag.anchor {
            drag.moved = true;
        }
        let last_row = rows - 1;
        let last_col = self.columns.len().saturating_sub(1);
        if let Some(ref mut sel) = self.selection {
            sel.extend_to(row_index, col, last_row, last_col);
        }
        self.notify_selection();
    }

    /// Pointer release. Closes the drag; a release without movement is a
    /// click, which fires `on_row_click` and — when the press landed on
    /// the already-active cell — opens the editor.
    pub fn pointer_up(&mut self) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        if drag.moved {
            return;
        }
        let (row_index, col) = drag.anchor;

        if let Some(row) = self.processed_row(row_index).cloned() {
            if let Some(ref f) = self.callbacks.on_row_click {
                f(row_index, &row);
            }
        }
        if drag.started_on_active {
            if let Some(key) = self.column_at(col).map(|c| c.key.clone()) {
                self.begin_edit(row_index, &key);
            }
        }
    }

    /// Pointer left the grid mid-drag; the selection keeps its current
    /// extent but the session ends.
    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    /// Row-gutter press: select the whole row. Shift extends the existing
    /// row range.
    pub fn select_row(&mut self, row_index: usize, shift: bool) {
        let Some(first) = self.columns.first().map(|c| c.key.clone()) else {
            return;
        };
        self.begin_selection(
            row_index,
            &first,
            SelectOptions {
                extend: shift,
                mode: SelectionMode::Row,
                end: None,
            },
        );
    }

    /// Header press: select the whole column. Shift extends the existing
    /// column range.
    pub fn select_column(&mut self, column_key: &str, shift: bool) {
        if self.processed_count() == 0 {
            return;
        }
        self.begin_selection(
            0,
            column_key,
            SelectOptions {
                extend: shift,
                mode: SelectionMode::Column,
                end: None,
            },
        );
    }

    /// Double-click on a cell: open the editor and notify the host.
    pub fn double_click(&mut self, row_index: usize, column_key: &str) {
        self.drag = None;
        self.begin_edit(row_index, column_key);
        if let Some(row) = self.processed_row(row_index).cloned() {
            if let Some(ref f) = self.callbacks.on_row_double_click {
                f(row_index, &row);
            }
        }
    }

    /// Right-click on a row.
    pub fn context_menu(&mut self, row_index: usize) {
        if let Some(row) = self.processed_row(row_index).cloned() {
            if let Some(ref f) = self.callbacks.on_row_context_menu {
                f(row_index, &row);
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
    use crate::grid::GridCallbacks;
    use crate::types::{CellValue, Column, GridMode, GridOptions, Row, SelectionMode};

    fn row(pairs: &[(&str, CellValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn grid() -> GridView {
        let columns = vec![
            Column::new("id", "Id").editable(false),
            Column::new("name", "Name"),
            Column::new("status", "Status"),
        ];
        let options = GridOptions {
            mode: GridMode::Edit,
            ..GridOptions::default()
        };
        let mut g = GridView::new(columns, options);
        g.set_rows(
            (0..4)
                .map(|i| {
                    row(&[
                        ("id", CellValue::Number(i as f64 + 1.0)),
                        ("name", format!("row {i}").into()),
                        ("status", "open".into()),
                    ])
                })
                .collect(),
        );
        g
    }

    #[test]
    fn test_press_drag_release() {
        let mut g = grid();
        g.pointer_down(0, "id", false);
        assert!(g.is_dragging());
        g.pointer_enter(2, "status");
        g.pointer_up();
        assert!(!g.is_dragging());
        assert_eq!(g.selection().unwrap().bounds(), (0, 0, 2, 2));
        // Drag moved: no editor opened
        assert!(!g.is_editing());
    }

    #[test]
    fn test_second_click_on_active_cell_edits() {
        let mut g = grid();
        g.pointer_down(1, "name", false);
        g.pointer_up();
        assert!(!g.is_editing());
        // The cell is now active; a second press-release opens the editor
        g.pointer_down(1, "name", false);
        g.pointer_up();
        assert!(g.is_editing());
        assert_eq!(g.editing_session().unwrap().draft, "row 1");
    }

    #[test]
    fn test_second_click_on_non_editable_cell_selects_only() {
        let mut g = grid();
        g.pointer_down(0, "id", false);
        g.pointer_up();
        g.pointer_down(0, "id", false);
        g.pointer_up();
        assert!(!g.is_editing());
    }

    #[test]
    fn test_double_click_edits() {
        let mut g = grid();
        g.double_click(2, "name");
        assert!(g.is_editing());
    }

    #[test]
    fn test_enter_without_drag_is_noop() {
        let mut g = grid();
        g.pointer_down(0, "id", false);
        g.pointer_up();
        g.pointer_enter(3, "status");
        assert_eq!(g.selection().unwrap().bounds(), (0, 0, 0, 0));
    }

    #[test]
    fn test_cancel_drag_keeps_extent() {
        let mut g = grid();
        g.pointer_down(0, "id", false);
        g.pointer_enter(1, "name");
        g.cancel_drag();
        assert!(!g.is_dragging());
        assert_eq!(g.selection().unwrap().bounds(), (0, 0, 1, 1));
    }

    #[test]
    fn test_select_row_and_column() {
        let mut g = grid();
        g.select_row(1, false);
        assert_eq!(g.selection().unwrap().bounds(), (1, 0, 1, 2));

        g.select_column("name", false);
        assert_eq!(g.selection().unwrap().bounds(), (0, 1, 3, 1));
    }

    #[test]
    fn test_row_drag_spans_full_rows() {
        let mut g = grid();
        g.select_row(1, false);
        g.select_row(3, true);
        let sel = g.selection().unwrap();
        assert_eq!(sel.mode, SelectionMode::Row);
        assert_eq!(sel.bounds(), (1, 0, 3, 2));
    }

    #[test]
    fn test_click_callbacks() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let mut g = grid();
        let mut callbacks = GridCallbacks::default();
        let l = Rc::clone(&log);
        callbacks.on_row_click = Some(Box::new(move |i, _| {
            l.borrow_mut().push(format!("click {i}"));
        }));
        let l = Rc::clone(&log);
        callbacks.on_row_double_click = Some(Box::new(move |i, _| {
            l.borrow_mut().push(format!("dbl {i}"));
        }));
        let l = Rc::clone(&log);
        callbacks.on_row_context_menu = Some(Box::new(move |i, _| {
            l.borrow_mut().push(format!("ctx {i}"));
        }));
        g.set_callbacks(callbacks);

        g.pointer_down(2, "name", false);
        g.pointer_up();
        g.double_click(1, "name");
        g.context_menu(0);
        assert_eq!(*log.borrow(), vec!["click 2", "dbl 1", "ctx 0"]);
    }

    #[test]
    fn test_drag_click_with_return_to_anchor_does_not_edit() {
        let mut g = grid();
        g.pointer_down(1, "name", false);
        g.pointer_up();
        g.pointer_down(1, "name", false);
        g.pointer_enter(2, "name");
        g.pointer_enter(1, "name"); // back to the anchor
        g.pointer_up();
        // Movement happened, so the release is not a click-to-edit
        assert!(!g.is_editing());
    }
}
