//! Selection and keyboard navigation for `GridView`.
//!
//! One rectangular selection plus one active anchor cell. Drags are
//! explicit sessions created on pointer-down and destroyed on pointer-up,
//! never ambient flags.

use super::GridView;
use crate::grid::editing::NavTarget;
use crate::types::{CellPosition, Selection, SelectionMode};

/// An in-flight selection drag.
#[derive(Debug, Clone)]
pub struct DragSession {
    pub mode: SelectionMode,
    /// (row, col) where the drag started.
    pub anchor: (usize, usize),
    /// The pointer left the anchor cell at some point.
    pub moved: bool,
    /// The anchor was already the active cell when the drag started
    /// (a second click there opens the editor on release).
    pub started_on_active: bool,
}

/// A serializable view of the current selection for the web layer.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SelectionSnapshot {
    pub mode: &'static str,
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

/// Options for `begin_selection`.
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    /// Keep the existing anchor and move only the far corner.
    pub extend: bool,
    pub mode: SelectionMode,
    /// Pre-set far corner (used when restoring a saved range).
    pub end: Option<(usize, usize)>,
}

impl GridView {
    /// The active anchor cell as (processed row, column index).
    pub fn active_cell(&self) -> Option<(usize, usize)> {
        self.active
    }

    /// The active cell as a `CellPosition`.
    pub fn active_position(&self) -> Option<CellPosition> {
        let (row, col) = self.active?;
        let key = self.column_at(col)?.key.clone();
        Some(CellPosition::new(row, key))
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// The normalized selection rectangle, for hosts that render it.
    pub fn selection_snapshot(&self) -> Option<SelectionSnapshot> {
        let sel = self.selection.as_ref()?;
        let (start_row, start_col, end_row, end_col) = sel.bounds();
        Some(SelectionSnapshot {
            mode: match sel.mode {
                SelectionMode::Cell => "cell",
                SelectionMode::Row => "row",
                SelectionMode::Column => "column",
            },
            start_row,
            start_col,
            end_row,
            end_col,
        })
    }

    /// Highlight test for render styling; O(1).
    pub fn is_selected(&self, row: usize, col: usize) -> bool {
        self.selection
            .as_ref()
            .map(|s| s.contains(row, col))
            .unwrap_or(false)
    }

    /// Anchor (or extend) the selection at a cell.
    ///
    /// Any pending uncommitted draft is flushed first — clicking away
    /// from an edited-but-unblurred cell must not lose data.
    pub fn begin_selection(&mut self, row_index: usize, column_key: &str, opts: SelectOptions) {
        self.flush_pending_edit();

        let Some(col) = self.column_index_of(column_key) else {
            return;
        };
        let rows = self.processed_count();
        if rows == 0 || row_index >= rows {
            return;
        }
        let last_row = rows - 1;
        let last_col = self.columns().len().saturating_sub(1);

        if opts.extend {
            if let Some(ref mut sel) = self.selection {
                sel.extend_to(row_index, col, last_row, last_col);
                self.notify_selection();
                return;
            }
        }

        let mut sel = match opts.mode {
            SelectionMode::Cell => Selection::cell(row_index, col),
            SelectionMode::Row => Selection::row(row_index, last_col),
            SelectionMode::Column => Selection::column(col, last_row),
        };
        if let Some((end_row, end_col)) = opts.end {
            sel.extend_to(end_row, end_col, last_row, last_col);
        }
        self.selection = Some(sel);
        self.active = Some((row_index, col));
        self.notify_selection();
    }

    /// Set the active cell directly (keyboard movement), collapsing the
    /// selection to that single cell.
    pub fn set_active_cell(&mut self, row_index: usize, col: usize) {
        let rows = self.processed_count();
        let cols = self.columns().len();
        if rows == 0 || cols == 0 {
            self.active = None;
            self.selection = None;
            return;
        }
        let row = row_index.min(rows - 1);
        let col = col.min(cols - 1);
        self.active = Some((row, col));
        self.selection = Some(Selection::cell(row, col));
        self.notify_selection();
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.active = None;
    }

    /// Drop selection/active state that no longer fits the processed
    /// shape after a reprocess. Stale positions are clamped, not
    /// re-anchored.
    pub(crate) fn clamp_selection(&mut self) {
        let rows = self.processed_count();
        let cols = self.columns().len();
        if rows == 0 || cols == 0 {
            self.selection = None;
            self.active = None;
            self.drag = None;
            return;
        }
        let last_row = rows - 1;
        let last_col = cols - 1;
        if let Some((row, col)) = self.active {
            self.active = Some((row.min(last_row), col.min(last_col)));
        }
        if let Some(ref mut sel) = self.selection {
            sel.anchor = (sel.anchor.0.min(last_row), sel.anchor.1.min(last_col));
            sel.extent = (sel.extent.0.min(last_row), sel.extent.1.min(last_col));
        }
    }

    /// Keyboard entry point. `key` follows DOM `KeyboardEvent.key` names.
    /// Returns true when the key was handled (the web layer then calls
    /// `preventDefault`).
    pub fn handle_key(&mut self, key: &str, shift: bool) -> bool {
        if !self.options().allow_keyboard_navigation {
            return false;
        }
        match key {
            "ArrowUp" => self.navigate(NavTarget::Up),
            "ArrowDown" => self.navigate(NavTarget::Down),
            "ArrowLeft" => self.navigate(NavTarget::Left),
            "ArrowRight" => self.navigate(NavTarget::Right),
            "Tab" => {
                if shift {
                    self.navigate(NavTarget::PrevCell)
                } else {
                    self.navigate(NavTarget::NextCell)
                }
            }
            "Enter" => {
                if shift {
                    self.navigate(NavTarget::PrevRow)
                } else {
                    self.navigate(NavTarget::NextRow)
                }
            }
            "F2" => {
                let Some(pos) = self.active_position() else {
                    return false;
                };
                self.begin_edit(pos.row_index, &pos.column_key)
            }
            "Escape" => {
                if self.is_editing() {
                    self.cancel_edit();
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Moving always first leaves edit mode on the previous cell.
    fn navigate(&mut self, target: NavTarget) -> bool {
        if self.is_editing() {
            return self.request_navigation(target);
        }
        self.move_active(target)
    }

    pub(crate) fn notify_selection(&mut self) {
        let Some(pos) = self.active_position() else {
            return;
        };
        let Some(row) = self.processed_row(pos.row_index).cloned() else {
            return;
        };
        if let Some(ref f) = self.callbacks.on_selection_change {
            f(&pos, &row);
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
    use crate::types::{CellValue, Column, GridOptions, Row};

    fn row(pairs: &[(&str, CellValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn grid(n: usize) -> GridView {
        let columns = vec![
            Column::new("id", "Id"),
            Column::new("name", "Name"),
            Column::new("status", "Status"),
        ];
        let mut g = GridView::new(columns, GridOptions::default());
        g.set_rows(
            (0..n)
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
    fn test_click_then_arrow_down() {
        // Scenario: click row 0 selects it; ArrowDown moves to row 1.
        let mut g = grid(2);
        g.begin_selection(0, "name", SelectOptions::default());
        assert_eq!(
            g.active_position(),
            Some(CellPosition::new(0, "name"))
        );
        assert!(g.handle_key("ArrowDown", false));
        assert_eq!(
            g.active_position(),
            Some(CellPosition::new(1, "name"))
        );
    }

    #[test]
    fn test_extend_keeps_anchor() {
        let mut g = grid(5);
        g.begin_selection(1, "id", SelectOptions::default());
        g.begin_selection(
            3,
            "status",
            SelectOptions {
                extend: true,
                ..SelectOptions::default()
            },
        );
        let sel = g.selection().unwrap();
        assert_eq!(sel.bounds(), (1, 0, 3, 2));
        // Active cell is still the anchor
        assert_eq!(g.active_cell(), Some((1, 0)));
    }

    #[test]
    fn test_row_mode_selects_full_width() {
        let mut g = grid(5);
        g.begin_selection(
            2,
            "name",
            SelectOptions {
                mode: SelectionMode::Row,
                ..SelectOptions::default()
            },
        );
        let sel = g.selection().unwrap();
        assert_eq!(sel.bounds(), (2, 0, 2, 2));
    }

    #[test]
    fn test_arrow_replaces_selection() {
        let mut g = grid(5);
        g.begin_selection(0, "id", SelectOptions::default());
        g.begin_selection(
            2,
            "status",
            SelectOptions {
                extend: true,
                ..SelectOptions::default()
            },
        );
        g.handle_key("ArrowDown", false);
        // Multi-cell range collapsed to the single moved cell
        let sel = g.selection().unwrap();
        assert_eq!(sel.bounds(), (1, 0, 1, 0));
    }

    #[test]
    fn test_out_of_range_click_ignored() {
        let mut g = grid(2);
        g.begin_selection(9, "name", SelectOptions::default());
        assert!(g.selection().is_none());
        g.begin_selection(0, "missing", SelectOptions::default());
        assert!(g.selection().is_none());
    }

    #[test]
    fn test_selection_clamped_after_filter() {
        let mut g = grid(5);
        g.begin_selection(4, "status", SelectOptions::default());
        g.set_search("row 0");
        assert_eq!(g.processed_count(), 1);
        assert_eq!(g.active_cell(), Some((0, 2)));
    }

    #[test]
    fn test_selection_cleared_when_empty() {
        let mut g = grid(2);
        g.begin_selection(0, "id", SelectOptions::default());
        g.set_rows(Vec::new());
        assert!(g.selection().is_none());
        assert!(g.active_cell().is_none());
    }

    #[test]
    fn test_keyboard_disabled_toggle() {
        let columns = vec![Column::new("id", "Id")];
        let options = GridOptions {
            allow_keyboard_navigation: false,
            ..GridOptions::default()
        };
        let mut g = GridView::new(columns, options);
        g.set_rows(vec![row(&[("id", CellValue::Number(1.0))])]);
        g.begin_selection(0, "id", SelectOptions::default());
        assert!(!g.handle_key("ArrowDown", false));
    }

    #[test]
    fn test_selection_change_callback() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
        let mut g = grid(3);
        let s = Rc::clone(&seen);
        let mut callbacks = super::super::GridCallbacks::default();
        callbacks.on_selection_change = Some(Box::new(move |pos, _| {
            s.borrow_mut().push(pos.row_index);
        }));
        g.set_callbacks(callbacks);

        g.begin_selection(1, "name", SelectOptions::default());
        g.handle_key("ArrowDown", false);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }
}
