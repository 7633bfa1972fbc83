//! Cell editing lifecycle: `Idle → Editing(cell) → Idle`.
//!
//! At most one cell edits at a time. The draft value is tracked
//! independently of the committed value so keystrokes never commit;
//! navigation resolves the previous cell synchronously (two-phase:
//! commit, then move) with no reliance on event scheduling order.

use super::GridView;
use crate::types::{CellValue, ColumnType, GridMode};

/// The in-flight edit: processed cell address plus the live draft.
#[derive(Debug, Clone)]
pub struct EditSession {
    pub row_index: usize,
    pub column_key: String,
    pub draft: String,
}

/// Where a commit-and-navigate lands next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget {
    Up,
    Down,
    Left,
    Right,
    /// Tab: one column forward, wrapping to the next row.
    NextCell,
    /// Shift+Tab: one column back, wrapping to the previous row.
    PrevCell,
    /// Enter: one row down, wrapping to the next column.
    NextRow,
    /// Shift+Enter: one row up, wrapping to the previous column.
    PrevRow,
}

impl GridView {
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn editing_session(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    /// Whether the cell may enter edit mode: grid mode, column flag, and
    /// the per-cell host gate must all allow it.
    pub fn can_edit(&self, row_index: usize, column_key: &str) -> bool {
        if self.options().mode != GridMode::Edit {
            return false;
        }
        let Some(column) = self.column_by_key(column_key) else {
            return false;
        };
        if !column.editable {
            return false;
        }
        let Some(row) = self.processed_row(row_index) else {
            return false;
        };
        match self.cell_editable_hook() {
            Some(hook) => hook(row, column, row_index),
            None => true,
        }
    }

    /// Enter edit mode on a cell, first resolving any previous edit.
    ///
    /// Returns false when the cell is not editable or out of bounds.
    pub fn begin_edit(&mut self, row_index: usize, column_key: &str) -> bool {
        if let Some(ref session) = self.editing {
            if session.row_index == row_index && session.column_key == column_key {
                return true;
            }
        }
        // Resolve the previous cell before entering a new one.
        self.flush_pending_edit();

        if !self.can_edit(row_index, column_key) {
            return false;
        }
        let draft = self
            .processed_row(row_index)
            .and_then(|row| row.get(column_key))
            .map(CellValue::display)
            .unwrap_or_default();
        self.editing = Some(EditSession {
            row_index,
            column_key: column_key.to_string(),
            draft,
        });
        true
    }

    /// Update the draft as the user types. No commit happens here.
    pub fn set_draft(&mut self, value: &str) {
        if let Some(ref mut session) = self.editing {
            session.draft = value.to_string();
        }
    }

    /// Commit the current draft through the column parser.
    ///
    /// Returns false (and stays in edit mode) when the parser rejects the
    /// input — e.g. a numeric column under the `Reject` policy.
    pub fn commit_edit(&mut self) -> bool {
        let Some(session) = self.editing.clone() else {
            return false;
        };
        let Some(column) = self.column_by_key(&session.column_key) else {
            self.editing = None;
            return false;
        };
        let Some(value) = column.parse_input(&session.draft) else {
            return false;
        };
        // Leave edit mode before mutating: update_cell reprocesses, and a
        // stale session must not survive the reshape.
        self.editing = None;
        self.update_cell(session.row_index, &session.column_key, value)
    }

    /// Commit a value directly (select/checkbox/custom editors commit on
    /// interaction rather than through a draft).
    pub fn commit_value(&mut self, value: CellValue) -> bool {
        let Some(session) = self.editing.take() else {
            return false;
        };
        self.update_cell(session.row_index, &session.column_key, value)
    }

    /// Discard the draft and exit without navigating.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Toggle a checkbox cell and commit immediately (no edit session).
    pub fn toggle_checkbox(&mut self, row_index: usize, column_key: &str) -> bool {
        if !self.can_edit(row_index, column_key) {
            return false;
        }
        let is_checkbox = self
            .column_by_key(column_key)
            .map(|c| c.kind == ColumnType::Checkbox)
            .unwrap_or(false);
        if !is_checkbox {
            return false;
        }
        let current = self
            .processed_row(row_index)
            .and_then(|row| row.get(column_key))
            .and_then(|v| match v {
                CellValue::Bool(b) => Some(*b),
                _ => None,
            })
            .unwrap_or(false);
        self.update_cell(row_index, column_key, CellValue::Bool(!current))
    }

    /// Blur handler entry point: commits unless a programmatic navigation
    /// is already in flight (that navigation owns the commit). Exactly
    /// one commit happens per edit, not zero, not two.
    pub fn blur_commit(&mut self) {
        if self.navigating {
            return;
        }
        let _ = self.commit_edit();
    }

    /// Commit the current edit and move the active cell: the two-phase
    /// replacement for deferred-timer sequencing. The previous cell's
    /// commit is finalized synchronously, then the new position applies.
    ///
    /// A rejected commit aborts the navigation and stays in edit mode.
    pub fn request_navigation(&mut self, target: NavTarget) -> bool {
        self.navigating = true;
        if self.editing.is_some() && !self.commit_edit() {
            self.navigating = false;
            return false;
        }
        let moved = self.move_active(target);
        self.navigating = false;
        moved
    }

    /// Flush a pending uncommitted draft before a selection change.
    ///
    /// Clicking away from an edited-but-unblurred cell must not lose the
    /// draft; a rejected draft is discarded (fail-closed) so the click
    /// still lands.
    pub(crate) fn flush_pending_edit(&mut self) {
        if self.editing.is_some() && !self.commit_edit() {
            self.cancel_edit();
        }
    }

    /// Move the active cell one step, clamped to grid bounds. Returns
    /// true when the position changed.
    pub(crate) fn move_active(&mut self, target: NavTarget) -> bool {
        let Some((row, col)) = self.active else {
            return false;
        };
        let rows = self.processed_count();
        let cols = self.columns().len();
        if rows == 0 || cols == 0 {
            return false;
        }
        let last_row = rows - 1;
        let last_col = cols - 1;

        let next = match target {
            NavTarget::Up => (row.saturating_sub(1), col),
            NavTarget::Down => ((row + 1).min(last_row), col),
            NavTarget::Left => (row, col.saturating_sub(1)),
            NavTarget::Right => (row, (col + 1).min(last_col)),
            NavTarget::NextCell => {
                if col < last_col {
                    (row, col + 1)
                } else if row < last_row {
                    (row + 1, 0)
                } else {
                    (row, col)
                }
            }
            NavTarget::PrevCell => {
                if col > 0 {
                    (row, col - 1)
                } else if row > 0 {
                    (row - 1, last_col)
                } else {
                    (row, col)
                }
            }
            NavTarget::NextRow => {
                if row < last_row {
                    (row + 1, col)
                } else if col < last_col {
                    (0, col + 1)
                } else {
                    (row, col)
                }
            }
            NavTarget::PrevRow => {
                if row > 0 {
                    (row - 1, col)
                } else if col > 0 {
                    (last_row, col - 1)
                } else {
                    (row, col)
                }
            }
        };

        if next == (row, col) {
            return false;
        }
        self.set_active_cell(next.0, next.1);
        self.scroll_to_row(next.0);
        true
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
    use crate::engine::{SortDirection, SortState};
    use crate::types::{Column, GridOptions, Row};

    fn row(pairs: &[(&str, CellValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn grid() -> GridView {
        let columns = vec![
            Column::new("id", "Id").kind(ColumnType::Number).editable(false),
            Column::new("v", "Value").kind(ColumnType::Number),
            Column::new("name", "Name"),
            Column::new("done", "Done").kind(ColumnType::Checkbox),
        ];
        let options = GridOptions {
            mode: GridMode::Edit,
            ..GridOptions::default()
        };
        let mut g = GridView::new(columns, options);
        g.set_rows(vec![
            row(&[
                ("id", CellValue::Number(1.0)),
                ("v", CellValue::Number(5.0)),
                ("name", "alpha".into()),
                ("done", CellValue::Bool(false)),
            ]),
            row(&[
                ("id", CellValue::Number(2.0)),
                ("v", CellValue::Number(1.0)),
                ("name", "beta".into()),
                ("done", CellValue::Bool(true)),
            ]),
        ]);
        g
    }

    #[test]
    fn test_edit_lifecycle() {
        let mut g = grid();
        assert!(!g.is_editing());
        assert!(g.begin_edit(0, "v"));
        assert_eq!(g.editing_session().unwrap().draft, "5");
        g.set_draft("12");
        assert!(g.commit_edit());
        assert!(!g.is_editing());
        assert_eq!(g.get_data()[0].get("v"), Some(&CellValue::Number(12.0)));
    }

    #[test]
    fn test_non_editable_column_refuses() {
        let mut g = grid();
        assert!(!g.begin_edit(0, "id"));
    }

    #[test]
    fn test_view_mode_refuses() {
        let mut g = grid();
        g.set_mode(GridMode::View);
        assert!(!g.begin_edit(0, "v"));
    }

    #[test]
    fn test_cell_editable_hook_gates() {
        let mut g = grid();
        g.set_cell_editable_fn(|row, _, _| {
            row.get("id").and_then(|v| v.as_number()) != Some(1.0)
        });
        assert!(!g.begin_edit(0, "v"));
        assert!(g.begin_edit(1, "v"));
    }

    #[test]
    fn test_cancel_discards_draft() {
        let mut g = grid();
        assert!(g.begin_edit(0, "name"));
        g.set_draft("changed");
        g.cancel_edit();
        assert_eq!(g.get_data()[0].get("name"), Some(&"alpha".into()));
    }

    #[test]
    fn test_reject_keeps_editing() {
        let mut g = grid();
        assert!(g.begin_edit(0, "v"));
        g.set_draft("not a number");
        assert!(!g.commit_edit());
        assert!(g.is_editing());
        g.cancel_edit();
    }

    #[test]
    fn test_entering_new_cell_resolves_previous() {
        let mut g = grid();
        assert!(g.begin_edit(0, "v"));
        g.set_draft("42");
        assert!(g.begin_edit(1, "name"));
        // The first cell's draft was flushed, not lost
        assert_eq!(g.get_data()[0].get("v"), Some(&CellValue::Number(42.0)));
    }

    #[test]
    fn test_blur_suppressed_during_navigation() {
        let mut g = grid();
        g.set_active_cell(0, 1);
        assert!(g.begin_edit(0, "v"));
        g.set_draft("8");
        assert!(g.request_navigation(NavTarget::Down));
        // The navigation committed; a trailing blur must not double-commit
        g.set_draft("99"); // no session, no-op
        g.blur_commit();
        assert_eq!(g.get_data()[0].get("v"), Some(&CellValue::Number(8.0)));
        assert_eq!(g.active_cell(), Some((1, 1)));
    }

    #[test]
    fn test_rejected_commit_blocks_navigation() {
        let mut g = grid();
        g.set_active_cell(0, 1);
        assert!(g.begin_edit(0, "v"));
        g.set_draft("garbage");
        assert!(!g.request_navigation(NavTarget::Down));
        assert!(g.is_editing());
        assert_eq!(g.active_cell(), Some((0, 1)));
    }

    #[test]
    fn test_commit_under_sort_targets_identified_row() {
        let mut g = grid();
        g.set_sort(Some(SortState {
            column_key: "v".into(),
            direction: SortDirection::Ascending,
        }));
        // Processed row 0 is id 2 (v = 1)
        assert!(g.begin_edit(0, "v"));
        g.set_draft("9");
        assert!(g.commit_edit());
        assert_eq!(g.get_data()[1].get("v"), Some(&CellValue::Number(9.0)));
        assert_eq!(g.get_data()[0].get("v"), Some(&CellValue::Number(5.0)));
    }

    #[test]
    fn test_toggle_checkbox_commits_immediately() {
        let mut g = grid();
        assert!(g.toggle_checkbox(0, "done"));
        assert_eq!(g.get_data()[0].get("done"), Some(&CellValue::Bool(true)));
        assert!(!g.is_editing());
        // Not a checkbox column
        assert!(!g.toggle_checkbox(0, "name"));
    }

    #[test]
    fn test_tab_wraps_at_row_edge() {
        let mut g = grid();
        g.set_active_cell(0, 3);
        assert!(g.move_active(NavTarget::NextCell));
        assert_eq!(g.active_cell(), Some((1, 0)));
        assert!(g.move_active(NavTarget::PrevCell));
        assert_eq!(g.active_cell(), Some((0, 3)));
    }

    #[test]
    fn test_enter_wraps_at_column_edge() {
        let mut g = grid();
        g.set_active_cell(1, 0);
        assert!(g.move_active(NavTarget::NextRow));
        assert_eq!(g.active_cell(), Some((0, 1)));
    }

    #[test]
    fn test_navigation_clamped_at_grid_end() {
        let mut g = grid();
        g.set_active_cell(1, 3);
        assert!(!g.move_active(NavTarget::NextCell));
        assert!(!g.move_active(NavTarget::Down));
        assert_eq!(g.active_cell(), Some((1, 3)));
    }

    #[test]
    fn test_editing_cancelled_when_shape_changes() {
        let mut g = grid();
        assert!(g.begin_edit(1, "v"));
        g.set_rows(vec![row(&[("id", CellValue::Number(1.0))])]);
        assert!(!g.is_editing());
    }
}
