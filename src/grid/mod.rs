//! The `GridView` state machine — the primary entry point for hosts.
//!
//! Coordinates the row mirror, the filter/sort engine, viewport math,
//! selection geometry, and the editing lifecycle. Event handlers for
//! pointer and keyboard input live in `events.rs` and `selection.rs`;
//! the editing state machine lives in `editing.rs`.

mod editing;
mod events;
mod selection;

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::{unique_values, EngineState, SortState};
use crate::error::Result;
use crate::layout::{
    ColumnLayout, LayoutStore, MemoryStore, RowHeightFn, RowLayout, Viewport, VisibleWindow,
};
use crate::types::{
    default_row_id, CellPosition, CellValue, Column, GridMode, GridOptions, Row, Selection,
};
use crate::workbook::{self, ImportSummary};

pub use editing::{EditSession, NavTarget};
pub use selection::{DragSession, SelectOptions, SelectionSnapshot};

/// Caller-supplied row identity hook.
pub type RowIdFn = Arc<dyn Fn(&Row, usize) -> String>;

/// Per-cell editability gate, evaluated in addition to the column's own
/// `editable` flag.
pub type CellEditableFn = Arc<dyn Fn(&Row, &Column, usize) -> bool>;

/// Change notifications delivered to the host.
///
/// Fired in order on every commit: cell, then row, then whole array.
#[derive(Default)]
pub struct GridCallbacks {
    pub on_cell_change: Option<Box<dyn Fn(usize, &str, &CellValue, &Row)>>,
    pub on_row_change: Option<Box<dyn Fn(usize, &Row)>>,
    pub on_data_change: Option<Box<dyn Fn(&[Row])>>,
    pub on_selection_change: Option<Box<dyn Fn(&CellPosition, &Row)>>,
    pub on_row_click: Option<Box<dyn Fn(usize, &Row)>>,
    pub on_row_double_click: Option<Box<dyn Fn(usize, &Row)>>,
    pub on_row_context_menu: Option<Box<dyn Fn(usize, &Row)>>,
}

/// The grid state machine.
///
/// The row array is logically owned by the caller; `rows` here is a
/// mirror synchronized on every `set_rows`, kept only for edit
/// bookkeeping. Every edit produces a new row object via shallow copy and
/// the change flows back through the callbacks.
pub struct GridView {
    rows: Vec<Row>,
    columns: Vec<Column>,
    column_index: HashMap<String, usize>,
    options: GridOptions,

    engine: EngineState,
    /// Processed view: indices into `rows` after filter → search → sort.
    processed: Vec<usize>,

    row_layout: RowLayout,
    pub(crate) viewport: Viewport,
    column_layout: ColumnLayout,
    store: Box<dyn LayoutStore>,

    pub(crate) selection: Option<Selection>,
    /// Active anchor cell as (processed row, column index).
    pub(crate) active: Option<(usize, usize)>,
    pub(crate) drag: Option<DragSession>,

    pub(crate) editing: Option<EditSession>,
    /// Navigation-in-flight flag: suppresses the duplicate commit from
    /// the blur event that a programmatic navigation triggers.
    pub(crate) navigating: bool,

    get_row_id: Option<RowIdFn>,
    is_cell_editable: Option<CellEditableFn>,
    row_height_fn: Option<RowHeightFn>,

    pub(crate) callbacks: GridCallbacks,

    /// Guards against re-entrant workbook import/export.
    io_busy: bool,
}

impl GridView {
    /// Create a grid over `columns` with an in-memory layout store.
    pub fn new(columns: Vec<Column>, options: GridOptions) -> Self {
        Self::with_store(columns, options, Box::new(MemoryStore::default()))
    }

    /// Create a grid with an explicit layout store (the web layer passes
    /// a `localStorage`-backed one).
    pub fn with_store(
        columns: Vec<Column>,
        options: GridOptions,
        store: Box<dyn LayoutStore>,
    ) -> Self {
        let column_index = build_column_index(&columns);
        let column_layout =
            ColumnLayout::new(&columns, options.persist_key.clone(), store.as_ref());
        let viewport = Viewport {
            scroll_y: 0.0,
            height: options.max_height,
            overscan: options.overscan,
            min_render_rows: options.min_render_rows,
            min_buffer_rows: options.min_buffer_rows,
        };

        let mut grid = GridView {
            rows: Vec::new(),
            columns,
            column_index,
            engine: EngineState::default(),
            processed: Vec::new(),
            row_layout: RowLayout::empty(options.row_height),
            viewport,
            column_layout,
            store,
            selection: None,
            active: None,
            drag: None,
            editing: None,
            navigating: false,
            get_row_id: None,
            is_cell_editable: None,
            row_height_fn: None,
            callbacks: GridCallbacks::default(),
            io_busy: false,
            options,
        };
        grid.reprocess();
        grid
    }

    // ---- Hooks & callbacks -------------------------------------------

    pub fn set_callbacks(&mut self, callbacks: GridCallbacks) {
        self.callbacks = callbacks;
    }

    pub fn set_row_id_fn(&mut self, f: impl Fn(&Row, usize) -> String + 'static) {
        self.get_row_id = Some(Arc::new(f));
    }

    pub fn set_cell_editable_fn(&mut self, f: impl Fn(&Row, &Column, usize) -> bool + 'static) {
        self.is_cell_editable = Some(Arc::new(f));
    }

    pub fn set_row_height_fn(&mut self, f: impl Fn(&Row, usize) -> Option<f32> + 'static) {
        self.row_height_fn = Some(Arc::new(f));
        self.reprocess();
    }

    // ---- Data --------------------------------------------------------

    /// Replace the row mirror with the caller's new source of truth.
    ///
    /// In-flight selection/editing keyed by index become stale and are
    /// clamped or cancelled; there is no re-anchoring across a data swap.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        self.reprocess();
    }

    /// Replace the column set. Widths persist for surviving columns.
    pub fn set_columns(&mut self, columns: Vec<Column>) {
        self.column_index = build_column_index(&columns);
        self.column_layout.sync_columns(&columns);
        self.columns = columns;
        self.reprocess();
    }

    /// The full row array (the grid's mirror of the caller's data).
    pub fn get_data(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn set_mode(&mut self, mode: GridMode) {
        if mode == GridMode::View {
            self.cancel_edit();
        }
        self.options.mode = mode;
    }

    /// Number of rows in the processed (filtered/sorted) view.
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Row behind a processed index.
    pub fn processed_row(&self, row_index: usize) -> Option<&Row> {
        self.processed
            .get(row_index)
            .and_then(|&src| self.rows.get(src))
    }

    /// Source-array index behind a processed index.
    pub fn source_index(&self, row_index: usize) -> Option<usize> {
        self.processed.get(row_index).copied()
    }

    /// Identity of the row at a processed index.
    pub fn row_id_at(&self, row_index: usize) -> Option<String> {
        let src = self.source_index(row_index)?;
        let row = self.rows.get(src)?;
        Some(self.row_id(row, src))
    }

    pub(crate) fn cell_editable_hook(&self) -> Option<&CellEditableFn> {
        self.is_cell_editable.as_ref()
    }

    pub(crate) fn row_id(&self, row: &Row, source_index: usize) -> String {
        match self.get_row_id {
            Some(ref f) => f(row, source_index),
            None => default_row_id(row, source_index),
        }
    }

    pub(crate) fn column_at(&self, col: usize) -> Option<&Column> {
        self.columns.get(col)
    }

    pub(crate) fn column_index_of(&self, key: &str) -> Option<usize> {
        self.column_index.get(key).copied()
    }

    pub fn column_by_key(&self, key: &str) -> Option<&Column> {
        self.column_index_of(key).and_then(|i| self.columns.get(i))
    }

    // ---- Engine ------------------------------------------------------

    /// Recompute the processed view and dependent layout/state.
    ///
    /// Called on every rows/columns/filter/search/sort change. Selection
    /// and editing are clamped to the new shape rather than re-anchored.
    pub(crate) fn reprocess(&mut self) {
        self.processed = self.engine.process(&self.rows, &self.columns);

        let visible: Vec<&Row> = self
            .processed
            .iter()
            .filter_map(|&src| self.rows.get(src))
            .collect();
        self.row_layout = RowLayout::build(
            &visible,
            self.options.row_height,
            self.row_height_fn.as_ref(),
        );
        self.viewport.clamp_scroll(&self.row_layout);

        self.clamp_selection();
        if let Some(ref session) = self.editing {
            let in_bounds = session.row_index < self.processed.len()
                && self.column_index.contains_key(&session.column_key);
            if !in_bounds {
                self.editing = None;
            }
        }
    }

    pub fn set_filter(&mut self, column_key: &str, values: std::collections::HashSet<String>) {
        if !self.options.allow_filters {
            return;
        }
        self.engine.set_filter(column_key, values);
        self.reprocess();
    }

    pub fn clear_filter(&mut self, column_key: &str) {
        self.engine.clear_filter(column_key);
        self.reprocess();
    }

    pub fn clear_all_filters(&mut self) {
        self.engine.clear_all_filters();
        self.reprocess();
    }

    pub fn set_search(&mut self, term: &str) {
        self.engine.set_search(term);
        self.reprocess();
    }

    pub fn set_sort(&mut self, sort: Option<SortState>) {
        if !self.options.allow_sorting {
            return;
        }
        self.engine.set_sort(sort);
        self.reprocess();
    }

    /// Header-click sort toggle, gated on the column's `sortable` flag.
    pub fn toggle_sort(&mut self, column_key: &str) {
        if !self.options.allow_sorting {
            return;
        }
        let sortable = self
            .column_by_key(column_key)
            .map(|c| c.sortable)
            .unwrap_or(false);
        if !sortable {
            return;
        }
        self.engine.toggle_sort(column_key);
        self.reprocess();
    }

    pub fn sort_state(&self) -> Option<&SortState> {
        self.engine.sort()
    }

    /// Distinct values for a column's filter dropdown (over all rows,
    /// not the processed view, so cleared options stay offered).
    pub fn filter_values(&self, column_key: &str) -> Vec<String> {
        unique_values(&self.rows, column_key)
    }

    // ---- Viewport ----------------------------------------------------

    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport.height = height.min(self.options.max_height);
        self.viewport.clamp_scroll(&self.row_layout);
    }

    pub fn set_scroll(&mut self, y: f32) {
        self.viewport.set_scroll(y, &self.row_layout);
    }

    pub fn scroll_by(&mut self, delta_y: f32) {
        self.viewport.scroll_by(delta_y, &self.row_layout);
    }

    pub fn scroll_offset(&self) -> f32 {
        self.viewport.scroll_y
    }

    /// Total scrollable content height (sizes the scroll canvas).
    pub fn content_height(&self) -> f32 {
        self.row_layout.total_height()
    }

    /// The rows to render for the current scroll position.
    pub fn visible_window(&self) -> VisibleWindow {
        self.viewport.visible_window(&self.row_layout)
    }

    pub fn row_offset(&self, row_index: usize) -> f32 {
        self.row_layout.offset_of(row_index)
    }

    pub fn row_height(&self, row_index: usize) -> f32 {
        self.row_layout.height_of(row_index)
    }

    /// Bring a processed row fully into view.
    pub fn scroll_to_row(&mut self, row_index: usize) {
        self.viewport.scroll_to_row(row_index, &self.row_layout);
    }

    /// Hit-test content coordinates to a cell.
    pub fn cell_at_point(&self, x: f32, y: f32) -> Option<(usize, String)> {
        if x < 0.0 || y < 0.0 || y >= self.row_layout.total_height() {
            return None;
        }
        let row = self.row_layout.row_at_y(y);
        let mut edge = 0.0;
        for column in &self.columns {
            edge += self.column_layout.width_of(&column.key);
            if x < edge {
                return Some((row, column.key.clone()));
            }
        }
        None
    }

    // ---- Column widths -----------------------------------------------

    pub fn column_width(&self, key: &str) -> f32 {
        self.column_layout.width_of(key)
    }

    pub fn total_width(&self) -> f32 {
        self.column_layout.total_width(&self.columns)
    }

    pub fn begin_column_resize(&mut self, column_key: &str, pointer_x: f32) {
        if !self.options.allow_column_resize {
            return;
        }
        self.column_layout.begin_resize(column_key, pointer_x);
    }

    /// Returns true if the width changed (the web layer coalesces these
    /// to animation-frame granularity).
    pub fn update_column_resize(&mut self, pointer_x: f32) -> bool {
        self.column_layout
            .update_resize(pointer_x, self.store.as_mut())
    }

    pub fn end_column_resize(&mut self) {
        self.column_layout.end_resize();
    }

    pub fn is_resizing_column(&self) -> bool {
        self.column_layout.is_resizing()
    }

    /// Auto-fit a column to its longest formatted value.
    pub fn auto_fit_column(&mut self, column_key: &str) {
        let Some(column) = self.column_by_key(column_key).cloned() else {
            return;
        };
        let values: Vec<String> = self
            .processed
            .iter()
            .filter_map(|&src| self.rows.get(src))
            .map(|row| {
                let value = row.get(&column.key).cloned().unwrap_or_default();
                column.format_value(&value, row)
            })
            .collect();
        self.column_layout
            .auto_fit(&column, values.into_iter(), self.store.as_mut());
    }

    /// Restore default widths and clear the persisted entry.
    pub fn reset_column_widths(&mut self) {
        self.column_layout.reset(&self.columns, self.store.as_mut());
    }

    // ---- Commit path -------------------------------------------------

    /// The single mutation point: commit `value` into the cell at a
    /// processed `row_index` / `column_key`.
    ///
    /// The processed index is mapped back to the source array before
    /// mutating; without that, edits under an active sort/filter would
    /// corrupt the wrong row. Notifications fire cell → row → data, then
    /// the view is reprocessed.
    pub fn update_cell(&mut self, row_index: usize, column_key: &str, value: CellValue) -> bool {
        let Some(src) = self.resolve_source_index(row_index) else {
            return false;
        };
        let Some(existing) = self.rows.get(src) else {
            return false;
        };

        // Shallow copy; the original row object is never mutated in place.
        let mut updated = existing.clone();
        updated.insert(column_key.to_string(), value.clone());

        if let Some(slot) = self.rows.get_mut(src) {
            *slot = updated;
        }

        let Some(row) = self.rows.get(src) else {
            return false;
        };
        if let Some(ref f) = self.callbacks.on_cell_change {
            f(row_index, column_key, &value, row);
        }
        if let Some(ref f) = self.callbacks.on_row_change {
            f(row_index, row);
        }
        if let Some(ref f) = self.callbacks.on_data_change {
            f(&self.rows);
        }

        self.reprocess();
        true
    }

    /// Map a processed index to its source-array index.
    ///
    /// The mapping is recomputed synchronously on every reshape, so it
    /// cannot go stale between staging and committing an edit; a bounds
    /// check is all that is needed.
    pub(crate) fn resolve_source_index(&self, row_index: usize) -> Option<usize> {
        let src = self.processed.get(row_index).copied()?;
        if src < self.rows.len() {
            return Some(src);
        }
        None
    }

    /// Locate a row by identity after a reshape (used by tests and
    /// `scroll_to_row_id`).
    pub fn find_row_by_id(&self, id: &str) -> Option<usize> {
        self.processed.iter().position(|&src| {
            self.rows
                .get(src)
                .map(|row| self.row_id(row, src) == id)
                .unwrap_or(false)
        })
    }

    /// Scroll to the row with the given identity, if visible in the
    /// processed view.
    pub fn scroll_to_row_id(&mut self, id: &str) -> bool {
        match self.find_row_by_id(id) {
            Some(row_index) => {
                self.scroll_to_row(row_index);
                true
            }
            None => false,
        }
    }

    // ---- Workbook ----------------------------------------------------

    /// Export the processed rows to XLSX bytes plus the file name.
    ///
    /// A configured `export_builder` replaces the built-in writer.
    /// Rejected while another import/export is in flight.
    pub fn export_to_excel(&mut self) -> Result<(String, Vec<u8>)> {
        if self.io_busy {
            return Err(crate::error::GridError::Export(
                "an import/export is already in progress".into(),
            ));
        }
        self.io_busy = true;
        let rows: Vec<&Row> = self
            .processed
            .iter()
            .filter_map(|&src| self.rows.get(src))
            .collect();
        let result = match self.options.workbook.export_builder.clone() {
            Some(builder) => builder(&rows, &self.columns),
            None => {
                let widths: Vec<f32> = self
                    .columns
                    .iter()
                    .map(|c| self.column_layout.width_of(&c.key))
                    .collect();
                workbook::export_rows(&rows, &self.columns, &widths, &self.options.workbook)
            }
        };
        self.io_busy = false;
        let bytes = result?;
        Ok((workbook::export_file_name(&self.options.workbook), bytes))
    }

    /// Import XLSX bytes over the existing rows.
    ///
    /// Mapped fields overwrite copies of the rows at the same relative
    /// position; overflow rows are dropped and counted in the summary.
    /// A configured `import_parser` replaces the built-in reader; its
    /// rows merge onto the grid under the same contract. Fires
    /// `on_data_change` once when anything was applied.
    pub fn import_from_excel(&mut self, bytes: &[u8]) -> Result<ImportSummary> {
        if self.io_busy {
            return Err(crate::error::GridError::Import(
                "an import/export is already in progress".into(),
            ));
        }
        self.io_busy = true;
        let result = match self.options.workbook.import_parser.clone() {
            Some(parser) => parser(bytes, &self.columns)
                .map(|imported| workbook::merge_imported(imported, &mut self.rows, &self.columns)),
            None => workbook::import_rows(bytes, &mut self.rows, &self.columns),
        };
        self.io_busy = false;
        let summary = result?;
        if summary.updated_rows > 0 {
            if let Some(ref f) = self.callbacks.on_data_change {
                f(&self.rows);
            }
            self.reprocess();
        }
        Ok(summary)
    }
}

fn build_column_index(columns: &[Column]) -> HashMap<String, usize> {
    columns
        .iter()
        .enumerate()
        .map(|(i, c)| (c.key.clone(), i))
        .collect()
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
    use crate::engine::SortDirection;
    use crate::types::ColumnType;

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
            Column::new("status", "Status"),
        ];
        let mut g = GridView::new(columns, GridOptions::default());
        g.set_rows(vec![
            row(&[
                ("id", CellValue::Number(1.0)),
                ("v", CellValue::Number(5.0)),
                ("status", "open".into()),
            ]),
            row(&[
                ("id", CellValue::Number(2.0)),
                ("v", CellValue::Number(1.0)),
                ("status", "closed".into()),
            ]),
        ]);
        g
    }

    #[test]
    fn test_commit_under_sort_hits_source_row() {
        let mut g = grid();
        g.set_sort(Some(SortState {
            column_key: "v".into(),
            direction: SortDirection::Ascending,
        }));
        // Processed order: [id 2, id 1]
        assert_eq!(g.row_id_at(0).unwrap(), "2");

        assert!(g.update_cell(0, "v", CellValue::Number(9.0)));

        // Source index 1 (id 2) mutated, not source index 0
        let data = g.get_data();
        assert_eq!(data[0].get("v"), Some(&CellValue::Number(5.0)));
        assert_eq!(data[1].get("v"), Some(&CellValue::Number(9.0)));
        // Edited row still locatable by id after the re-sort
        assert!(g.find_row_by_id("2").is_some());
    }

    #[test]
    fn test_update_cell_shallow_copies() {
        let mut g = grid();
        let before = g.get_data()[0].clone();
        assert!(g.update_cell(0, "status", "closed".into()));
        // New object, old snapshot untouched
        assert_eq!(before.get("status"), Some(&"open".into()));
        assert_eq!(g.get_data()[0].get("status"), Some(&"closed".into()));
    }

    #[test]
    fn test_callbacks_fire_in_order() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
        let mut g = grid();
        let mut callbacks = GridCallbacks::default();
        let o = Rc::clone(&order);
        callbacks.on_cell_change = Some(Box::new(move |_, _, _, _| o.borrow_mut().push("cell")));
        let o = Rc::clone(&order);
        callbacks.on_row_change = Some(Box::new(move |_, _| o.borrow_mut().push("row")));
        let o = Rc::clone(&order);
        callbacks.on_data_change = Some(Box::new(move |_| o.borrow_mut().push("data")));
        g.set_callbacks(callbacks);

        assert!(g.update_cell(0, "v", CellValue::Number(7.0)));
        assert_eq!(*order.borrow(), vec!["cell", "row", "data"]);
    }

    #[test]
    fn test_update_cell_out_of_range() {
        let mut g = grid();
        assert!(!g.update_cell(99, "v", CellValue::Number(1.0)));
    }

    #[test]
    fn test_filter_shrinks_processed_view() {
        let mut g = grid();
        g.set_filter("status", ["open".to_string()].into_iter().collect());
        assert_eq!(g.processed_count(), 1);
        assert_eq!(g.row_id_at(0).unwrap(), "1");
        g.clear_all_filters();
        assert_eq!(g.processed_count(), 2);
    }

    #[test]
    fn test_custom_row_id_hook() {
        let mut g = grid();
        g.set_row_id_fn(|row, _| format!("row-{}", row.get("id").map(|v| v.display()).unwrap_or_default()));
        assert_eq!(g.row_id_at(0).unwrap(), "row-1");
    }

    #[test]
    fn test_cell_at_point() {
        let g = grid();
        // Default widths are 150px; row height 36px
        assert_eq!(g.cell_at_point(10.0, 10.0), Some((0, "id".into())));
        assert_eq!(g.cell_at_point(160.0, 40.0), Some((1, "v".into())));
        assert_eq!(g.cell_at_point(10_000.0, 10.0), None);
        assert_eq!(g.cell_at_point(10.0, 10_000.0), None);
    }

    #[test]
    fn test_export_import_busy_guard_resets() {
        let mut g = grid();
        let first = g.export_to_excel();
        assert!(first.is_ok());
        // Busy flag released after completion
        assert!(g.export_to_excel().is_ok());
    }
}
