//! The wasm-exported `Grid` — DOM wiring over `GridView`.
//!
//! Event handlers are registered on construction: scroll, pointer
//! selection, keyboard navigation, and double-click editing work without
//! manual JavaScript wiring. The host renders; after every state change
//! the grid invokes the registered render callback.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use serde::Deserialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::{HtmlDivElement, HtmlElement, KeyboardEvent, MouseEvent};

use crate::grid::{GridView, SelectOptions, SelectionSnapshot};
use crate::layout::LayoutStore;
use crate::types::{
    CellValue, Column, ColumnType, GridMode, GridOptions, InvalidNumber, Row, SelectOption,
    WorkbookConfig,
};

/// Delay (ms) after scroll stops before a settle re-render.
const SCROLL_SETTLE_DELAY_MS: i32 = 100;

/// `localStorage`-backed width persistence. Quota or privacy-mode
/// failures degrade to no persistence.
struct LocalStore;

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

impl LayoutStore for LocalStore {
    fn load(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok()?
    }

    fn save(&mut self, key: &str, value: &str) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(key, value);
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(key);
        }
    }
}

/// JSON-friendly column descriptor accepted from JavaScript.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColumnSpec {
    key: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    width: Option<f32>,
    #[serde(default)]
    min_width: Option<f32>,
    #[serde(default)]
    max_width: Option<f32>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    editable: Option<bool>,
    #[serde(default)]
    sortable: Option<bool>,
    #[serde(default)]
    filterable: Option<bool>,
    #[serde(default)]
    options: Vec<SelectOptionSpec>,
    #[serde(default)]
    invalid_number: Option<String>,
}

#[derive(Deserialize)]
struct SelectOptionSpec {
    value: String,
    #[serde(default)]
    label: Option<String>,
}

impl ColumnSpec {
    fn into_column(self) -> Column {
        let label = self.label.unwrap_or_else(|| self.key.clone());
        let mut column = Column::new(self.key, label);
        if let Some(w) = self.width {
            column = column.width(w);
        }
        if let Some(w) = self.min_width {
            column = column.min_width(w);
        }
        if let Some(w) = self.max_width {
            column = column.max_width(w);
        }
        column = column.kind(match self.kind.as_deref() {
            Some("number") => ColumnType::Number,
            Some("date") => ColumnType::Date,
            Some("select") => ColumnType::Select,
            Some("checkbox") => ColumnType::Checkbox,
            Some("custom") => ColumnType::Custom,
            _ => ColumnType::Text,
        });
        if let Some(e) = self.editable {
            column = column.editable(e);
        }
        if let Some(s) = self.sortable {
            column = column.sortable(s);
        }
        if let Some(f) = self.filterable {
            column = column.filterable(f);
        }
        if !self.options.is_empty() {
            column = column.options(
                self.options
                    .into_iter()
                    .map(|o| {
                        let label = o.label.unwrap_or_else(|| o.value.clone());
                        SelectOption::new(o.value, label)
                    })
                    .collect(),
            );
        }
        if self.invalid_number.as_deref() == Some("storeNull") {
            column = column.invalid_number(InvalidNumber::StoreNull);
        }
        column
    }
}

/// JSON-friendly options accepted from JavaScript. Absent fields keep
/// the defaults.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct OptionsSpec {
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    row_height: Option<f32>,
    #[serde(default)]
    overscan: Option<usize>,
    #[serde(default)]
    min_buffer_rows: Option<usize>,
    #[serde(default)]
    min_render_rows: Option<usize>,
    #[serde(default)]
    max_height: Option<f32>,
    #[serde(default)]
    allow_keyboard_navigation: Option<bool>,
    #[serde(default)]
    allow_column_resize: Option<bool>,
    #[serde(default)]
    allow_filters: Option<bool>,
    #[serde(default)]
    allow_sorting: Option<bool>,
    #[serde(default)]
    persist_key: Option<String>,
    #[serde(default)]
    sheet_name: Option<String>,
    #[serde(default)]
    file_name: Option<String>,
}

impl OptionsSpec {
    fn into_options(self) -> GridOptions {
        let defaults = GridOptions::default();
        GridOptions {
            mode: match self.mode.as_deref() {
                Some("edit") => GridMode::Edit,
                _ => GridMode::View,
            },
            row_height: self.row_height.unwrap_or(defaults.row_height),
            overscan: self.overscan.unwrap_or(defaults.overscan),
            min_buffer_rows: self.min_buffer_rows.unwrap_or(defaults.min_buffer_rows),
            min_render_rows: self.min_render_rows.unwrap_or(defaults.min_render_rows),
            max_height: self.max_height.unwrap_or(defaults.max_height),
            allow_keyboard_navigation: self
                .allow_keyboard_navigation
                .unwrap_or(defaults.allow_keyboard_navigation),
            allow_column_resize: self
                .allow_column_resize
                .unwrap_or(defaults.allow_column_resize),
            allow_filters: self.allow_filters.unwrap_or(defaults.allow_filters),
            allow_sorting: self.allow_sorting.unwrap_or(defaults.allow_sorting),
            persist_key: self.persist_key,
            // The serialization override hooks are Rust-side config; a
            // JS options object carries only the names.
            workbook: WorkbookConfig {
                sheet_name: self.sheet_name,
                file_name: self.file_name,
                ..WorkbookConfig::default()
            },
        }
    }
}

/// Shared state reachable from event closures.
struct SharedState {
    grid: GridView,
    render_callback: Option<Function>,
    scroll_settle_timer: Option<i32>,
    scroll_settle_closure: Option<Closure<dyn FnMut()>>,
    last_scroll_ms: f64,
}

fn now_ms() -> f64 {
    if let Some(window) = web_sys::window() {
        if let Some(perf) = window.performance() {
            return perf.now();
        }
    }
    js_sys::Date::now()
}

fn err_to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// The grid component exported to JavaScript.
#[wasm_bindgen]
pub struct Grid {
    state: Rc<RefCell<SharedState>>,
    #[allow(dead_code)] // kept alive for the DOM listeners
    mouse_closures: Vec<Closure<dyn FnMut(MouseEvent)>>,
    #[allow(dead_code)]
    key_closure: Option<Closure<dyn FnMut(KeyboardEvent)>>,
    #[allow(dead_code)]
    scroll_closure: Option<Closure<dyn FnMut(web_sys::Event)>>,
    container: HtmlDivElement,
}

#[wasm_bindgen]
impl Grid {
    /// Create a grid bound to a scroll container element.
    ///
    /// `columns` is an array of column descriptors; `options` an optional
    /// options object. Event listeners are attached here.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container: HtmlDivElement,
        columns: JsValue,
        options: JsValue,
    ) -> Result<Grid, JsValue> {
        console_error_panic_hook::set_once();

        let specs: Vec<ColumnSpec> =
            serde_wasm_bindgen::from_value(columns).map_err(err_to_js)?;
        let columns: Vec<Column> = specs.into_iter().map(ColumnSpec::into_column).collect();
        let options: GridOptions = if options.is_undefined() || options.is_null() {
            GridOptions::default()
        } else {
            serde_wasm_bindgen::from_value::<OptionsSpec>(options)
                .map_err(err_to_js)?
                .into_options()
        };

        let grid = GridView::with_store(columns, options, Box::new(LocalStore));
        let state = Rc::new(RefCell::new(SharedState {
            grid,
            render_callback: None,
            scroll_settle_timer: None,
            scroll_settle_closure: None,
            last_scroll_ms: 0.0,
        }));

        let mut mouse_closures: Vec<Closure<dyn FnMut(MouseEvent)>> = Vec::new();
        let target: &HtmlElement = container.as_ref();

        // Pointer press: anchor selection and open a drag session.
        {
            let state = Rc::clone(&state);
            let container = container.clone();
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                if let Some((row, key)) = Self::hit_cell(&state, &container, &event) {
                    let mut s = state.borrow_mut();
                    s.grid.pointer_down(row, &key, event.shift_key());
                    drop(s);
                    Self::request_render(&state);
                }
            }) as Box<dyn FnMut(MouseEvent)>);
            target
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())
                .ok();
            mouse_closures.push(closure);
        }

        // Pointer move: drag-extend selection, or drive a column resize.
        {
            let state = Rc::clone(&state);
            let container = container.clone();
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                let resizing = state.borrow().grid.is_resizing_column();
                if resizing {
                    let rect = container.get_bounding_client_rect();
                    #[allow(clippy::cast_possible_truncation)]
                    let x = event.client_x() as f32 - rect.left() as f32;
                    let changed = state.borrow_mut().grid.update_column_resize(x);
                    if changed {
                        Self::request_render(&state);
                    }
                    return;
                }
                if !state.borrow().grid.is_dragging() {
                    return;
                }
                if let Some((row, key)) = Self::hit_cell(&state, &container, &event) {
                    state.borrow_mut().grid.pointer_enter(row, &key);
                    Self::request_render(&state);
                }
            }) as Box<dyn FnMut(MouseEvent)>);
            target
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())
                .ok();
            mouse_closures.push(closure);
        }

        // Pointer release: close drags and resizes; clicks resolve here.
        {
            let state = Rc::clone(&state);
            let closure = Closure::wrap(Box::new(move |_event: MouseEvent| {
                let mut s = state.borrow_mut();
                s.grid.end_column_resize();
                s.grid.pointer_up();
                drop(s);
                Self::request_render(&state);
            }) as Box<dyn FnMut(MouseEvent)>);
            target
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref())
                .ok();
            mouse_closures.push(closure);
        }

        // Pointer leaving the grid ends the drag session.
        {
            let state = Rc::clone(&state);
            let closure = Closure::wrap(Box::new(move |_event: MouseEvent| {
                state.borrow_mut().grid.cancel_drag();
            }) as Box<dyn FnMut(MouseEvent)>);
            target
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref())
                .ok();
            mouse_closures.push(closure);
        }

        // Double-click opens the editor.
        {
            let state = Rc::clone(&state);
            let container = container.clone();
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                if let Some((row, key)) = Self::hit_cell(&state, &container, &event) {
                    state.borrow_mut().grid.double_click(row, &key);
                    Self::request_render(&state);
                }
            }) as Box<dyn FnMut(MouseEvent)>);
            target
                .add_event_listener_with_callback("dblclick", closure.as_ref().unchecked_ref())
                .ok();
            mouse_closures.push(closure);
        }

        // Context menu notification.
        {
            let state = Rc::clone(&state);
            let container = container.clone();
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                if let Some((row, _)) = Self::hit_cell(&state, &container, &event) {
                    state.borrow_mut().grid.context_menu(row);
                }
            }) as Box<dyn FnMut(MouseEvent)>);
            target
                .add_event_listener_with_callback("contextmenu", closure.as_ref().unchecked_ref())
                .ok();
            mouse_closures.push(closure);
        }

        // Native scroll drives the virtualizer. Every event re-renders so
        // the window tracks the scroll position; the settle timer adds one
        // final render after the last event of a fling.
        let scroll_closure = {
            let state = Rc::clone(&state);
            let container = container.clone();
            let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                let y = container.scroll_top() as f32;
                {
                    let mut s = state.borrow_mut();
                    s.grid.set_scroll(y);
                    s.last_scroll_ms = now_ms();
                }
                Self::request_render(&state);
                Self::schedule_scroll_settle(&state);
            }) as Box<dyn FnMut(web_sys::Event)>);
            target
                .add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref())
                .ok();
            Some(closure)
        };

        // Keyboard on the document: navigation, F2, Escape.
        let key_closure = {
            let state = Rc::clone(&state);
            let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
                let editing_text = state.borrow().grid.is_editing();
                let key = event.key();
                // While an editor input is focused, only the keys that
                // leave edit mode are intercepted.
                if editing_text
                    && !matches!(key.as_str(), "Tab" | "Enter" | "Escape")
                {
                    return;
                }
                let handled = state.borrow_mut().grid.handle_key(&key, event.shift_key());
                if handled {
                    event.prevent_default();
                    Self::request_render(&state);
                }
            }) as Box<dyn FnMut(KeyboardEvent)>);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                document
                    .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())
                    .ok();
            }
            Some(closure)
        };

        Ok(Grid {
            state,
            mouse_closures,
            key_closure,
            scroll_closure,
            container,
        })
    }

    /// Host-supplied render function, invoked after every state change.
    pub fn set_render_callback(&mut self, callback: Function) {
        self.state.borrow_mut().render_callback = Some(callback);
        Self::request_render(&self.state);
    }

    // ---- Data --------------------------------------------------------

    pub fn set_rows(&mut self, rows: JsValue) -> Result<(), JsValue> {
        let rows: Vec<Row> = serde_wasm_bindgen::from_value(rows).map_err(err_to_js)?;
        self.state.borrow_mut().grid.set_rows(rows);
        Self::request_render(&self.state);
        Ok(())
    }

    pub fn set_columns(&mut self, columns: JsValue) -> Result<(), JsValue> {
        let specs: Vec<ColumnSpec> =
            serde_wasm_bindgen::from_value(columns).map_err(err_to_js)?;
        self.state
            .borrow_mut()
            .grid
            .set_columns(specs.into_iter().map(ColumnSpec::into_column).collect());
        Self::request_render(&self.state);
        Ok(())
    }

    /// The full (unfiltered) row array.
    pub fn get_data(&self) -> Result<JsValue, JsValue> {
        let s = self.state.borrow();
        serde_wasm_bindgen::to_value(s.grid.get_data()).map_err(err_to_js)
    }

    pub fn set_mode(&mut self, mode: &str) {
        let mode = if mode == "edit" {
            GridMode::Edit
        } else {
            GridMode::View
        };
        self.state.borrow_mut().grid.set_mode(mode);
        Self::request_render(&self.state);
    }

    pub fn row_count(&self) -> usize {
        self.state.borrow().grid.processed_count()
    }

    /// Row behind a processed index, as a plain object.
    pub fn row_at(&self, index: usize) -> Result<JsValue, JsValue> {
        let s = self.state.borrow();
        match s.grid.processed_row(index) {
            Some(row) => serde_wasm_bindgen::to_value(row).map_err(err_to_js),
            None => Ok(JsValue::NULL),
        }
    }

    pub fn row_id_at(&self, index: usize) -> Option<String> {
        self.state.borrow().grid.row_id_at(index)
    }

    /// Commit a value into a cell from the host side.
    pub fn update_cell(&mut self, row_index: usize, column_key: &str, value: JsValue) -> Result<bool, JsValue> {
        let value: CellValue = serde_wasm_bindgen::from_value(value).map_err(err_to_js)?;
        let applied = self
            .state
            .borrow_mut()
            .grid
            .update_cell(row_index, column_key, value);
        Self::request_render(&self.state);
        Ok(applied)
    }

    // ---- Viewport ----------------------------------------------------

    pub fn set_viewport_height(&mut self, height: f32) {
        self.state.borrow_mut().grid.set_viewport_height(height);
    }

    pub fn content_height(&self) -> f32 {
        self.state.borrow().grid.content_height()
    }

    pub fn total_width(&self) -> f32 {
        self.state.borrow().grid.total_width()
    }

    pub fn scroll_offset(&self) -> f32 {
        self.state.borrow().grid.scroll_offset()
    }

    /// `{ start, end, placeholder_rows, offset_y, total_height }` for the
    /// current scroll position.
    pub fn visible_window(&self) -> Result<JsValue, JsValue> {
        let window = self.state.borrow().grid.visible_window();
        serde_wasm_bindgen::to_value(&window).map_err(err_to_js)
    }

    pub fn row_offset(&self, index: usize) -> f32 {
        self.state.borrow().grid.row_offset(index)
    }

    pub fn row_height(&self, index: usize) -> f32 {
        self.state.borrow().grid.row_height(index)
    }

    /// Scroll the container so a row is fully visible.
    #[allow(clippy::cast_possible_truncation)]
    pub fn scroll_to_row(&mut self, index: usize) {
        {
            let mut s = self.state.borrow_mut();
            s.grid.scroll_to_row(index);
            let y = s.grid.scroll_offset();
            self.container.set_scroll_top(y as i32);
        }
        Self::request_render(&self.state);
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn scroll_to_row_id(&mut self, id: &str) -> bool {
        let found = self.state.borrow_mut().grid.scroll_to_row_id(id);
        if found {
            let y = self.state.borrow().grid.scroll_offset();
            self.container.set_scroll_top(y as i32);
            Self::request_render(&self.state);
        }
        found
    }

    // ---- Selection & editing -----------------------------------------

    pub fn select_cell(&mut self, row_index: usize, column_key: &str, extend: bool) {
        self.state.borrow_mut().grid.begin_selection(
            row_index,
            column_key,
            SelectOptions {
                extend,
                ..SelectOptions::default()
            },
        );
        Self::request_render(&self.state);
    }

    /// `{ mode, startRow, startCol, endRow, endCol }` or null.
    pub fn selection(&self) -> Result<JsValue, JsValue> {
        let snapshot: Option<SelectionSnapshot> = self.state.borrow().grid.selection_snapshot();
        serde_wasm_bindgen::to_value(&snapshot).map_err(err_to_js)
    }

    pub fn is_selected(&self, row: usize, col: usize) -> bool {
        self.state.borrow().grid.is_selected(row, col)
    }

    pub fn active_row(&self) -> Option<usize> {
        self.state.borrow().grid.active_cell().map(|(r, _)| r)
    }

    pub fn active_column_key(&self) -> Option<String> {
        self.state
            .borrow()
            .grid
            .active_position()
            .map(|p| p.column_key)
    }

    pub fn begin_edit(&mut self, row_index: usize, column_key: &str) -> bool {
        let ok = self.state.borrow_mut().grid.begin_edit(row_index, column_key);
        Self::request_render(&self.state);
        ok
    }

    pub fn set_draft(&mut self, value: &str) {
        self.state.borrow_mut().grid.set_draft(value);
    }

    pub fn commit_edit(&mut self) -> bool {
        let ok = self.state.borrow_mut().grid.commit_edit();
        Self::request_render(&self.state);
        ok
    }

    pub fn cancel_edit(&mut self) {
        self.state.borrow_mut().grid.cancel_edit();
        Self::request_render(&self.state);
    }

    /// Blur handler for the editor input element.
    pub fn blur_commit(&mut self) {
        self.state.borrow_mut().grid.blur_commit();
        Self::request_render(&self.state);
    }

    pub fn is_editing(&self) -> bool {
        self.state.borrow().grid.is_editing()
    }

    pub fn editing_draft(&self) -> Option<String> {
        self.state
            .borrow()
            .grid
            .editing_session()
            .map(|s| s.draft.clone())
    }

    pub fn toggle_checkbox(&mut self, row_index: usize, column_key: &str) -> bool {
        let ok = self
            .state
            .borrow_mut()
            .grid
            .toggle_checkbox(row_index, column_key);
        Self::request_render(&self.state);
        ok
    }

    /// Keyboard entry point for hosts that manage focus themselves.
    pub fn handle_key(&mut self, key: &str, shift: bool) -> bool {
        let handled = self.state.borrow_mut().grid.handle_key(key, shift);
        if handled {
            Self::request_render(&self.state);
        }
        handled
    }

    // ---- Filter / sort / search --------------------------------------

    pub fn set_filter(&mut self, column_key: &str, values: Vec<String>) {
        self.state
            .borrow_mut()
            .grid
            .set_filter(column_key, values.into_iter().collect());
        Self::request_render(&self.state);
    }

    pub fn clear_filter(&mut self, column_key: &str) {
        self.state.borrow_mut().grid.clear_filter(column_key);
        Self::request_render(&self.state);
    }

    pub fn clear_all_filters(&mut self) {
        self.state.borrow_mut().grid.clear_all_filters();
        Self::request_render(&self.state);
    }

    /// Distinct values for a column's filter dropdown.
    pub fn filter_values(&self, column_key: &str) -> Vec<String> {
        self.state.borrow().grid.filter_values(column_key)
    }

    pub fn toggle_sort(&mut self, column_key: &str) {
        self.state.borrow_mut().grid.toggle_sort(column_key);
        Self::request_render(&self.state);
    }

    /// `[columnKey, "ascending" | "descending"]` or null.
    pub fn sort_state(&self) -> JsValue {
        let s = self.state.borrow();
        match s.grid.sort_state() {
            Some(sort) => {
                let arr = js_sys::Array::new();
                arr.push(&JsValue::from_str(&sort.column_key));
                let dir = match sort.direction {
                    crate::engine::SortDirection::Ascending => "ascending",
                    crate::engine::SortDirection::Descending => "descending",
                };
                arr.push(&JsValue::from_str(dir));
                arr.into()
            }
            None => JsValue::NULL,
        }
    }

    pub fn set_search(&mut self, term: &str) {
        self.state.borrow_mut().grid.set_search(term);
        Self::request_render(&self.state);
    }

    // ---- Column widths -----------------------------------------------

    pub fn column_width(&self, column_key: &str) -> f32 {
        self.state.borrow().grid.column_width(column_key)
    }

    pub fn begin_column_resize(&mut self, column_key: &str, pointer_x: f32) {
        self.state
            .borrow_mut()
            .grid
            .begin_column_resize(column_key, pointer_x);
    }

    pub fn auto_fit_column(&mut self, column_key: &str) {
        self.state.borrow_mut().grid.auto_fit_column(column_key);
        Self::request_render(&self.state);
    }

    pub fn reset_column_widths(&mut self) {
        self.state.borrow_mut().grid.reset_column_widths();
        Self::request_render(&self.state);
    }

    // ---- Workbook ----------------------------------------------------

    /// Export the current view as XLSX bytes.
    pub fn export_xlsx(&mut self) -> Result<js_sys::Uint8Array, JsValue> {
        let (_, bytes) = self
            .state
            .borrow_mut()
            .grid
            .export_to_excel()
            .map_err(err_to_js)?;
        Ok(js_sys::Uint8Array::from(bytes.as_slice()))
    }

    /// File name the export should be saved under.
    pub fn export_file_name(&self) -> String {
        crate::workbook::export_file_name(&self.state.borrow().grid.options().workbook)
    }

    /// Import XLSX bytes over the current rows; resolves to an import
    /// summary object.
    pub fn import_xlsx(&mut self, data: Vec<u8>) -> js_sys::Promise {
        let state = Rc::clone(&self.state);
        future_to_promise(async move {
            let summary = state
                .borrow_mut()
                .grid
                .import_from_excel(&data)
                .map_err(err_to_js)?;
            Self::request_render(&state);
            serde_wasm_bindgen::to_value(&summary).map_err(err_to_js)
        })
    }
}

impl Grid {
    /// Translate a mouse event to a (processed row, column key) hit.
    #[allow(clippy::cast_possible_truncation)]
    fn hit_cell(
        state: &Rc<RefCell<SharedState>>,
        container: &HtmlDivElement,
        event: &MouseEvent,
    ) -> Option<(usize, String)> {
        let rect = container.get_bounding_client_rect();
        let x = event.client_x() as f32 - rect.left() as f32;
        let y = event.client_y() as f32 - rect.top() as f32;
        let s = state.borrow();
        let content_y = y + s.grid.scroll_offset();
        let (row, key) = s.grid.cell_at_point(x, content_y)?;
        if row >= s.grid.processed_count() {
            return None;
        }
        Some((row, key))
    }

    fn request_render(state: &Rc<RefCell<SharedState>>) {
        let callback = state.borrow().render_callback.clone();
        if let Some(callback) = callback {
            let _ = callback.call0(&JsValue::NULL);
        }
    }

    /// Re-render once scrolling has settled, so flings do not pay a full
    /// render per scroll event.
    fn schedule_scroll_settle(state: &Rc<RefCell<SharedState>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut s = state.borrow_mut();
        if let Some(timer_id) = s.scroll_settle_timer.take() {
            window.clear_timeout_with_handle(timer_id);
        }
        if s.scroll_settle_closure.is_none() {
            let weak = Rc::downgrade(state);
            let closure = Closure::wrap(Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    Grid::handle_scroll_settle(&state);
                }
            }) as Box<dyn FnMut()>);
            s.scroll_settle_closure = Some(closure);
        }
        let Some(ref callback) = s.scroll_settle_closure else {
            return;
        };
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            SCROLL_SETTLE_DELAY_MS,
        ) {
            Ok(id) => s.scroll_settle_timer = Some(id),
            Err(_) => s.scroll_settle_timer = None,
        }
    }

    fn handle_scroll_settle(state: &Rc<RefCell<SharedState>>) {
        {
            let mut s = state.borrow_mut();
            s.scroll_settle_timer = None;
            let elapsed = now_ms() - s.last_scroll_ms;
            if elapsed < f64::from(SCROLL_SETTLE_DELAY_MS) {
                drop(s);
                Self::schedule_scroll_settle(state);
                return;
            }
        }
        Self::request_render(state);
    }
}
