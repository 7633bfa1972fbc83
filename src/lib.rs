//! gridview - an editable data grid engine for the web
//!
//! Drives spreadsheet-style grids in the browser via WebAssembly:
//! - Virtualized rendering windows for large row sets
//! - Excel-style cell/row/column selection and keyboard navigation
//! - Typed in-cell editing with per-column parsing
//! - Column resize, auto-fit, and persisted widths
//! - Filter, search, and sort over an index-mapped view
//! - XLSX export and header-mapped import
//!
//! The engine itself is plain Rust and fully testable natively; the DOM
//! layer in [`web`] only compiles for wasm32.
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { Grid } from 'gridview';
//! await init();
//! const grid = new Grid(container, columns, { mode: "edit" });
//! grid.set_render_callback(render);
//! grid.set_rows(rows);
//! ```

pub mod engine;
pub mod error;
pub mod grid;
pub mod layout;
pub mod types;
pub mod workbook;

#[cfg(target_arch = "wasm32")]
pub mod web;

use wasm_bindgen::prelude::*;

pub use error::{GridError, Result};
pub use grid::{EditSession, GridCallbacks, GridView, NavTarget, SelectOptions};
pub use types::*;

#[cfg(target_arch = "wasm32")]
pub use web::Grid;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
