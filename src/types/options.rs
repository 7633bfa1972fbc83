//! Grid configuration supplied by the host.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{Column, Row};

/// Whether cells may enter edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridMode {
    #[default]
    View,
    Edit,
}

/// Builds the exported workbook bytes from the processed rows, replacing
/// the built-in XLSX writer entirely.
pub type ExportBuilder = Arc<dyn Fn(&[&Row], &[Column]) -> Result<Vec<u8>>>;

/// Parses uploaded workbook bytes into rows, replacing the built-in XLSX
/// reader. The grid still merges the parsed rows onto its own by relative
/// position.
pub type ImportParser = Arc<dyn Fn(&[u8], &[Column]) -> Result<Vec<Row>>>;

/// Workbook (XLSX) configuration.
#[derive(Clone, Default)]
pub struct WorkbookConfig {
    /// Sheet name; defaults to "Sheet1".
    pub sheet_name: Option<String>,
    /// Exported file name; defaults to a date-stamped name.
    pub file_name: Option<String>,
    /// Full override of export serialization.
    pub export_builder: Option<ExportBuilder>,
    /// Full override of import parsing.
    pub import_parser: Option<ImportParser>,
}

impl fmt::Debug for WorkbookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkbookConfig")
            .field("sheet_name", &self.sheet_name)
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// Sizing, virtualization, and feature toggles.
#[derive(Debug, Clone)]
pub struct GridOptions {
    pub mode: GridMode,
    /// Default row height in pixels; the per-row hook overrides it.
    pub row_height: f32,
    /// Extra rows rendered beyond the viewport to reduce flicker.
    pub overscan: usize,
    /// Minimum rows kept in the render window even when fewer fit.
    pub min_buffer_rows: usize,
    /// Floor on rendered rows; placeholders fill the gap when the data
    /// set is smaller, so the canvas height stays stable while filtering.
    pub min_render_rows: usize,
    /// Maximum grid height in pixels (viewport height cap).
    pub max_height: f32,
    pub allow_keyboard_navigation: bool,
    pub allow_column_resize: bool,
    pub allow_filters: bool,
    pub allow_sorting: bool,
    /// Opaque key for persisted column widths; `None` disables persistence.
    pub persist_key: Option<String>,
    pub workbook: WorkbookConfig,
}

impl Default for GridOptions {
    fn default() -> Self {
        GridOptions {
            mode: GridMode::View,
            row_height: 36.0,
            overscan: 5,
            min_buffer_rows: 10,
            min_render_rows: 8,
            max_height: 600.0,
            allow_keyboard_navigation: true,
            allow_column_resize: true,
            allow_filters: true,
            allow_sorting: true,
            persist_key: None,
            workbook: WorkbookConfig::default(),
        }
    }
}
