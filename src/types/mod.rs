//! Core data model: values, rows, columns, selection, options.

mod column;
mod options;
mod selection;
mod value;

pub use column::{
    Column, ColumnType, Formatter, InvalidNumber, Parser, SelectOption, DEFAULT_COLUMN_WIDTH,
    MIN_RESIZE_WIDTH,
};
pub use options::{ExportBuilder, GridMode, GridOptions, ImportParser, WorkbookConfig};
pub use selection::{Selection, SelectionMode};
pub use value::{default_row_id, CellPosition, CellValue, Row};
