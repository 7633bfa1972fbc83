//! Column descriptors.
//!
//! A column's `key` is its identity; the column order is the render order
//! and the basis for range math in selections.

use std::fmt;
use std::sync::Arc;

use crate::types::{CellValue, Row};

/// Editor/renderer family for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Date,
    Select,
    Checkbox,
    /// Host supplies its own renderer/editor; the grid only drives the
    /// commit/close lifecycle.
    Custom,
}

/// How a numeric column treats input that does not parse as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidNumber {
    /// Refuse the commit; the editor stays open.
    #[default]
    Reject,
    /// Store `CellValue::Null`, displayed as "-".
    StoreNull,
}

/// One entry of a select column's dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        SelectOption {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Formats a committed value for display. Falls back to the raw display
/// value if absent.
pub type Formatter = Arc<dyn Fn(&CellValue, &Row) -> String>;

/// Transforms raw editor input into the stored value. Returning `None`
/// rejects the commit.
pub type Parser = Arc<dyn Fn(&str) -> Option<CellValue>>;

/// A column descriptor supplied by the host.
#[derive(Clone)]
pub struct Column {
    /// Unique identity; also the row field this column reads and writes.
    pub key: String,
    /// Header label, also matched (case-insensitively) on import.
    pub label: String,
    /// Default pixel width.
    pub width: f32,
    pub min_width: Option<f32>,
    pub max_width: Option<f32>,
    pub kind: ColumnType,
    pub editable: bool,
    pub sortable: bool,
    pub filterable: bool,
    /// Select options (select columns only).
    pub options: Vec<SelectOption>,
    pub formatter: Option<Formatter>,
    pub parser: Option<Parser>,
    /// Numeric-input policy (number columns only).
    pub invalid_number: InvalidNumber,
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("width", &self.width)
            .field("kind", &self.kind)
            .field("editable", &self.editable)
            .finish_non_exhaustive()
    }
}

impl Column {
    /// Create a text column with defaults: editable, sortable, filterable.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Column {
            key: key.into(),
            label: label.into(),
            width: DEFAULT_COLUMN_WIDTH,
            min_width: None,
            max_width: None,
            kind: ColumnType::Text,
            editable: true,
            sortable: true,
            filterable: true,
            options: Vec::new(),
            formatter: None,
            parser: None,
            invalid_number: InvalidNumber::default(),
        }
    }

    pub fn kind(mut self, kind: ColumnType) -> Self {
        self.kind = kind;
        self
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn min_width(mut self, width: f32) -> Self {
        self.min_width = Some(width);
        self
    }

    pub fn max_width(mut self, width: f32) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn formatter(mut self, f: impl Fn(&CellValue, &Row) -> String + 'static) -> Self {
        self.formatter = Some(Arc::new(f));
        self
    }

    pub fn parser(mut self, f: impl Fn(&str) -> Option<CellValue> + 'static) -> Self {
        self.parser = Some(Arc::new(f));
        self
    }

    pub fn invalid_number(mut self, policy: InvalidNumber) -> Self {
        self.invalid_number = policy;
        self
    }

    /// Display string for a value in this column.
    ///
    /// Formatter failures are not possible at the type level (the hook
    /// returns a `String`); a missing formatter falls back to the raw
    /// display value, with `Null` rendered as "-".
    pub fn format_value(&self, value: &CellValue, row: &Row) -> String {
        if let Some(ref f) = self.formatter {
            return f(value, row);
        }
        if value.is_empty() {
            return "-".to_string();
        }
        value.display()
    }

    /// Parse raw editor input into a stored value for this column.
    ///
    /// The column's parser wins if present. Otherwise the column type
    /// drives coercion; `None` means the commit is rejected.
    pub fn parse_input(&self, input: &str) -> Option<CellValue> {
        if let Some(ref p) = self.parser {
            return p(input);
        }
        let trimmed = input.trim();
        match self.kind {
            ColumnType::Number => {
                if trimmed.is_empty() {
                    return Some(CellValue::Null);
                }
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => Some(CellValue::Number(n)),
                    _ => match self.invalid_number {
                        InvalidNumber::Reject => None,
                        InvalidNumber::StoreNull => Some(CellValue::Null),
                    },
                }
            }
            ColumnType::Checkbox => Some(CellValue::Bool(
                trimmed.eq_ignore_ascii_case("true") || trimmed == "1",
            )),
            ColumnType::Text | ColumnType::Date | ColumnType::Select | ColumnType::Custom => {
                if trimmed.is_empty() {
                    Some(CellValue::Null)
                } else {
                    Some(CellValue::Text(input.to_string()))
                }
            }
        }
    }
}

/// Default column width in pixels.
pub const DEFAULT_COLUMN_WIDTH: f32 = 150.0;

/// Hard floor applied during resize drags.
pub const MIN_RESIZE_WIDTH: f32 = 60.0;

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
    fn test_parse_number_default_rejects() {
        let col = Column::new("qty", "Qty").kind(ColumnType::Number);
        assert_eq!(col.parse_input("12.5"), Some(CellValue::Number(12.5)));
        assert_eq!(col.parse_input(""), Some(CellValue::Null));
        assert_eq!(col.parse_input("abc"), None);
        assert_eq!(col.parse_input("NaN"), None);
    }

    #[test]
    fn test_parse_number_store_null() {
        let col = Column::new("qty", "Qty")
            .kind(ColumnType::Number)
            .invalid_number(InvalidNumber::StoreNull);
        assert_eq!(col.parse_input("abc"), Some(CellValue::Null));
    }

    #[test]
    fn test_parse_checkbox() {
        let col = Column::new("done", "Done").kind(ColumnType::Checkbox);
        assert_eq!(col.parse_input("true"), Some(CellValue::Bool(true)));
        assert_eq!(col.parse_input("1"), Some(CellValue::Bool(true)));
        assert_eq!(col.parse_input("no"), Some(CellValue::Bool(false)));
    }

    #[test]
    fn test_custom_parser_wins() {
        let col = Column::new("pct", "Percent")
            .kind(ColumnType::Number)
            .parser(|s| s.trim_end_matches('%').parse::<f64>().ok().map(CellValue::Number));
        assert_eq!(col.parse_input("40%"), Some(CellValue::Number(40.0)));
    }

    #[test]
    fn test_format_value_null_dash() {
        let col = Column::new("a", "A");
        let row = Row::new();
        assert_eq!(col.format_value(&CellValue::Null, &row), "-");
        assert_eq!(col.format_value(&CellValue::Number(3.0), &row), "3");
    }
}
