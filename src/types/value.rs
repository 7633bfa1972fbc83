//! Cell values and the coercion rules shared by editing, filtering,
//! sorting, and workbook serialization.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A single typed cell value.
///
/// Dates are carried as ISO-8601 text; the column type steers which editor
/// the host renders, not the storage representation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Absent / cleared value. Displays as "-" through formatters.
    #[default]
    Null,
    /// Boolean (checkbox columns).
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Text, dates, select values.
    Text(String),
}

impl CellValue {
    /// Stringified form used by filters, search, and export headers.
    ///
    /// This is the raw (unformatted) rendering; column formatters apply on
    /// top of it for display only.
    pub fn display(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => {
                if *b {
                    "true".to_string()
                } else {
                    "false".to_string()
                }
            }
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => s.trim().parse().ok(),
            CellValue::Null => None,
        }
    }

    /// True for `Null` and empty text.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Type-aware ordering: numeric when both sides have a numeric view,
    /// case-insensitive text otherwise. Column sorting applies this only
    /// on number columns; text columns compare display strings directly.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        }
        let a = self.display().to_lowercase();
        let b = other.display().to_lowercase();
        a.cmp(&b)
    }

    /// Best-effort coercion from raw editor input, mirroring how a user
    /// would expect plain typing to behave: empty clears, booleans and
    /// numbers are detected, everything else is text.
    pub fn detect(input: &str) -> CellValue {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return CellValue::Null;
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return CellValue::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return CellValue::Bool(false);
        }
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return CellValue::Number(n);
            }
        }
        CellValue::Text(input.to_string())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// Format a number without trailing `.0` noise for integral values.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

/// A row is an opaque record: column key to value.
///
/// The grid assumes no schema beyond what the columns describe.
pub type Row = std::collections::HashMap<String, CellValue>;

/// Position of a cell in processed-row space.
///
/// `row_index` addresses the filtered/sorted view, never the raw row
/// array; it is transient and recomputed whenever the view changes shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPosition {
    pub row_index: usize,
    pub column_key: String,
}

impl CellPosition {
    pub fn new(row_index: usize, column_key: impl Into<String>) -> Self {
        CellPosition {
            row_index,
            column_key: column_key.into(),
        }
    }
}

/// Resolve a row's identity for reconciliation across re-sorts.
///
/// Fallback chain: the `"id"` field's display value, else the positional
/// index. Callers with a custom `get_row_id` hook apply it before this.
pub fn default_row_id(row: &Row, index: usize) -> String {
    match row.get("id") {
        Some(v) if !v.is_empty() => v.display(),
        _ => format!("#{index}"),
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
    fn test_display() {
        assert_eq!(CellValue::Null.display(), "");
        assert_eq!(CellValue::Bool(true).display(), "true");
        assert_eq!(CellValue::Number(5.0).display(), "5");
        assert_eq!(CellValue::Number(5.25).display(), "5.25");
        assert_eq!(CellValue::Text("abc".into()).display(), "abc");
    }

    #[test]
    fn test_detect() {
        assert_eq!(CellValue::detect(""), CellValue::Null);
        assert_eq!(CellValue::detect("  "), CellValue::Null);
        assert_eq!(CellValue::detect("TRUE"), CellValue::Bool(true));
        assert_eq!(CellValue::detect("false"), CellValue::Bool(false));
        assert_eq!(CellValue::detect("42"), CellValue::Number(42.0));
        assert_eq!(CellValue::detect("-3.5"), CellValue::Number(-3.5));
        assert_eq!(CellValue::detect("42x"), CellValue::Text("42x".into()));
        // Non-finite numeric text stays text
        assert_eq!(CellValue::detect("inf"), CellValue::Text("inf".into()));
    }

    #[test]
    fn test_compare_numeric() {
        let a = CellValue::Number(2.0);
        let b = CellValue::Number(10.0);
        assert_eq!(a.compare(&b), Ordering::Less);
        // Numeric text compares numerically
        let c = CellValue::Text("2".into());
        assert_eq!(c.compare(&b), Ordering::Less);
    }

    #[test]
    fn test_compare_text_case_insensitive() {
        let a = CellValue::Text("Apple".into());
        let b = CellValue::Text("apple".into());
        assert_eq!(a.compare(&b), Ordering::Equal);
    }

    #[test]
    fn test_default_row_id() {
        let mut row = Row::new();
        assert_eq!(default_row_id(&row, 3), "#3");
        row.insert("id".into(), CellValue::Number(7.0));
        assert_eq!(default_row_id(&row, 3), "7");
    }
}
