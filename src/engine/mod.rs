//! The filter → search → sort pipeline.
//!
//! Produces `processed`: indices into the caller-owned row array. All
//! downstream addressing (selection, editing, virtualization) operates on
//! processed indices; the index map is what makes edits under an active
//! sort/filter land on the right source row.

use std::collections::{HashMap, HashSet};

use crate::types::{CellValue, Column, ColumnType, Row};

/// Sort direction for the single active sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Toggle order used by header clicks.
    pub fn toggled(self) -> SortDirection {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// The single active `(column, direction)` sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub column_key: String,
    pub direction: SortDirection,
}

/// Filter, search, and sort state.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    /// Per-column allowed stringified values. An empty set is removed —
    /// it means "no filter", not "match nothing".
    filters: HashMap<String, HashSet<String>>,
    search: String,
    sort: Option<SortState>,
}

impl EngineState {
    /// Replace a column's allowed-value set. Empty clears the filter.
    pub fn set_filter(&mut self, column_key: &str, values: HashSet<String>) {
        if values.is_empty() {
            self.filters.remove(column_key);
        } else {
            self.filters.insert(column_key.to_string(), values);
        }
    }

    pub fn clear_filter(&mut self, column_key: &str) {
        self.filters.remove(column_key);
    }

    pub fn clear_all_filters(&mut self) {
        self.filters.clear();
    }

    pub fn filter_for(&self, column_key: &str) -> Option<&HashSet<String>> {
        self.filters.get(column_key)
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty() || !self.search.is_empty()
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_sort(&mut self, sort: Option<SortState>) {
        self.sort = sort;
    }

    /// Header-click behavior: same column toggles direction, a different
    /// column starts ascending.
    pub fn toggle_sort(&mut self, column_key: &str) {
        self.sort = Some(match self.sort.take() {
            Some(s) if s.column_key == column_key => SortState {
                column_key: s.column_key,
                direction: s.direction.toggled(),
            },
            _ => SortState {
                column_key: column_key.to_string(),
                direction: SortDirection::Ascending,
            },
        });
    }

    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    /// Run the fixed pipeline: filter → search → sort.
    ///
    /// Returns indices into `rows`. Sorting is stable, so equal keys keep
    /// their source order and the result is deterministic.
    pub fn process(&self, rows: &[Row], columns: &[Column]) -> Vec<usize> {
        let search = self.search.trim().to_lowercase();

        let mut processed: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| self.row_passes_filters(row))
            .filter(|(_, row)| search.is_empty() || row_matches_search(row, columns, &search))
            .map(|(i, _)| i)
            .collect();

        if let Some(ref sort) = self.sort {
            let numeric = columns
                .iter()
                .find(|c| c.key == sort.column_key)
                .is_some_and(|c| c.kind == ColumnType::Number);
            sort_indices(&mut processed, rows, &sort.column_key, sort.direction, numeric);
        }

        processed
    }

    fn row_passes_filters(&self, row: &Row) -> bool {
        self.filters.iter().all(|(key, allowed)| {
            let value = row.get(key).map(CellValue::display).unwrap_or_default();
            allowed.contains(&value)
        })
    }
}

/// Case-insensitive substring search over every column's stringified value.
fn row_matches_search(row: &Row, columns: &[Column], needle: &str) -> bool {
    columns.iter().any(|col| {
        row.get(&col.key)
            .map(|v| v.display().to_lowercase().contains(needle))
            .unwrap_or(false)
    })
}

/// Stable sort of row indices by one column.
///
/// Number columns compare numerically; every other column compares its
/// display strings case-insensitively, so text digits like "10" and "9"
/// keep lexicographic order. Null/missing values sort last ascending and
/// first descending, so the direction flip is a pure reversal of the
/// comparator.
fn sort_indices(
    indices: &mut [usize],
    rows: &[Row],
    column_key: &str,
    direction: SortDirection,
    numeric: bool,
) {
    use std::cmp::Ordering;

    indices.sort_by(|&a, &b| {
        let va = rows.get(a).and_then(|r| r.get(column_key));
        let vb = rows.get(b).and_then(|r| r.get(column_key));

        let ord = match (value_or_none(va), value_or_none(vb)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater, // nulls last ascending
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                if numeric {
                    match (x.as_number(), y.as_number()) {
                        (Some(nx), Some(ny)) => {
                            nx.partial_cmp(&ny).unwrap_or(Ordering::Equal)
                        }
                        (None, Some(_)) => Ordering::Greater,
                        (Some(_), None) => Ordering::Less,
                        (None, None) => x.compare(y),
                    }
                } else {
                    let sx = x.display().to_lowercase();
                    let sy = y.display().to_lowercase();
                    sx.cmp(&sy)
                }
            }
        };

        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

fn value_or_none(v: Option<&CellValue>) -> Option<&CellValue> {
    match v {
        Some(CellValue::Null) | None => None,
        Some(other) => Some(other),
    }
}

/// Distinct stringified values for one column, sorted for the filter UI.
pub fn unique_values(rows: &[Row], column_key: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut values: Vec<String> = Vec::new();
    for row in rows {
        let value = row.get(column_key).map(CellValue::display).unwrap_or_default();
        if seen.insert(value.clone()) {
            values.push(value);
        }
    }
    values.sort();
    values
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
    use crate::types::Column;

    fn row(pairs: &[(&str, CellValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn fixture() -> (Vec<Row>, Vec<Column>) {
        let rows = vec![
            row(&[
                ("id", CellValue::Number(1.0)),
                ("status", "open".into()),
                ("v", CellValue::Number(5.0)),
            ]),
            row(&[
                ("id", CellValue::Number(2.0)),
                ("status", "closed".into()),
                ("v", CellValue::Number(1.0)),
            ]),
            row(&[
                ("id", CellValue::Number(3.0)),
                ("status", "open".into()),
                ("v", CellValue::Null),
            ]),
        ];
        let columns = vec![
            Column::new("id", "Id").kind(ColumnType::Number),
            Column::new("status", "Status"),
            Column::new("v", "Value").kind(ColumnType::Number),
        ];
        (rows, columns)
    }

    #[test]
    fn test_no_state_passes_all() {
        let (rows, columns) = fixture();
        let engine = EngineState::default();
        assert_eq!(engine.process(&rows, &columns), vec![0, 1, 2]);
    }

    #[test]
    fn test_value_filter() {
        let (rows, columns) = fixture();
        let mut engine = EngineState::default();
        engine.set_filter("status", ["open".to_string()].into_iter().collect());
        assert_eq!(engine.process(&rows, &columns), vec![0, 2]);
    }

    #[test]
    fn test_empty_filter_set_clears() {
        let (rows, columns) = fixture();
        let mut engine = EngineState::default();
        engine.set_filter("status", ["open".to_string()].into_iter().collect());
        engine.set_filter("status", HashSet::new());
        assert_eq!(engine.process(&rows, &columns), vec![0, 1, 2]);
        assert!(!engine.has_filters());
    }

    #[test]
    fn test_select_all_equals_clear() {
        // Filter idempotence: allowing every unique value == no filter.
        let (rows, columns) = fixture();
        let mut engine = EngineState::default();
        let all: HashSet<String> = unique_values(&rows, "status").into_iter().collect();
        engine.set_filter("status", all);
        let filtered = engine.process(&rows, &columns);
        engine.clear_filter("status");
        assert_eq!(filtered, engine.process(&rows, &columns));
    }

    #[test]
    fn test_filter_and_search_conjunctive() {
        // Filter keeps only "open" rows; search matches only a "closed"
        // row. Conjunction leaves nothing.
        let (rows, columns) = fixture();
        let mut engine = EngineState::default();
        engine.set_filter("status", ["open".to_string()].into_iter().collect());
        engine.set_search("closed");
        assert!(engine.process(&rows, &columns).is_empty());
    }

    #[test]
    fn test_search_case_insensitive() {
        let (rows, columns) = fixture();
        let mut engine = EngineState::default();
        engine.set_search("OPEN");
        assert_eq!(engine.process(&rows, &columns), vec![0, 2]);
    }

    #[test]
    fn test_sort_numeric_with_nulls() {
        let (rows, columns) = fixture();
        let mut engine = EngineState::default();
        engine.set_sort(Some(SortState {
            column_key: "v".into(),
            direction: SortDirection::Ascending,
        }));
        // Nulls last ascending
        assert_eq!(engine.process(&rows, &columns), vec![1, 0, 2]);

        engine.set_sort(Some(SortState {
            column_key: "v".into(),
            direction: SortDirection::Descending,
        }));
        // Nulls first descending
        assert_eq!(engine.process(&rows, &columns), vec![2, 0, 1]);
    }

    #[test]
    fn test_sort_text_locale_free() {
        let rows = vec![
            row(&[("name", "banana".into())]),
            row(&[("name", "Apple".into())]),
            row(&[("name", "cherry".into())]),
        ];
        let columns = vec![Column::new("name", "Name")];
        let mut engine = EngineState::default();
        engine.toggle_sort("name");
        assert_eq!(engine.process(&rows, &columns), vec![1, 0, 2]);
    }

    #[test]
    fn test_toggle_sort_cycles() {
        let mut engine = EngineState::default();
        engine.toggle_sort("a");
        assert_eq!(engine.sort().unwrap().direction, SortDirection::Ascending);
        engine.toggle_sort("a");
        assert_eq!(engine.sort().unwrap().direction, SortDirection::Descending);
        engine.toggle_sort("b");
        assert_eq!(engine.sort().unwrap().column_key, "b");
        assert_eq!(engine.sort().unwrap().direction, SortDirection::Ascending);
    }

    #[test]
    fn test_sort_text_digits_lexicographic() {
        // Text columns never compare numerically: "10" < "9"
        let rows = vec![
            row(&[("code", "9".into())]),
            row(&[("code", "10".into())]),
            row(&[("code", "2".into())]),
        ];
        let columns = vec![Column::new("code", "Code")];
        let mut engine = EngineState::default();
        engine.toggle_sort("code");
        assert_eq!(engine.process(&rows, &columns), vec![1, 2, 0]);
    }

    #[test]
    fn test_numeric_sort_on_number_column() {
        // "10" vs "9": numeric column compares numerically.
        let rows = vec![
            row(&[("v", CellValue::Number(10.0))]),
            row(&[("v", CellValue::Number(9.0))]),
        ];
        let columns = vec![Column::new("v", "V").kind(ColumnType::Number)];
        let mut engine = EngineState::default();
        engine.toggle_sort("v");
        assert_eq!(engine.process(&rows, &columns), vec![1, 0]);
    }

    #[test]
    fn test_unique_values_sorted() {
        let (rows, _) = fixture();
        assert_eq!(unique_values(&rows, "status"), vec!["closed", "open"]);
    }
}
