//! Reads an XLSX workbook back into the grid's rows.
//!
//! The first worksheet's header row is matched (case-insensitively)
//! against column keys and labels; matched fields overwrite copies of
//! the grid rows at the same relative position. Rows beyond the grid's
//! length are dropped and counted.

use std::collections::BTreeSet;
use std::io::{BufReader, Cursor, Read, Seek};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::{GridError, Result};
use crate::types::{CellValue, Column, ColumnType, InvalidNumber, Row};

use super::{parse_cell_ref, ImportSummary};

/// Apply XLSX bytes onto `rows`, field by mapped field.
///
/// Values pass through the target column's typing: checkbox and number
/// columns coerce, and a rejected numeric value skips its field.
pub fn import_rows(bytes: &[u8], rows: &mut Vec<Row>, columns: &[Column]) -> Result<ImportSummary> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let shared_strings = parse_shared_strings(&mut archive);
    let sheet_path = first_sheet_path(&mut archive)
        .ok_or_else(|| GridError::Import("workbook has no worksheet".into()))?;
    let grid = parse_sheet_grid(&mut archive, &sheet_path, &shared_strings)?;

    let Some((header, data_rows)) = grid.split_first() else {
        return Ok(ImportSummary::default());
    };

    // Header cell -> column, case-insensitive on key or label.
    let mut mapping: Vec<(usize, &Column)> = Vec::new();
    for (idx, cell) in header.iter().enumerate() {
        let CellValue::Text(ref text) = cell else {
            continue;
        };
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            continue;
        }
        let matched = columns.iter().find(|c| {
            c.key.to_lowercase() == needle || c.label.trim().to_lowercase() == needle
        });
        if let Some(column) = matched {
            mapping.push((idx, column));
        }
    }
    if mapping.is_empty() {
        return Err(GridError::Import(
            "no worksheet columns match the grid".into(),
        ));
    }

    let mut summary = ImportSummary::default();
    summary.mapped_columns = mapping.iter().map(|(_, c)| c.key.clone()).collect();
    summary.mapped_columns.sort();

    for (i, imported) in data_rows.iter().enumerate() {
        let Some(existing) = rows.get(i) else {
            summary.dropped_rows = data_rows.len() - i;
            break;
        };
        let mut updated = existing.clone();
        let mut changed = false;
        for &(cell_idx, column) in &mapping {
            let raw = imported.get(cell_idx).cloned().unwrap_or_default();
            let Some(value) = coerce_for_column(column, raw) else {
                continue;
            };
            if updated.get(&column.key) != Some(&value) {
                updated.insert(column.key.clone(), value);
                changed = true;
            }
        }
        if changed {
            if let Some(slot) = rows.get_mut(i) {
                *slot = updated;
            }
            summary.updated_rows += 1;
        }
    }

    Ok(summary)
}

/// Merge rows produced by a custom import parser onto the grid rows.
///
/// Same contract as `import_rows`: mapped fields overwrite copies of the
/// rows at the same relative position, overflow rows are dropped and
/// counted, and only keys backed by a grid column apply.
pub(crate) fn merge_imported(
    imported: Vec<Row>,
    rows: &mut Vec<Row>,
    columns: &[Column],
) -> ImportSummary {
    let mut summary = ImportSummary::default();
    let mut mapped: BTreeSet<String> = BTreeSet::new();

    for (i, source) in imported.into_iter().enumerate() {
        let Some(existing) = rows.get(i) else {
            summary.dropped_rows += 1;
            continue;
        };
        let mut updated = existing.clone();
        let mut changed = false;
        for column in columns {
            let Some(value) = source.get(&column.key) else {
                continue;
            };
            mapped.insert(column.key.clone());
            if updated.get(&column.key) != Some(value) {
                updated.insert(column.key.clone(), value.clone());
                changed = true;
            }
        }
        if changed {
            if let Some(slot) = rows.get_mut(i) {
                *slot = updated;
            }
            summary.updated_rows += 1;
        }
    }

    summary.mapped_columns = mapped.into_iter().collect();
    summary
}

/// Apply the target column's typing to an imported value.
///
/// `None` skips the field (a numeric column under the `Reject` policy
/// keeps the grid's existing value rather than storing garbage).
fn coerce_for_column(column: &Column, value: CellValue) -> Option<CellValue> {
    match column.kind {
        ColumnType::Checkbox => Some(CellValue::Bool(match value {
            CellValue::Bool(b) => b,
            CellValue::Number(n) => n.abs() > 0.0,
            CellValue::Text(ref s) => s.eq_ignore_ascii_case("true") || s == "1",
            CellValue::Null => false,
        })),
        ColumnType::Number => match value {
            CellValue::Null => Some(CellValue::Null),
            CellValue::Number(n) => Some(CellValue::Number(n)),
            other => match other.as_number() {
                Some(n) => Some(CellValue::Number(n)),
                None => match column.invalid_number {
                    InvalidNumber::Reject => None,
                    InvalidNumber::StoreNull => Some(CellValue::Null),
                },
            },
        },
        _ => Some(value),
    }
}

/// Read the first worksheet into header-keyed rows.
///
/// Standalone entry point (CLI, tooling): unlike `import_rows` there is
/// no column set to map onto; the header cells become the row keys.
pub fn read_rows(bytes: &[u8]) -> Result<(Vec<String>, Vec<Row>)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let shared_strings = parse_shared_strings(&mut archive);
    let sheet_path = first_sheet_path(&mut archive)
        .ok_or_else(|| GridError::Import("workbook has no worksheet".into()))?;
    let grid = parse_sheet_grid(&mut archive, &sheet_path, &shared_strings)?;

    let Some((header, data_rows)) = grid.split_first() else {
        return Ok((Vec::new(), Vec::new()));
    };
    let headers: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let label = cell.display();
            if label.trim().is_empty() {
                format!("column{}", i + 1)
            } else {
                label.trim().to_string()
            }
        })
        .collect();

    let rows = data_rows
        .iter()
        .map(|cells| {
            headers
                .iter()
                .enumerate()
                .filter_map(|(i, key)| {
                    let value = cells.get(i).cloned().unwrap_or_default();
                    (value != CellValue::Null).then(|| (key.clone(), value))
                })
                .collect::<Row>()
        })
        .collect();

    Ok((headers, rows))
}

/// ZIP path of the first worksheet.
///
/// Resolved through `xl/workbook.xml` and its relationship part; a
/// workbook missing either falls back to conventional naming.
fn first_sheet_path<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Option<String> {
    if let Some(path) = sheet_path_from_rels(archive) {
        return Some(path);
    }
    if archive
        .file_names()
        .any(|n| n == "xl/worksheets/sheet1.xml")
    {
        return Some("xl/worksheets/sheet1.xml".to_string());
    }
    let mut sheets: Vec<&str> = archive
        .file_names()
        .filter(|n| n.starts_with("xl/worksheets/") && n.ends_with(".xml"))
        .collect();
    sheets.sort_unstable();
    sheets.first().map(|s| (*s).to_string())
}

fn sheet_path_from_rels<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Option<String> {
    let rid = first_sheet_rid(archive)?;
    let target = relationship_target(archive, &rid)?;
    let path = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    };
    archive.file_names().any(|n| n == path).then_some(path)
}

/// Relationship id of the first `<sheet>` in `xl/workbook.xml`.
fn first_sheet_rid<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Option<String> {
    let file = archive.by_name("xl/workbook.xml").ok()?;
    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(false);
    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e) | Event::Empty(ref e))
                if e.local_name().as_ref() == b"sheet" =>
            {
                // The sheet order in workbook.xml is the tab order.
                for attr in e.attributes().flatten() {
                    if attr.key.local_name().as_ref() == b"id" {
                        return Some(String::from_utf8_lossy(&attr.value).into_owned());
                    }
                }
                return None;
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }
}

/// Target of a relationship id in `xl/_rels/workbook.xml.rels`.
fn relationship_target<R: Read + Seek>(archive: &mut ZipArchive<R>, rid: &str) -> Option<String> {
    let file = archive.by_name("xl/_rels/workbook.xml.rels").ok()?;
    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(false);
    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e) | Event::Empty(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = Some(String::from_utf8_lossy(&attr.value).into_owned()),
                        b"Target" => {
                            target = Some(String::from_utf8_lossy(&attr.value).into_owned());
                        }
                        _ => {}
                    }
                }
                if id.as_deref() == Some(rid) {
                    return target;
                }
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }
}

fn parse_shared_strings<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Vec<String> {
    let Ok(file) = archive.by_name("xl/sharedStrings.xml") else {
        return Vec::new(); // optional part
    };
    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(false);

    let mut strings = Vec::new();
    let mut buf = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"t" if in_si => in_t = true,
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_t => {
                if let Ok(text) = e.unescape() {
                    current.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    strings.push(current.clone());
                    in_si = false;
                }
                b"t" => in_t = false,
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    strings
}

/// Cell type tag from the `t` attribute of a `<c>` element.
#[derive(Copy, Clone)]
enum CellTypeTag {
    Shared,
    Inline,
    Str,
    Bool,
    Default,
}

fn parse_cell_type_tag(value: &[u8]) -> CellTypeTag {
    match value {
        b"s" => CellTypeTag::Shared,
        b"b" => CellTypeTag::Bool,
        b"str" => CellTypeTag::Str,
        b"inlineStr" => CellTypeTag::Inline,
        _ => CellTypeTag::Default,
    }
}

/// Parse one worksheet into a dense row-major grid of values.
fn parse_sheet_grid<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
    shared_strings: &[String],
) -> Result<Vec<Vec<CellValue>>> {
    let file = archive.by_name(path)?;
    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(false);

    let mut grid: Vec<Vec<CellValue>> = Vec::new();
    let mut buf = Vec::new();

    let mut current_cell: Option<(u32, u32, CellTypeTag)> = None;
    let mut raw = String::new();
    let mut in_v = false;
    let mut in_is_t = false;
    let mut next_col: u32 = 0;
    let mut current_row: u32 = 0;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(ref event @ (Event::Start(_) | Event::Empty(_))) => {
                let (Event::Start(ref e) | Event::Empty(ref e)) = event else {
                    continue;
                };
                match e.local_name().as_ref() {
                    b"row" => {
                        next_col = 0;
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"r" {
                                if let Some(r) = ascii_u32(&attr.value) {
                                    current_row = r.saturating_sub(1);
                                }
                            }
                        }
                    }
                    b"c" => {
                        let mut col = next_col;
                        let mut tag = CellTypeTag::Default;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"r" => {
                                    let cell_ref = String::from_utf8_lossy(&attr.value);
                                    if let Some((c, r)) = parse_cell_ref(&cell_ref) {
                                        col = c;
                                        current_row = r;
                                    }
                                }
                                b"t" => tag = parse_cell_type_tag(&attr.value),
                                _ => {}
                            }
                        }
                        next_col = col + 1;
                        raw.clear();
                        if matches!(event, Event::Start(_)) {
                            current_cell = Some((current_row, col, tag));
                        }
                        // Empty <c/> carries no value; nothing to place.
                    }
                    b"v" if current_cell.is_some() => in_v = true,
                    b"t" if current_cell.is_some() => in_is_t = true,
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) if in_v || in_is_t => {
                if let Ok(text) = e.unescape() {
                    raw.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"v" => in_v = false,
                b"t" => in_is_t = false,
                b"c" => {
                    if let Some((row, col, tag)) = current_cell.take() {
                        let value = resolve_value(&raw, tag, shared_strings);
                        place(&mut grid, row, col, value);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(GridError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(grid)
}

fn resolve_value(raw: &str, tag: CellTypeTag, shared_strings: &[String]) -> CellValue {
    match tag {
        CellTypeTag::Shared => raw
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|idx| shared_strings.get(idx))
            .map(|s| text_or_null(s))
            .unwrap_or_default(),
        CellTypeTag::Inline | CellTypeTag::Str => text_or_null(raw),
        CellTypeTag::Bool => CellValue::Bool(raw.trim() == "1"),
        CellTypeTag::Default => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                CellValue::Null
            } else {
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => CellValue::Number(n),
                    _ => CellValue::Text(raw.to_string()),
                }
            }
        }
    }
}

fn text_or_null(s: &str) -> CellValue {
    if s.is_empty() {
        CellValue::Null
    } else {
        CellValue::Text(s.to_string())
    }
}

fn place(grid: &mut Vec<Vec<CellValue>>, row: u32, col: u32, value: CellValue) {
    let row = row as usize;
    let col = col as usize;
    while grid.len() <= row {
        grid.push(Vec::new());
    }
    if let Some(cells) = grid.get_mut(row) {
        while cells.len() <= col {
            cells.push(CellValue::Null);
        }
        if let Some(slot) = cells.get_mut(col) {
            *slot = value;
        }
    }
}

fn ascii_u32(value: &[u8]) -> Option<u32> {
    let mut num: u32 = 0;
    let mut seen = false;
    for &b in value {
        if !b.is_ascii_digit() {
            return None;
        }
        seen = true;
        num = num.saturating_mul(10).saturating_add(u32::from(b - b'0'));
    }
    seen.then_some(num)
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
    use crate::types::{ColumnType, WorkbookConfig};
    use crate::workbook::export_rows;

    fn row(pairs: &[(&str, CellValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Name"),
            Column::new("qty", "Qty").kind(ColumnType::Number),
            Column::new("done", "Done").kind(ColumnType::Checkbox),
        ]
    }

    fn export(rows: &[Row]) -> Vec<u8> {
        let refs: Vec<&Row> = rows.iter().collect();
        export_rows(&refs, &columns(), &[150.0; 3], &WorkbookConfig::default()).unwrap()
    }

    #[test]
    fn test_round_trip_updates_rows() {
        let source = vec![
            row(&[
                ("name", "alpha".into()),
                ("qty", CellValue::Number(3.0)),
                ("done", CellValue::Bool(true)),
            ]),
            row(&[
                ("name", "beta".into()),
                ("qty", CellValue::Number(7.5)),
                ("done", CellValue::Bool(false)),
            ]),
        ];
        let bytes = export(&source);

        let mut target = vec![
            row(&[("name", "old".into()), ("qty", CellValue::Null), ("extra", "kept".into())]),
            row(&[("name", "old2".into())]),
        ];
        let summary = import_rows(&bytes, &mut target, &columns()).unwrap();

        assert_eq!(summary.updated_rows, 2);
        assert_eq!(summary.dropped_rows, 0);
        assert_eq!(
            summary.mapped_columns,
            vec!["done".to_string(), "name".into(), "qty".into()]
        );
        assert_eq!(target[0].get("name"), Some(&"alpha".into()));
        assert_eq!(target[0].get("qty"), Some(&CellValue::Number(3.0)));
        assert_eq!(target[0].get("done"), Some(&CellValue::Bool(true)));
        // Unmapped fields survive the shallow copy
        assert_eq!(target[0].get("extra"), Some(&"kept".into()));
        assert_eq!(target[1].get("qty"), Some(&CellValue::Number(7.5)));
    }

    #[test]
    fn test_overflow_rows_dropped_and_counted() {
        let source = vec![
            row(&[("name", "one".into())]),
            row(&[("name", "two".into())]),
            row(&[("name", "three".into())]),
        ];
        let bytes = export(&source);

        let mut target = vec![row(&[("name", "only".into())])];
        let summary = import_rows(&bytes, &mut target, &columns()).unwrap();

        assert_eq!(summary.updated_rows, 1);
        assert_eq!(summary.dropped_rows, 2);
        assert_eq!(target.len(), 1);
        assert_eq!(target[0].get("name"), Some(&"one".into()));
    }

    #[test]
    fn test_header_match_is_case_insensitive() {
        // Export writes labels ("Name"); columns whose label only differs
        // by case still map.
        let source = vec![row(&[("name", "x".into())])];
        let bytes = export(&source);

        let import_columns = vec![Column::new("name", "NAME")];
        let mut target = vec![row(&[("name", "y".into())])];
        let summary = import_rows(&bytes, &mut target, &import_columns).unwrap();
        assert_eq!(summary.updated_rows, 1);
        assert_eq!(target[0].get("name"), Some(&"x".into()));
    }

    #[test]
    fn test_no_matching_columns_is_error() {
        let source = vec![row(&[("name", "x".into())])];
        let bytes = export(&source);

        let other = vec![Column::new("zzz", "Zzz")];
        let mut target = vec![row(&[("zzz", "y".into())])];
        assert!(import_rows(&bytes, &mut target, &other).is_err());
    }

    #[test]
    fn test_not_a_workbook_is_error() {
        let mut target = vec![row(&[("name", "y".into())])];
        assert!(import_rows(b"not a zip", &mut target, &columns()).is_err());
    }

    #[test]
    fn test_unchanged_rows_not_counted() {
        let source = vec![row(&[
            ("name", "same".into()),
            ("qty", CellValue::Number(1.0)),
            ("done", CellValue::Bool(false)),
        ])];
        let bytes = export(&source);

        let mut target = source.clone();
        let summary = import_rows(&bytes, &mut target, &columns()).unwrap();
        assert_eq!(summary.updated_rows, 0);
    }

    #[test]
    fn test_read_rows_standalone() {
        let source = vec![
            row(&[("name", "alpha".into()), ("qty", CellValue::Number(2.0))]),
            row(&[("name", "beta".into())]),
        ];
        let bytes = export(&source);

        let (headers, rows) = read_rows(&bytes).unwrap();
        // Export writes labels, so the keys here are the labels
        assert_eq!(headers, vec!["Name", "Qty", "Done"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Name"), Some(&"alpha".into()));
        assert_eq!(rows[0].get("Qty"), Some(&CellValue::Number(2.0)));
        // Null cells are omitted from the row map
        assert!(!rows[1].contains_key("Qty"));
    }

    #[test]
    fn test_sheet_resolved_through_rels() {
        // First worksheet at an unconventional path, reachable only via
        // the workbook relationships.
        use std::io::Write;
        use zip::write::FileOptions;

        let buf: Vec<u8> = Vec::new();
        let mut w = zip::ZipWriter::new(Cursor::new(buf));
        let opts = FileOptions::default();
        w.start_file("xl/workbook.xml", opts).unwrap();
        w.write_all(
            br#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
                <sheets><sheet name="Data" sheetId="1" r:id="rId7"/></sheets></workbook>"#,
        )
        .unwrap();
        w.start_file("xl/_rels/workbook.xml.rels", opts).unwrap();
        w.write_all(
            br#"<Relationships>
                <Relationship Id="rId7" Target="worksheets/data.xml"/>
                </Relationships>"#,
        )
        .unwrap();
        // Decoy that sorts first; only the relationship names data.xml
        w.start_file("xl/worksheets/aaa.xml", opts).unwrap();
        w.write_all(br"<worksheet><sheetData/></worksheet>").unwrap();
        w.start_file("xl/worksheets/data.xml", opts).unwrap();
        w.write_all(
            br#"<worksheet><sheetData>
                <row r="1"><c r="A1" t="inlineStr"><is><t>name</t></is></c></row>
                <row r="2"><c r="A2" t="inlineStr"><is><t>via rels</t></is></c></row>
                </sheetData></worksheet>"#,
        )
        .unwrap();
        let bytes = w.finish().unwrap().into_inner();

        let mut target = vec![row(&[("name", "old".into())])];
        let summary = import_rows(&bytes, &mut target, &columns()).unwrap();
        assert_eq!(summary.updated_rows, 1);
        assert_eq!(target[0].get("name"), Some(&"via rels".into()));
    }

    #[test]
    fn test_numeric_reject_skips_field() {
        use std::io::Write;
        use zip::write::FileOptions;

        let buf: Vec<u8> = Vec::new();
        let mut w = zip::ZipWriter::new(Cursor::new(buf));
        let opts = FileOptions::default();
        w.start_file("xl/worksheets/sheet1.xml", opts).unwrap();
        w.write_all(
            br#"<worksheet><sheetData>
                <row r="1"><c r="A1" t="inlineStr"><is><t>Qty</t></is></c></row>
                <row r="2"><c r="A2" t="inlineStr"><is><t>n/a</t></is></c></row>
                </sheetData></worksheet>"#,
        )
        .unwrap();
        let bytes = w.finish().unwrap().into_inner();

        let mut target = vec![row(&[("qty", CellValue::Number(4.0))])];
        let summary = import_rows(&bytes, &mut target, &columns()).unwrap();
        // The unparseable quantity was skipped, not stored as text
        assert_eq!(summary.updated_rows, 0);
        assert_eq!(target[0].get("qty"), Some(&CellValue::Number(4.0)));

        // Under StoreNull the same cell clears the field instead
        let lenient = vec![Column::new("qty", "Qty")
            .kind(ColumnType::Number)
            .invalid_number(crate::types::InvalidNumber::StoreNull)];
        let mut target = vec![row(&[("qty", CellValue::Number(4.0))])];
        let summary = import_rows(&bytes, &mut target, &lenient).unwrap();
        assert_eq!(summary.updated_rows, 1);
        assert_eq!(target[0].get("qty"), Some(&CellValue::Null));
    }

    #[test]
    fn test_checkbox_coerces_numeric_cells() {
        use std::io::Write;
        use zip::write::FileOptions;

        let buf: Vec<u8> = Vec::new();
        let mut w = zip::ZipWriter::new(Cursor::new(buf));
        let opts = FileOptions::default();
        w.start_file("xl/worksheets/sheet1.xml", opts).unwrap();
        w.write_all(
            br#"<worksheet><sheetData>
                <row r="1"><c r="A1" t="inlineStr"><is><t>Done</t></is></c></row>
                <row r="2"><c r="A2"><v>1</v></c></row>
                <row r="3"><c r="A3"><v>0</v></c></row>
                </sheetData></worksheet>"#,
        )
        .unwrap();
        let bytes = w.finish().unwrap().into_inner();

        let mut target = vec![row(&[]), row(&[])];
        let summary = import_rows(&bytes, &mut target, &columns()).unwrap();
        assert_eq!(summary.updated_rows, 2);
        assert_eq!(target[0].get("done"), Some(&CellValue::Bool(true)));
        assert_eq!(target[1].get("done"), Some(&CellValue::Bool(false)));
    }

    #[test]
    fn test_shared_strings_resolved() {
        // Hand-built workbook using the shared string table.
        use std::io::Write;
        use zip::write::FileOptions;

        let buf: Vec<u8> = Vec::new();
        let mut w = zip::ZipWriter::new(Cursor::new(buf));
        let opts = FileOptions::default();
        w.start_file("xl/worksheets/sheet1.xml", opts).unwrap();
        w.write_all(
            br#"<worksheet><sheetData>
                <row r="1"><c r="A1" t="s"><v>0</v></c></row>
                <row r="2"><c r="A2" t="s"><v>1</v></c></row>
                </sheetData></worksheet>"#,
        )
        .unwrap();
        w.start_file("xl/sharedStrings.xml", opts).unwrap();
        w.write_all(br"<sst><si><t>Name</t></si><si><t>from sst</t></si></sst>")
            .unwrap();
        let bytes = w.finish().unwrap().into_inner();

        let mut target = vec![row(&[("name", "old".into())])];
        let summary =
            import_rows(&bytes, &mut target, &[Column::new("name", "Name")]).unwrap();
        assert_eq!(summary.updated_rows, 1);
        assert_eq!(target[0].get("name"), Some(&"from sst".into()));
    }
}
