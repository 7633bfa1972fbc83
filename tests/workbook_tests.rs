//! XLSX export/import driven through the public `GridView` API: the
//! exported workbook reflects the processed (filtered/sorted) view, and
//! importing maps header labels back onto grid columns.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::collections::HashSet;

use gridview::grid::GridView;
use gridview::types::{
    CellValue, Column, ColumnType, GridOptions, Row, WorkbookConfig,
};
use gridview::workbook::read_rows;

fn row(pairs: &[(&str, CellValue)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn inventory_columns() -> Vec<Column> {
    vec![
        Column::new("sku", "SKU"),
        Column::new("qty", "Quantity").kind(ColumnType::Number),
        Column::new("discontinued", "Discontinued").kind(ColumnType::Checkbox),
    ]
}

fn inventory_grid() -> GridView {
    let mut g = GridView::new(inventory_columns(), GridOptions::default());
    g.set_rows(vec![
        row(&[
            ("sku", "A-100".into()),
            ("qty", CellValue::Number(12.0)),
            ("discontinued", CellValue::Bool(false)),
        ]),
        row(&[
            ("sku", "B-200".into()),
            ("qty", CellValue::Number(3.0)),
            ("discontinued", CellValue::Bool(true)),
        ]),
        row(&[
            ("sku", "C-300".into()),
            ("qty", CellValue::Number(40.0)),
            ("discontinued", CellValue::Bool(false)),
        ]),
    ]);
    g
}

#[test]
fn test_export_reflects_processed_view() {
    let mut g = inventory_grid();
    let active: HashSet<String> = ["false".to_string()].into_iter().collect();
    g.set_filter("discontinued", active);
    g.toggle_sort("qty");
    g.toggle_sort("qty"); // descending

    let (_, bytes) = g.export_to_excel().unwrap();
    let (headers, exported) = read_rows(&bytes).unwrap();

    assert_eq!(headers, vec!["SKU", "Quantity", "Discontinued"]);
    // Only the two non-discontinued rows, in descending qty order
    assert_eq!(exported.len(), 2);
    assert_eq!(exported[0].get("SKU"), Some(&"C-300".into()));
    assert_eq!(exported[1].get("SKU"), Some(&"A-100".into()));
    assert_eq!(exported[0].get("Quantity"), Some(&CellValue::Number(40.0)));
}

#[test]
fn test_round_trip_between_grids() {
    let mut source = inventory_grid();
    let (_, bytes) = source.export_to_excel().unwrap();

    // A fresh grid with stale quantities picks up the exported values
    let mut target = GridView::new(inventory_columns(), GridOptions::default());
    target.set_rows(vec![
        row(&[("sku", "A-100".into()), ("qty", CellValue::Number(0.0))]),
        row(&[("sku", "B-200".into()), ("qty", CellValue::Number(0.0))]),
        row(&[("sku", "C-300".into()), ("qty", CellValue::Number(0.0))]),
    ]);
    let summary = target.import_from_excel(&bytes).unwrap();

    assert_eq!(summary.updated_rows, 3);
    assert_eq!(summary.dropped_rows, 0);
    assert_eq!(
        summary.mapped_columns,
        vec!["discontinued".to_string(), "qty".into(), "sku".into()]
    );
    assert_eq!(target.get_data()[1].get("qty"), Some(&CellValue::Number(3.0)));
    assert_eq!(
        target.get_data()[1].get("discontinued"),
        Some(&CellValue::Bool(true))
    );
}

#[test]
fn test_import_overflow_reported() {
    let mut source = inventory_grid();
    let (_, bytes) = source.export_to_excel().unwrap();

    let mut target = GridView::new(inventory_columns(), GridOptions::default());
    target.set_rows(vec![row(&[("sku", "A-100".into())])]);
    let summary = target.import_from_excel(&bytes).unwrap();

    assert_eq!(summary.updated_rows, 1);
    assert_eq!(summary.dropped_rows, 2);
    assert_eq!(target.get_data().len(), 1);
}

#[test]
fn test_import_fires_data_change_once() {
    use std::cell::Cell;
    use std::rc::Rc;

    let mut source = inventory_grid();
    let (_, bytes) = source.export_to_excel().unwrap();

    let mut target = inventory_grid();
    let fired: Rc<Cell<usize>> = Rc::new(Cell::new(0));
    let f = Rc::clone(&fired);
    let mut callbacks = gridview::GridCallbacks::default();
    callbacks.on_data_change = Some(Box::new(move |_| f.set(f.get() + 1)));
    target.set_callbacks(callbacks);

    // Identical data: nothing applied, no notification
    let summary = target.import_from_excel(&bytes).unwrap();
    assert_eq!(summary.updated_rows, 0);
    assert_eq!(fired.get(), 0);

    // Change one source cell and re-import: one notification
    target.update_cell(0, "qty", CellValue::Number(99.0));
    fired.set(0);
    let summary = target.import_from_excel(&bytes).unwrap();
    assert_eq!(summary.updated_rows, 1);
    assert_eq!(fired.get(), 1);
}

#[test]
fn test_foreign_workbook_maps_by_label() {
    // A workbook whose headers use the display labels (as a spreadsheet
    // user would see them), not the internal keys.
    use std::io::Write;
    use zip::write::FileOptions;

    let buf: Vec<u8> = Vec::new();
    let mut w = zip::ZipWriter::new(std::io::Cursor::new(buf));
    let opts = FileOptions::default();
    w.start_file("xl/worksheets/sheet1.xml", opts).unwrap();
    w.write_all(
        br#"<worksheet><sheetData>
        <row r="1"><c r="A1" t="inlineStr"><is><t>quantity</t></is></c></row>
        <row r="2"><c r="A2"><v>55</v></c></row>
        </sheetData></worksheet>"#,
    )
    .unwrap();
    let bytes = w.finish().unwrap().into_inner();

    let mut g = inventory_grid();
    let summary = g.import_from_excel(&bytes).unwrap();
    assert_eq!(summary.mapped_columns, vec!["qty".to_string()]);
    assert_eq!(g.get_data()[0].get("qty"), Some(&CellValue::Number(55.0)));
}

#[test]
fn test_custom_export_builder_replaces_writer() {
    use std::sync::Arc;

    // A CSV-emitting builder: the grid hands it the processed view and
    // returns its bytes untouched.
    let options = GridOptions {
        workbook: WorkbookConfig {
            export_builder: Some(Arc::new(|rows: &[&Row], columns: &[Column]| {
                let mut out = String::new();
                for row in rows {
                    let line: Vec<String> = columns
                        .iter()
                        .map(|c| row.get(&c.key).cloned().unwrap_or_default().display())
                        .collect();
                    out.push_str(&line.join(","));
                    out.push('\n');
                }
                Ok(out.into_bytes())
            })),
            ..WorkbookConfig::default()
        },
        ..GridOptions::default()
    };
    let mut g = GridView::new(inventory_columns(), options);
    g.set_rows(vec![
        row(&[
            ("sku", "A-100".into()),
            ("qty", CellValue::Number(12.0)),
            ("discontinued", CellValue::Bool(false)),
        ]),
        row(&[
            ("sku", "B-200".into()),
            ("qty", CellValue::Number(3.0)),
            ("discontinued", CellValue::Bool(true)),
        ]),
    ]);
    let active: HashSet<String> = ["false".to_string()].into_iter().collect();
    g.set_filter("discontinued", active);

    let (_, bytes) = g.export_to_excel().unwrap();
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        "A-100,12,false\n"
    );
}

#[test]
fn test_custom_import_parser_replaces_reader() {
    use std::sync::Arc;

    // A line-per-row parser; merged rows follow the built-in contract:
    // positional overwrite, overflow dropped, foreign keys ignored.
    let options = GridOptions {
        workbook: WorkbookConfig {
            import_parser: Some(Arc::new(|bytes: &[u8], _columns: &[Column]| -> gridview::Result<Vec<Row>> {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| gridview::GridError::Import(e.to_string()))?;
                Ok(text
                    .lines()
                    .map(|line| {
                        let mut r = Row::new();
                        r.insert("qty".into(), CellValue::detect(line));
                        r.insert("bogus".into(), "ignored".into());
                        r
                    })
                    .collect())
            })),
            ..WorkbookConfig::default()
        },
        ..GridOptions::default()
    };
    let mut g = GridView::new(inventory_columns(), options);
    g.set_rows(vec![
        row(&[("sku", "A-100".into()), ("qty", CellValue::Number(0.0))]),
        row(&[("sku", "B-200".into()), ("qty", CellValue::Number(0.0))]),
        row(&[("sku", "C-300".into()), ("qty", CellValue::Number(9.0))]),
    ]);

    let summary = g.import_from_excel(b"7\n8\n9\n10").unwrap();
    assert_eq!(summary.updated_rows, 2); // row 3 already holds 9
    assert_eq!(summary.dropped_rows, 1);
    assert_eq!(summary.mapped_columns, vec!["qty".to_string()]);
    assert_eq!(g.get_data()[0].get("qty"), Some(&CellValue::Number(7.0)));
    assert_eq!(g.get_data()[2].get("qty"), Some(&CellValue::Number(9.0)));
    // Keys without a backing column never land in the data
    assert_eq!(g.get_data()[0].get("bogus"), None);
}

#[test]
fn test_garbage_bytes_rejected() {
    let mut g = inventory_grid();
    assert!(g.import_from_excel(b"definitely not a workbook").is_err());
    // The busy guard was released by the failure
    assert!(g.export_to_excel().is_ok());
}

#[test]
fn test_configured_names_flow_through() {
    let options = GridOptions {
        workbook: WorkbookConfig {
            sheet_name: Some("Inventory".into()),
            file_name: Some("inventory.xlsx".into()),
            ..WorkbookConfig::default()
        },
        ..GridOptions::default()
    };
    let mut g = GridView::new(inventory_columns(), options);
    g.set_rows(vec![row(&[("sku", "A-100".into())])]);

    let (name, bytes) = g.export_to_excel().unwrap();
    assert_eq!(name, "inventory.xlsx");
    // Round-trips through the reader regardless of the sheet name
    let (_, rows) = read_rows(&bytes).unwrap();
    assert_eq!(rows.len(), 1);
}
