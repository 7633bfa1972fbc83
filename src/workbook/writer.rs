//! Builds a complete XLSX workbook from the grid's processed rows.
//!
//! All strings are written inline (`t="inlineStr"`), so no shared string
//! table is needed; numbers and booleans keep their native cell types.

use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::ZipWriter;

use crate::error::Result;
use crate::types::{CellValue, Column, Row, WorkbookConfig};

use super::{col_to_letter, sheet_name, xml_escape, PX_PER_CHAR};

/// Serialize `rows` (the processed view, in view order) to XLSX bytes.
pub fn export_rows(
    rows: &[&Row],
    columns: &[Column],
    widths: &[f32],
    config: &WorkbookConfig,
) -> Result<Vec<u8>> {
    let buf: Vec<u8> = Vec::with_capacity(4096);
    let mut writer = ZipWriter::new(Cursor::new(buf));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    writer.start_file("[Content_Types].xml", options)?;
    writer.write_all(CONTENT_TYPES.as_bytes())?;

    writer.start_file("_rels/.rels", options)?;
    writer.write_all(ROOT_RELS.as_bytes())?;

    writer.start_file("xl/workbook.xml", options)?;
    writer.write_all(workbook_xml(sheet_name(config)).as_bytes())?;

    writer.start_file("xl/_rels/workbook.xml.rels", options)?;
    writer.write_all(WORKBOOK_RELS.as_bytes())?;

    writer.start_file("xl/styles.xml", options)?;
    writer.write_all(STYLES.as_bytes())?;

    writer.start_file("xl/worksheets/sheet1.xml", options)?;
    writer.write_all(sheet_xml(rows, columns, widths).as_bytes())?;

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

/// Write the worksheet: a header row of column labels, then one row per
/// grid row in processed order.
#[allow(clippy::cast_possible_truncation)]
fn sheet_xml(rows: &[&Row], columns: &[Column], widths: &[f32]) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );
    out.push('\n');

    if !columns.is_empty() {
        let end_col = col_to_letter(columns.len() as u32 - 1);
        out.push_str(&format!(
            "<dimension ref=\"A1:{}{}\"/>\n",
            end_col,
            rows.len() + 1
        ));

        out.push_str("<cols>\n");
        for (i, column) in columns.iter().enumerate() {
            let px = widths.get(i).copied().unwrap_or(column.width);
            out.push_str(&format!(
                "<col min=\"{}\" max=\"{}\" width=\"{:.4}\" customWidth=\"1\"/>\n",
                i + 1,
                i + 1,
                f64::from(px) / PX_PER_CHAR
            ));
        }
        out.push_str("</cols>\n");
    }

    out.push_str("<sheetData>\n");

    // Header row
    out.push_str("<row r=\"1\">");
    for (c, column) in columns.iter().enumerate() {
        write_inline_string(&mut out, 0, c as u32, &column.label);
    }
    out.push_str("</row>\n");

    for (r, row) in rows.iter().enumerate() {
        out.push_str(&format!("<row r=\"{}\">", r + 2));
        for (c, column) in columns.iter().enumerate() {
            let value = row.get(&column.key).unwrap_or(&CellValue::Null);
            write_cell(&mut out, r as u32 + 1, c as u32, value);
        }
        out.push_str("</row>\n");
    }

    out.push_str("</sheetData>\n</worksheet>");
    out
}

/// Write a single `<c>` element. Null cells are omitted entirely.
fn write_cell(out: &mut String, row: u32, col: u32, value: &CellValue) {
    match value {
        CellValue::Null => {}
        CellValue::Number(n) => {
            out.push_str(&format!(
                "<c r=\"{}{}\"><v>{}</v></c>",
                col_to_letter(col),
                row + 1,
                n
            ));
        }
        CellValue::Bool(b) => {
            out.push_str(&format!(
                "<c r=\"{}{}\" t=\"b\"><v>{}</v></c>",
                col_to_letter(col),
                row + 1,
                u8::from(*b)
            ));
        }
        CellValue::Text(s) => write_inline_string(out, row, col, s),
    }
}

fn write_inline_string(out: &mut String, row: u32, col: u32, text: &str) {
    out.push_str(&format!(
        "<c r=\"{}{}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
        col_to_letter(col),
        row + 1,
        xml_escape(text)
    ));
}

fn workbook_xml(sheet: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#
        ),
        xml_escape(sheet)
    )
}

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
    r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    r#"</Types>"#
);

const ROOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#
);

const WORKBOOK_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    r#"</Relationships>"#
);

const STYLES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>"#,
    r#"<fills count="1"><fill><patternFill patternType="none"/></fill></fills>"#,
    r#"<borders count="1"><border/></borders>"#,
    r#"<cellStyleXfs count="1"><xf/></cellStyleXfs>"#,
    r#"<cellXfs count="1"><xf/></cellXfs>"#,
    r#"</styleSheet>"#
);

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
    use crate::types::ColumnType;

    fn row(pairs: &[(&str, CellValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn fixture() -> (Vec<Row>, Vec<Column>) {
        let rows = vec![
            row(&[
                ("name", "a & b".into()),
                ("qty", CellValue::Number(3.5)),
                ("done", CellValue::Bool(true)),
            ]),
            row(&[("name", "second".into()), ("qty", CellValue::Null)]),
        ];
        let columns = vec![
            Column::new("name", "Name"),
            Column::new("qty", "Qty").kind(ColumnType::Number),
            Column::new("done", "Done").kind(ColumnType::Checkbox),
        ];
        (rows, columns)
    }

    #[test]
    fn test_sheet_xml_shape() {
        let (rows, columns) = fixture();
        let refs: Vec<&Row> = rows.iter().collect();
        let xml = sheet_xml(&refs, &columns, &[150.0, 80.0, 60.0]);

        // Header row with labels
        assert!(xml.contains("<is><t>Name</t></is>"));
        // Escaped inline text
        assert!(xml.contains("<is><t>a &amp; b</t></is>"));
        // Typed number and bool cells
        assert!(xml.contains("<c r=\"B2\"><v>3.5</v></c>"));
        assert!(xml.contains("<c r=\"C2\" t=\"b\"><v>1</v></c>"));
        // Null cell omitted: no C3 for the second data row
        assert!(!xml.contains("r=\"B3\""));
        assert!(xml.contains("<dimension ref=\"A1:C3\"/>"));
    }

    #[test]
    fn test_export_produces_zip() {
        let (rows, columns) = fixture();
        let refs: Vec<&Row> = rows.iter().collect();
        let bytes =
            export_rows(&refs, &columns, &[150.0, 80.0, 60.0], &WorkbookConfig::default())
                .unwrap();
        // ZIP local file header magic
        assert_eq!(&bytes[..4], b"PK\x03\x04");

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.contains(&"xl/workbook.xml".to_string()));
        assert!(names.contains(&"xl/worksheets/sheet1.xml".to_string()));
        assert!(names.contains(&"[Content_Types].xml".to_string()));
    }

    #[test]
    fn test_custom_sheet_name_escaped() {
        let config = WorkbookConfig {
            sheet_name: Some("P&L".into()),
            ..WorkbookConfig::default()
        };
        let xml = workbook_xml(super::super::sheet_name(&config));
        assert!(xml.contains(r#"name="P&amp;L""#));
    }

    #[test]
    fn test_empty_grid_exports() {
        let bytes = export_rows(&[], &[], &[], &WorkbookConfig::default()).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
