//! XLSX import/export for the grid's processed rows.
//!
//! The writer builds a complete workbook from scratch (the grid owns no
//! source archive to patch); the reader maps a worksheet's header row
//! back onto grid columns and applies values by relative row position.

mod reader;
mod writer;

pub use reader::{import_rows, read_rows};
pub(crate) use reader::merge_imported;
pub use writer::export_rows;

use crate::types::WorkbookConfig;

/// What an import actually did, reported back to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ImportSummary {
    /// Rows whose mapped fields were overwritten.
    pub updated_rows: usize,
    /// Worksheet rows beyond the grid's row count, dropped.
    pub dropped_rows: usize,
    /// Column keys the header row mapped onto.
    pub mapped_columns: Vec<String>,
}

/// Excel renders ~7px per character digit; width units are characters.
pub(crate) const PX_PER_CHAR: f64 = 7.0 / 0.75;

pub(crate) fn sheet_name(config: &WorkbookConfig) -> &str {
    config.sheet_name.as_deref().unwrap_or("Sheet1")
}

/// The download file name: configured, or date-stamped.
pub fn export_file_name(config: &WorkbookConfig) -> String {
    if let Some(ref name) = config.file_name {
        return name.clone();
    }
    let (y, m, d) = today();
    format!("grid-export-{y:04}-{m:02}-{d:02}.xlsx")
}

#[cfg(target_arch = "wasm32")]
fn today() -> (u32, u32, u32) {
    let now = js_sys::Date::new_0();
    (
        now.get_full_year(),
        now.get_month() + 1,
        now.get_date(),
    )
}

#[cfg(not(target_arch = "wasm32"))]
#[allow(clippy::cast_possible_wrap)]
fn today() -> (u32, u32, u32) {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    civil_from_days((secs / 86_400) as i64)
}

/// Days-since-epoch to (year, month, day), Howard Hinnant's algorithm.
#[cfg(not(target_arch = "wasm32"))]
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn civil_from_days(z: i64) -> (u32, u32, u32) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let y = if m <= 2 { y + 1 } else { y };
    (y as u32, m, d)
}

/// Convert a zero-based column index to its letter form (0 -> A, 26 -> AA).
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn col_to_letter(mut col: u32) -> String {
    let mut out = String::new();
    loop {
        let rem = col % 26;
        out.insert(0, (b'A' + rem as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    out
}

/// Parse a cell reference like "B7" into (zero-based col, zero-based row).
pub(crate) fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut seen_letter = false;
    let mut seen_digit = false;
    for c in cell_ref.chars() {
        if c.is_ascii_uppercase() && !seen_digit {
            seen_letter = true;
            col = col.saturating_mul(26).saturating_add(c as u32 - 'A' as u32 + 1);
        } else if c.is_ascii_digit() {
            seen_digit = true;
            row = row.saturating_mul(10).saturating_add(c as u32 - '0' as u32);
        } else {
            return None;
        }
    }
    if !seen_letter || !seen_digit || row == 0 {
        return None;
    }
    Some((col - 1, row - 1))
}

/// Minimal XML escaping for attribute/text content.
pub(crate) fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
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
    fn test_col_to_letter() {
        assert_eq!(col_to_letter(0), "A");
        assert_eq!(col_to_letter(25), "Z");
        assert_eq!(col_to_letter(26), "AA");
        assert_eq!(col_to_letter(27), "AB");
        assert_eq!(col_to_letter(701), "ZZ");
        assert_eq!(col_to_letter(702), "AAA");
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), Some((0, 0)));
        assert_eq!(parse_cell_ref("B7"), Some((1, 6)));
        assert_eq!(parse_cell_ref("AA10"), Some((26, 9)));
        assert_eq!(parse_cell_ref(""), None);
        assert_eq!(parse_cell_ref("7"), None);
        assert_eq!(parse_cell_ref("A0"), None);
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&apos;");
        assert_eq!(xml_escape("plain"), "plain");
    }

    #[test]
    fn test_export_file_name_configured() {
        let config = WorkbookConfig {
            file_name: Some("report.xlsx".into()),
            ..WorkbookConfig::default()
        };
        assert_eq!(export_file_name(&config), "report.xlsx");
    }

    #[test]
    fn test_export_file_name_date_stamped() {
        let name = export_file_name(&WorkbookConfig::default());
        assert!(name.starts_with("grid-export-"));
        assert!(name.ends_with(".xlsx"));
        // grid-export-YYYY-MM-DD.xlsx
        assert_eq!(name.len(), "grid-export-0000-00-00.xlsx".len());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_civil_from_days() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(19_723), (2024, 1, 1));
        // Leap day
        assert_eq!(civil_from_days(19_782), (2024, 2, 29));
    }
}
