//! Structured error types for gridview.
//!
//! The interactive surface never raises: render-path failures fall back to
//! safe defaults. Errors here surface only from workbook I/O and layout
//! persistence, for the host application to display.

/// All errors that can occur in gridview workbook I/O and persistence.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Workbook import failure (missing sheet, unreadable data).
    #[error("Import failed: {0}")]
    Import(String),

    /// Workbook export failure.
    #[error("Export failed: {0}")]
    Export(String),

    /// Layout persistence failure.
    #[error("Layout storage: {0}")]
    Storage(String),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl From<String> for GridError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
