//! Error types for loading and exporting journal ratings

use thiserror::Error;

/// The journal list could not be loaded. Every variant means the dataset is
/// unavailable; there is no fallback list.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Unsupported file extension: {0}")]
    UnsupportedFormat(String),

    #[error("No sheets found in workbook")]
    NoSheets,

    #[error("Sheet is empty")]
    EmptySheet,

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),
}

/// A download could not be produced.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
