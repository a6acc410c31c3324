use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ReconError>;

/// Error type covering the different failure cases that can occur while a
/// payroll spreadsheet is loaded, reconciled, or exported.
#[derive(Debug, Error)]
pub enum ReconError {
    /// Raised when a required input is missing or unusable, such as an empty
    /// company name or a spreadsheet without any data rows.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when no header, saved hint, or alias resolves a mandatory column.
    #[error(
        "could not find the {label} column ({field}); save a column hint for it in the company settings"
    )]
    MissingRequiredColumn { field: String, label: String },

    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the format-sniffing workbook reader.
    #[error("workbook read error: {0}")]
    Workbook(#[from] calamine::Error),

    /// Errors bubbled up from the in-memory xlsx reader.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Raised when the ledger store cannot be read.
    #[error("ledger store error: {0}")]
    Store(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Coarse classification of a [`ReconError`] as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing file, company or period, or a spreadsheet with too few rows.
    InvalidInput,
    /// The name column could not be located.
    MissingRequiredColumn,
    /// Anything else: corrupt files, unavailable store, write failures.
    UnexpectedFailure,
}

impl ReconError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReconError::InvalidInput(_) | ReconError::MissingInput(_) => ErrorKind::InvalidInput,
            ReconError::MissingRequiredColumn { .. } => ErrorKind::MissingRequiredColumn,
            _ => ErrorKind::UnexpectedFailure,
        }
    }
}
