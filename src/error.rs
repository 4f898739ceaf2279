use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by a single recognition attempt. Each one fails only the
/// file it belongs to; batch callers record it on the item and move on.
#[derive(Debug, Error)]
pub enum OcrError {
    /// Missing or incomplete credentials, or the token exchange failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("could not read file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Extension outside the known set (carries the offending extension).
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// The service classified the document as a type we refuse to export.
    #[error("unsupported invoice type: {0}")]
    UnsupportedInvoice(String),

    /// The service answered with neither known response shape.
    #[error("recognition failed: {0}")]
    Recognition(String),
}

/// Failures of the HTTP layer, before any response shape is inspected.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("invalid stored settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not create data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not build workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("could not read workbook: {0}")]
    Read(String),

    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, OcrError>;
