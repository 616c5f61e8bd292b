//! Error types for document generation.

use thiserror::Error;

/// Errors that can occur while turning a report into a document.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error while writing a document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Archive writing error
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// No generator is registered under this id
    #[error("Unknown format '{0}'")]
    UnknownFormat(String),
}
