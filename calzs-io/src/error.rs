//! Error types for calzs-io.

use thiserror::Error;

/// Result type for calzs-io operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A conditions table line could not be parsed.
    #[error("conditions table line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A digi file ended in the middle of a record.
    #[error("truncated record at byte offset {offset}")]
    TruncatedRecord { offset: usize },

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] calzs_core::Error),

    /// QIE frame error.
    #[error("frame error: {0}")]
    Qie(#[from] calzs_qie::Error),
}
