//! CompartmentError: Unified error type for compartment-sets public APIs
//!
//! Every fallible operation in this crate reports through this one type. The
//! variants map onto a small set of kinds (see [`ErrorKind`]) so callers can
//! branch on "malformed input" vs. "missing name" vs. "bad index" without
//! matching message text.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`CompartmentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or semantically invalid input document.
    Format,
    /// A named set or a file path does not exist.
    NotFound,
    /// Indexed access beyond the stored sequence.
    OutOfRange,
    /// The file exists but could not be read.
    Io,
}

/// Unified error type for compartment-sets operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompartmentError {
    /// The document has the wrong shape, types or values.
    #[error("Format error: {0}")]
    Format(String),
    /// The text could not be parsed as JSON at all.
    #[error("JSON parse error: {0}")]
    Json(String),
    /// Requested name or path is absent.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Index past the end of a compartment set.
    #[error("Index {index} out of range for compartment set of size {len}")]
    OutOfRange { index: usize, len: usize },
    /// Reading an existing file failed.
    #[error("Failed to read `{}`: {message}", path.display())]
    Io { path: PathBuf, message: String },
}

impl CompartmentError {
    /// Kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompartmentError::Format(_) | CompartmentError::Json(_) => ErrorKind::Format,
            CompartmentError::NotFound(_) => ErrorKind::NotFound,
            CompartmentError::OutOfRange { .. } => ErrorKind::OutOfRange,
            CompartmentError::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        CompartmentError::Format(msg.into())
    }
}

impl From<serde_json::Error> for CompartmentError {
    fn from(err: serde_json::Error) -> Self {
        CompartmentError::Json(err.to_string())
    }
}

/// Shorthand result type used across the crate.
pub type CompartmentResult<T> = Result<T, CompartmentError>;
