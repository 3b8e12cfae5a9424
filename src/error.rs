//! Error types for report generation.
//!
//! Zero totals and other degenerate arithmetic never show up here: the
//! calculators guard them locally. What remains are precondition violations,
//! formatting faults and failures to save a finished file.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    /// A caller-supplied value is outside the documented range
    #[error("Invalid value for '{field}': {message}")]
    InvalidArgument { field: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// printpdf failed to build or serialize a document
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to load or parse a report configuration file
    #[error("Failed to load configuration from {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// The download sink could not save the artifact
    #[error("Failed to save '{filename}': {source}")]
    Download {
        filename: String,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    pub fn invalid_argument(field: &str, message: impl Into<String>) -> Self {
        ReportError::InvalidArgument {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<csv::IntoInnerError<csv::Writer<Vec<u8>>>> for ReportError {
    fn from(err: csv::IntoInnerError<csv::Writer<Vec<u8>>>) -> Self {
        ReportError::Io(err.into_error())
    }
}

pub type Result<T, E = ReportError> = std::result::Result<T, E>;
