use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the PDF to text converter
#[derive(Error, Debug)]
pub enum Pdf2TxtError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{backend} extraction failed: {reason}")]
    Extraction { backend: String, reason: String },

    #[error("{backend} is not available: {reason}")]
    BackendUnavailable { backend: String, reason: String },

    #[error("all extraction backends failed (primary: {primary}; fallback: {fallback})")]
    AllBackendsFailed { primary: String, fallback: String },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to open folder '{path}': {reason}")]
    OpenFolder { path: PathBuf, reason: String },
}

impl Pdf2TxtError {
    pub(crate) fn extraction(backend: &str, reason: impl ToString) -> Self {
        Self::Extraction {
            backend: backend.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience Result type with Pdf2TxtError
pub type Result<T> = std::result::Result<T, Pdf2TxtError>;
