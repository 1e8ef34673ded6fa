//! PDF to text converter
//!
//! Converts PDF documents to plain text from a directory walk (batch mode) or
//! from browser uploads (web mode). Text extraction is delegated to
//! `pdf-extract`, with poppler's `pdftotext` as a fallback.

pub mod archive;
pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod naming;
pub mod opener;
pub mod save;
pub mod web;

pub use config::Config;
pub use error::{Pdf2TxtError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        batch::{BatchConverter, BatchReport},
        config::Config,
        error::{Pdf2TxtError, Result},
        extract::{FallbackExtractor, TextExtractor},
        web::{build_router, AppState},
    };

    pub use tracing::{debug, error, info, warn};
}
