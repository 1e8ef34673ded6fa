//! Text extraction backends and the fallback dispatcher.
//!
//! Two interchangeable backends sit behind [`TextExtractor`]:
//! - [`PdfExtractBackend`]: the embedded `pdf-extract` library
//! - [`PdftotextBackend`]: poppler's `pdftotext` command
//!
//! [`FallbackExtractor`] tries the first and, on any failure, the second.

use crate::config::ExtractionConfig;
use crate::error::{Pdf2TxtError, Result};
use std::any::Any;
use std::io::Write;
use std::panic;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info, warn};

/// PDF signature (`%PDF`)
const PDF_MAGIC: &[u8] = b"%PDF";

/// How far into the file the signature may appear
const MAGIC_SEARCH_WINDOW: usize = 1024;

/// A backend that turns PDF bytes into plain text
pub trait TextExtractor: Send + Sync {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    /// Extract all text from an in-memory PDF
    fn extract(&self, pdf: &[u8]) -> Result<String>;
}

/// Check for the `%PDF` signature near the start of the buffer
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(MAGIC_SEARCH_WINDOW)];
    window
        .windows(PDF_MAGIC.len())
        .any(|candidate| candidate == PDF_MAGIC)
}

/// Embedded library backend
#[derive(Debug, Default, Clone)]
pub struct PdfExtractBackend;

impl PdfExtractBackend {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfExtractBackend {
    fn name(&self) -> &str {
        "pdf-extract"
    }

    fn extract(&self, pdf: &[u8]) -> Result<String> {
        if !looks_like_pdf(pdf) {
            return Err(Pdf2TxtError::extraction(self.name(), "missing %PDF header"));
        }

        // pdf-extract panics on some malformed documents
        let text = catch_library_panic(self.name(), || pdf_extract::extract_text_from_mem(pdf))?;
        let text = ensure_trailing_newline(text);

        debug!("pdf-extract produced {} characters", text.len());
        Ok(text)
    }
}

fn catch_library_panic<T, E, F>(backend: &str, call: F) -> Result<T>
where
    E: ToString,
    F: FnOnce() -> std::result::Result<T, E>,
{
    match panic::catch_unwind(panic::AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(Pdf2TxtError::extraction(backend, e)),
        Err(payload) => Err(Pdf2TxtError::extraction(backend, panic_message(&*payload))),
    }
}

fn ensure_trailing_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("library panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("library panicked: {}", msg)
    } else {
        "library panicked".to_string()
    }
}

/// External `pdftotext` command backend
#[derive(Debug, Clone)]
pub struct PdftotextBackend {
    program: String,
    layout: bool,
}

impl PdftotextBackend {
    pub fn new(program: impl Into<String>, layout: bool) -> Self {
        Self {
            program: program.into(),
            layout,
        }
    }
}

impl Default for PdftotextBackend {
    fn default() -> Self {
        Self::new("pdftotext", true)
    }
}

impl TextExtractor for PdftotextBackend {
    fn name(&self) -> &str {
        "pdftotext"
    }

    fn extract(&self, pdf: &[u8]) -> Result<String> {
        let program = which::which(&self.program).map_err(|e| {
            Pdf2TxtError::BackendUnavailable {
                backend: self.name().to_string(),
                reason: format!("{} ({}); install poppler-utils", self.program, e),
            }
        })?;

        // Removed when `input` drops
        let mut input = tempfile::Builder::new()
            .prefix("pdf2txt-")
            .suffix(".pdf")
            .tempfile()?;
        input.write_all(pdf)?;
        input.flush()?;

        let mut command = Command::new(&program);
        if self.layout {
            command.arg("-layout");
        }
        command.arg(input.path()).arg("-");

        debug!("Running {:?}", command);
        let output = command
            .output()
            .map_err(|e| Pdf2TxtError::extraction(self.name(), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Pdf2TxtError::extraction(
                self.name(),
                format!("exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Two-tier dispatcher: primary backend first, fallback on any failure
pub struct FallbackExtractor {
    primary: Box<dyn TextExtractor>,
    fallback: Option<Box<dyn TextExtractor>>,
}

impl FallbackExtractor {
    pub fn new(primary: Box<dyn TextExtractor>, fallback: Option<Box<dyn TextExtractor>>) -> Self {
        Self { primary, fallback }
    }

    /// pdf-extract first, then pdftotext unless disabled
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let fallback: Option<Box<dyn TextExtractor>> = if config.enable_fallback {
            Some(Box::new(PdftotextBackend::new(
                config.pdftotext_path.clone(),
                config.layout,
            )))
        } else {
            None
        };

        Self::new(Box::new(PdfExtractBackend::new()), fallback)
    }
}

impl TextExtractor for FallbackExtractor {
    fn name(&self) -> &str {
        "fallback"
    }

    fn extract(&self, pdf: &[u8]) -> Result<String> {
        let primary_err = match self.primary.extract(pdf) {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            return Err(primary_err);
        };

        warn!(
            "{} failed: {}, trying {}",
            self.primary.name(),
            primary_err,
            fallback.name()
        );

        match fallback.extract(pdf) {
            Ok(text) => {
                info!("Recovered with {}", fallback.name());
                Ok(text)
            }
            Err(fallback_err) => Err(Pdf2TxtError::AllBackendsFailed {
                primary: primary_err.to_string(),
                fallback: fallback_err.to_string(),
            }),
        }
    }
}

/// Read a PDF from disk and extract its text
pub fn extract_file<P: AsRef<Path>>(extractor: &dyn TextExtractor, path: P) -> Result<String> {
    let bytes = std::fs::read(path.as_ref())?;
    extractor.extract(&bytes)
}
