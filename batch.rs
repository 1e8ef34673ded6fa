use crate::error::{Pdf2TxtError, Result};
use crate::extract::{extract_file, TextExtractor};
use crate::naming::{is_pdf_name, txt_file_name};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use walkdir::WalkDir;

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Source PDFs that produced a text file
    pub converted: Vec<PathBuf>,
    /// Source PDFs that failed, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.converted.len() + self.failed.len()
    }
}

/// Converts every PDF under a directory tree into a flat output directory
pub struct BatchConverter {
    extractor: Arc<dyn TextExtractor>,
}

impl BatchConverter {
    pub fn new(extractor: Arc<dyn TextExtractor>) -> Self {
        Self { extractor }
    }

    /// Walk `input` and write `<stem>.txt` into `output` for each PDF.
    ///
    /// Per-file failures are collected in the report; traversal errors abort.
    pub fn run(&self, input: &Path, output: &Path) -> Result<BatchReport> {
        fs::create_dir_all(output).map_err(|e| Pdf2TxtError::InvalidPath {
            path: output.to_path_buf(),
            reason: format!("cannot create output directory: {}", e),
        })?;

        info!("Converting PDFs under {} into {}", input.display(), output.display());

        let mut report = BatchReport::default();

        for entry in WalkDir::new(input) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if !is_pdf_name(&name) {
                continue;
            }

            let path = entry.path();
            match self.convert_one(path, output) {
                Ok(txt_path) => {
                    println!("Converted: {}", path.display());
                    info!("Converted {} -> {}", path.display(), txt_path.display());
                    report.converted.push(path.to_path_buf());
                }
                Err(e) => {
                    println!("Failed {}: {}", path.display(), e);
                    error!("Failed to convert {}: {}", path.display(), e);
                    report.failed.push((path.to_path_buf(), e.to_string()));
                }
            }
        }

        info!(
            "Batch finished: {} converted, {} failed",
            report.converted.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Convert a single PDF into `output_dir`, returning the text file path
    pub fn convert_one(&self, pdf_path: &Path, output_dir: &Path) -> Result<PathBuf> {
        let text = extract_file(self.extractor.as_ref(), pdf_path)?;

        let file_name = pdf_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Pdf2TxtError::InvalidPath {
                path: pdf_path.to_path_buf(),
                reason: "no file name".to_string(),
            })?;

        let txt_path = output_dir.join(txt_file_name(&file_name));
        fs::write(&txt_path, text)?;
        Ok(txt_path)
    }
}
