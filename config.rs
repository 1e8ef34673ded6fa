use crate::error::{Pdf2TxtError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Name of the folder created under the desktop when no save location is given
pub const DEFAULT_SAVE_FOLDER: &str = "PDF Conversions";

/// Configuration for the PDF to text converter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Web server settings
    #[serde(default)]
    pub web: WebConfig,

    /// Extraction backend settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Local output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Interface to bind
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Maximum accepted request body (in bytes)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

/// Extraction backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Command used for the fallback backend
    #[serde(default = "default_pdftotext_path")]
    pub pdftotext_path: String,

    /// Pass `-layout` to pdftotext
    #[serde(default = "default_true")]
    pub layout: bool,

    /// Try pdftotext when the embedded library fails
    #[serde(default = "default_true")]
    pub enable_fallback: bool,
}

/// Local save configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Save root used when the upload form leaves the folder empty
    #[serde(default)]
    pub default_save_dir: Option<PathBuf>,

    /// Open the output folder in the OS file browser after saving
    #[serde(default = "default_true")]
    pub open_folder: bool,
}

fn default_port() -> u16 { 8082 }
fn default_bind_address() -> String { "0.0.0.0".to_string() }
fn default_max_upload_bytes() -> usize { 100 * 1024 * 1024 } // 100MB
fn default_pdftotext_path() -> String { "pdftotext".to_string() }
fn default_true() -> bool { true }

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            pdftotext_path: default_pdftotext_path(),
            layout: default_true(),
            enable_fallback: default_true(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_save_dir: None,
            open_folder: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            Pdf2TxtError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let config = Self::from_toml(&content)
            .map_err(|e| Pdf2TxtError::Config(format!("{}: {}", path.display(), e)))?;

        info!("Configuration loaded from: {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Pdf2TxtError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.web.port == 0 {
            return Err(Pdf2TxtError::Config("web.port cannot be zero".to_string()));
        }

        if self.web.max_upload_bytes == 0 {
            return Err(Pdf2TxtError::Config(
                "web.max_upload_bytes cannot be zero".to_string(),
            ));
        }

        if self.extraction.pdftotext_path.trim().is_empty() {
            return Err(Pdf2TxtError::Config(
                "extraction.pdftotext_path cannot be empty".to_string(),
            ));
        }

        if !self.extraction.enable_fallback {
            warn!("pdftotext fallback disabled, only the embedded extractor will be used");
        }

        Ok(())
    }

    /// Save root for uploads that do not name a folder.
    ///
    /// Falls back from the configured directory to `~/Desktop`, then the home
    /// directory, then the working directory.
    pub fn default_save_dir(&self) -> PathBuf {
        if let Some(dir) = &self.output.default_save_dir {
            return dir.clone();
        }

        dirs::desktop_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_SAVE_FOLDER)
    }
}
