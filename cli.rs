use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the PDF to text converter
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pdf2txt",
    version,
    about = "Convert PDF files to plain text",
    long_about = "
Converts PDF documents to plain-text files.

MODES:
  Batch Mode: Walk --input and write one .txt per PDF into --output
  Web Mode:   Serve an upload page that returns a zip or saves to a local folder

EXAMPLES:
  Batch mode:
    pdf2txt --input ./papers
    pdf2txt --input ./papers --output ./texts

  Web mode:
    pdf2txt --web
    pdf2txt --web --port 9000
"
)]
pub struct CliArgs {
    /// Directory containing PDF files (searched recursively)
    #[arg(short = 'i', long = "input", value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Directory for the .txt files (defaults to the input directory)
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Start the web server instead of converting a directory
    #[arg(long = "web")]
    pub web: bool,

    /// Web server port (overrides the config file)
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    pub port: Option<u16>,

    /// TOML configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Log level
    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

/// Log level enumeration
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Show error messages only
    Error,
    /// Show warnings and errors
    Warn,
    /// Show info, warnings, and errors (default)
    Info,
    /// Show debug information
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// What the binary should do, derived from the arguments
#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    /// Serve the upload page (`--port` is applied to the config)
    Web,
    /// Convert a directory tree
    Batch { input: PathBuf, output: PathBuf },
}

pub const USAGE: &str = "Usage: pdf2txt --input <PDF_DIR> [--output <TXT_DIR>]\n\
                         \x20  or: pdf2txt --web [--port 8082]";

impl CliArgs {
    /// Determine the run mode from parsed arguments
    pub fn mode(&self) -> Result<RunMode> {
        if self.web {
            return Ok(RunMode::Web);
        }

        let input = self.input.clone().ok_or_else(|| {
            anyhow::anyhow!("an input directory is required\n{}", USAGE)
        })?;

        if !input.is_dir() {
            return Err(anyhow::anyhow!(
                "input is not a directory: '{}'\n{}",
                input.display(),
                USAGE
            ));
        }

        let output = self.output.clone().unwrap_or_else(|| input.clone());
        Ok(RunMode::Batch { input, output })
    }

    /// Level directive for the log filter
    pub fn log_directive(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            self.log_level.as_str()
        }
    }
}
