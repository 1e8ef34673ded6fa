use anyhow::{Context, Result};
use clap::Parser;
use pdf2txt::{
    batch::BatchConverter,
    cli::{CliArgs, RunMode},
    extract::{FallbackExtractor, TextExtractor},
    web::{self, AppState},
    Config, Pdf2TxtError,
};
use std::sync::Arc;
use tracing::{error, info};

/// Set up logging and tracing
fn setup_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "pdf2txt={},tower_http={}",
                    level, level
                ))
            }),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();
}

fn load_config(args: &CliArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(port) = args.port {
        config.web.port = port;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    setup_logging(args.log_directive());

    let mode = match args.mode() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config = load_config(&args)?;
    let extractor: Arc<dyn TextExtractor> =
        Arc::new(FallbackExtractor::from_config(&config.extraction));

    match mode {
        RunMode::Web => {
            info!("Starting web server");
            let state = AppState::new(extractor, config);
            web::serve(state).await.context("Web server failed")?;
        }
        RunMode::Batch { input, output } => {
            let converter = BatchConverter::new(extractor);
            let report = tokio::task::spawn_blocking(move || converter.run(&input, &output))
                .await
                .context("Batch task panicked")?;

            match report {
                Ok(report) => {
                    println!(
                        "\nBatch conversion complete: {} converted, {} failed",
                        report.converted.len(),
                        report.failed.len()
                    );
                }
                Err(e) => {
                    error!("Batch conversion aborted: {}", e);
                    eprintln!("{}", batch_failure_message(&e));
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn batch_failure_message(err: &Pdf2TxtError) -> String {
    format!("Batch conversion failed: {}", err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_flag_overrides_config() {
        let args = CliArgs::try_parse_from(["pdf2txt", "--web", "--port", "9100"]).unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(config.web.port, 9100);
    }

    #[test]
    fn test_default_config_without_file() {
        let args = CliArgs::try_parse_from(["pdf2txt", "--web"]).unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(config.web.port, 8082);
    }

    #[test]
    fn test_batch_failure_message_names_the_cause() {
        let err = Pdf2TxtError::InvalidPath {
            path: "/readonly/out".into(),
            reason: "cannot create output directory: permission denied".to_string(),
        };
        let message = batch_failure_message(&err);

        assert!(message.starts_with("Batch conversion failed: "));
        assert!(message.contains("cannot create output directory"));
        assert!(!message.contains("walk"));
    }
}
