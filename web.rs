//! Upload web UI
//!
//! Serves a single embedded page and two multipart endpoints:
//! - `POST /api/upload-convert`: returns a zip of the converted texts
//! - `POST /api/upload-save-local`: writes the texts under a local folder,
//!   mirroring the uploaded directory tree, then opens that folder

use crate::archive::{TextArchive, ARCHIVE_FILE_NAME};
use crate::config::Config;
use crate::error::{Pdf2TxtError, Result};
use crate::extract::TextExtractor;
use crate::naming::{base_name, is_pdf_name, txt_file_name};
use crate::opener::open_folder;
use crate::save::{resolve_output_root, LocalSave, SaveSummary};
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

const INDEX_HTML: &str = include_str!("assets/index.html");

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn TextExtractor>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(extractor: Arc<dyn TextExtractor>, config: Config) -> Self {
        Self {
            extractor,
            config: Arc::new(config),
        }
    }
}

/// Error returned by the upload endpoints as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{}: {}", self.status, self.message);
        } else {
            warn!("{}: {}", self.status, self.message);
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<Pdf2TxtError> for ApiError {
    fn from(err: Pdf2TxtError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::new(
            rejection.status(),
            format!("failed to parse form: {}", rejection.body_text()),
        )
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("conversion task failed: {}", err))
    }
}

/// A file part of the upload form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub data: Bytes,
}

/// Parsed upload form
#[derive(Debug, Default)]
pub struct UploadForm {
    /// `files` parts, in submission order
    pub files: Vec<UploadedFile>,
    /// `paths` parts, one per file, in the same order
    pub paths: Vec<String>,
    /// First `outputDir` part
    pub output_dir: Option<String>,
}

impl UploadForm {
    pub async fn from_multipart(mut multipart: Multipart) -> std::result::Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(form_error)? {
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str() {
                "files" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let data = field.bytes().await.map_err(form_error)?;
                    form.files.push(UploadedFile {
                        name: base_name(&file_name).to_string(),
                        data,
                    });
                }
                "paths" => form.paths.push(field.text().await.map_err(form_error)?),
                "outputDir" => {
                    let dir = field.text().await.map_err(form_error)?;
                    if form.output_dir.is_none() {
                        form.output_dir = Some(dir);
                    }
                }
                other => warn!("Ignoring unexpected form field '{}'", other),
            }
        }

        if form.files.is_empty() {
            return Err(ApiError::bad_request("no files uploaded"));
        }

        Ok(form)
    }
}

fn form_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::new(err.status(), format!("failed to parse form: {}", err.body_text()))
}

/// Converted archive plus per-upload counts
#[derive(Debug)]
pub struct ArchiveOutcome {
    pub bytes: Vec<u8>,
    pub success_count: usize,
    pub failed_count: usize,
}

/// Convert every PDF upload and pack the texts into a zip
pub fn convert_to_archive(
    extractor: &dyn TextExtractor,
    files: &[UploadedFile],
) -> Result<ArchiveOutcome> {
    let mut archive = TextArchive::new();
    let mut failed_count = 0;

    for file in files {
        if !is_pdf_name(&file.name) {
            continue;
        }

        let text = match extractor.extract(&file.data) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to convert {}: {}", file.name, e);
                failed_count += 1;
                continue;
            }
        };

        match archive.add(&txt_file_name(&file.name), &text) {
            Ok(_) => info!("Converted: {}", file.name),
            Err(e) => {
                error!("Failed to add {} to archive: {}", file.name, e);
                failed_count += 1;
            }
        }
    }

    let success_count = archive.len();
    let bytes = archive.finish()?;

    Ok(ArchiveOutcome {
        bytes,
        success_count,
        failed_count,
    })
}

/// Convert every PDF upload and write it under `root`
pub fn save_locally(
    extractor: &dyn TextExtractor,
    root: PathBuf,
    form: &UploadForm,
) -> Result<SaveSummary> {
    let save = LocalSave::prepare(root)?;
    let mut success_count = 0;
    let mut failed_count = 0;

    for (index, file) in form.files.iter().enumerate() {
        if !is_pdf_name(&file.name) {
            continue;
        }

        let text = match extractor.extract(&file.data) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to convert {}: {}", file.name, e);
                failed_count += 1;
                continue;
            }
        };

        let rel = form.paths.get(index).map(String::as_str);
        match save.write(rel, &file.name, &text) {
            Ok(path) => {
                info!("Converted: {} -> {}", file.name, path.display());
                success_count += 1;
            }
            Err(e) => {
                error!("Failed to write {}: {}", file.name, e);
                failed_count += 1;
            }
        }
    }

    Ok(SaveSummary {
        success: true,
        success_count,
        failed_count,
        output_path: save.root().to_path_buf(),
    })
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn upload_convert(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<Response, ApiError> {
    let form = UploadForm::from_multipart(multipart?).await?;
    let upload_id = Uuid::new_v4();
    info!("Upload {} received {} file(s) for download", upload_id, form.files.len());

    let extractor = state.extractor.clone();
    let outcome =
        tokio::task::spawn_blocking(move || convert_to_archive(extractor.as_ref(), &form.files))
            .await??;

    info!(
        "Upload {} finished: {} converted, {} failed",
        upload_id, outcome.success_count, outcome.failed_count
    );

    if outcome.success_count == 0 {
        return Err(ApiError::internal("all files failed to convert"));
    }

    let headers = [
        (header::CONTENT_TYPE, "application/zip".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", ARCHIVE_FILE_NAME),
        ),
    ];
    Ok((StatusCode::OK, headers, outcome.bytes).into_response())
}

async fn upload_save_local(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<Json<SaveSummary>, ApiError> {
    let form = UploadForm::from_multipart(multipart?).await?;
    let upload_id = Uuid::new_v4();

    let root = resolve_output_root(
        form.output_dir.as_deref(),
        form.paths.first().map(String::as_str),
        &state.config.default_save_dir(),
    );
    info!(
        "Upload {} received {} file(s) for {}",
        upload_id,
        form.files.len(),
        root.display()
    );

    let extractor = state.extractor.clone();
    let summary =
        tokio::task::spawn_blocking(move || save_locally(extractor.as_ref(), root, &form))
            .await??;

    if state.config.output.open_folder {
        if let Err(e) = open_folder(&summary.output_path) {
            warn!("{}", e);
        }
    }

    info!(
        "Upload {} saved: {} converted, {} failed, output {}",
        upload_id,
        summary.success_count,
        summary.failed_count,
        summary.output_path.display()
    );
    Ok(Json(summary))
}

/// Build the router with the index page and both upload endpoints
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.web.max_upload_bytes;

    Router::new()
        .route("/", get(index))
        .route("/api/upload-convert", post(upload_convert))
        .route("/api/upload-save-local", post(upload_save_local))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(state: AppState) -> std::io::Result<()> {
    let addr = format!("{}:{}", state.config.web.bind_address, state.config.web.port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Web server listening on http://localhost:{}", state.config.web.port);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down web server"),
        Err(e) => {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use tempfile::TempDir;

    struct Upper;

    impl TextExtractor for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn extract(&self, pdf: &[u8]) -> Result<String> {
            let text = String::from_utf8_lossy(pdf);
            if text.starts_with("bad") {
                return Err(Pdf2TxtError::extraction("upper", "unreadable"));
            }
            Ok(text.to_uppercase())
        }
    }

    fn upload(name: &str, body: &str) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            data: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn test_convert_to_archive_counts_and_skips() {
        let files = vec![
            upload("a.pdf", "alpha"),
            upload("readme.md", "ignored"),
            upload("b.PDF", "bad data"),
        ];

        let outcome = convert_to_archive(&Upper, &files).unwrap();
        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.failed_count, 1);

        let mut zip = zip::ZipArchive::new(Cursor::new(outcome.bytes)).unwrap();
        assert_eq!(zip.len(), 1);
        let mut entry = zip.by_name("a.txt").unwrap();
        let mut text = String::new();
        entry.read_to_string(&mut text).unwrap();
        assert_eq!(text, "ALPHA");
    }

    #[test]
    fn test_save_locally_mirrors_paths() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("docs");
        let form = UploadForm {
            files: vec![
                upload("one.pdf", "first"),
                upload("two.pdf", "second"),
                upload("three.pdf", "bad"),
            ],
            paths: vec![
                "docs/one.pdf".to_string(),
                "docs/sub/two.pdf".to_string(),
                "docs/three.pdf".to_string(),
            ],
            output_dir: None,
        };

        let summary = save_locally(&Upper, root.clone(), &form).unwrap();
        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.output_path, root);

        assert_eq!(std::fs::read_to_string(root.join("one.txt")).unwrap(), "FIRST");
        assert_eq!(
            std::fs::read_to_string(root.join("sub/two.txt")).unwrap(),
            "SECOND"
        );
        assert!(!root.join("three.txt").exists());
    }

    #[test]
    fn test_api_error_status() {
        let response = ApiError::bad_request("no files uploaded").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::from(Pdf2TxtError::Config("boom".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
