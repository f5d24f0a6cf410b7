use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    config::Settings,
    error::PipelineError,
    llm::OpenRouterModel,
    models::{AnalyzeResponse, normalize_query},
    pipeline::ReportPipeline,
    tools::Toolbox,
};

/// Uploads larger than this are rejected before they reach the handler
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn detail_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (status, Json(json!({ "detail": detail.into() })))
}

fn processing_error(e: &PipelineError) -> ApiError {
    detail_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Error processing blood report: {}", e),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub pipeline: ReportPipeline,
    pub upload_dir: PathBuf,
}

pub fn create_app(settings: &Settings) -> Router {
    let model = Arc::new(OpenRouterModel::new(&settings.model));
    let tools = Toolbox::new(&settings.search);

    build_router(AppState {
        pipeline: ReportPipeline::new(model, tools),
        upload_dir: settings.upload_dir.clone(),
    })
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/analyze", post(analyze_blood_report))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Blood Test Report Analyser API is running" }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// The parts of the multipart form we care about
struct ReportUpload {
    filename: String,
    content: Vec<u8>,
    query: Option<String>,
}

async fn read_upload(multipart: &mut Multipart) -> Result<ReportUpload, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut query = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Malformed multipart body: {}", e);
        detail_error(StatusCode::BAD_REQUEST, format!("Invalid form data: {}", e))
    })? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content = field.bytes().await.map_err(|e| {
                    detail_error(StatusCode::BAD_REQUEST, format!("Could not read file: {}", e))
                })?;
                file = Some((filename, content.to_vec()));
            }
            Some("query") => {
                let text = field.text().await.map_err(|e| {
                    detail_error(StatusCode::BAD_REQUEST, format!("Could not read query: {}", e))
                })?;
                query = Some(text);
            }
            _ => {}
        }
    }

    let (filename, content) = file.ok_or_else(|| {
        detail_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Field required: file",
        )
    })?;

    Ok(ReportUpload {
        filename,
        content,
        query,
    })
}

async fn analyze_blood_report(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<AnalyzeResponse> {
    let upload = read_upload(&mut multipart).await?;
    let query = normalize_query(upload.query.as_deref());

    let temp_file = TempUpload::new(
        state
            .upload_dir
            .join(format!("blood_test_report_{}.pdf", Uuid::new_v4())),
    );

    info!(
        "Starting analysis for query: '{}' with file: {}",
        query, upload.filename
    );

    let outcome = process_report(&state, temp_file.path(), &query, &upload.content).await;
    drop(temp_file);

    match outcome {
        Ok(analysis) => Ok(Json(AnalyzeResponse {
            status: "success".to_string(),
            query,
            analysis,
            file_processed: upload.filename,
        })),
        Err(e) => {
            error!("An error occurred while processing {}: {}", upload.filename, e);
            Err(processing_error(&e))
        }
    }
}

async fn process_report(
    state: &AppState,
    file_path: &Path,
    query: &str,
    content: &[u8],
) -> Result<String, PipelineError> {
    let upload_error = |source: std::io::Error| PipelineError::Upload {
        path: file_path.to_path_buf(),
        source,
    };

    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(upload_error)?;
    tokio::fs::write(file_path, content)
        .await
        .map_err(upload_error)?;

    state.pipeline.run(query, file_path).await
}

/// Owns the saved upload and deletes it on drop, so the file also goes away
/// when the handler future is cancelled mid-pipeline.
///
/// Best effort: a failed cleanup is logged and never fails the request.
struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => info!("Cleaned up temporary file: {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Could not remove temporary file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
