//! HTTP surface: archive upload, status polling, health.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::domain::errors::DomainError;
use crate::domain::models::{Job, Language};
use crate::domain::ports::{JobPoll, JobRepository};
use crate::services::{RepairLoop, WorkspaceService};

#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

#[derive(Clone)]
pub struct AppState {
    workspaces: WorkspaceService,
    jobs: Arc<dyn JobRepository>,
    queue: mpsc::Sender<Job>,
    default_max_iters: u32,
}

impl AppState {
    pub fn new(
        workspaces: WorkspaceService,
        jobs: Arc<dyn JobRepository>,
        queue: mpsc::Sender<Job>,
        default_max_iters: u32,
    ) -> Self {
        Self {
            workspaces,
            jobs,
            queue,
            default_max_iters,
        }
    }
}

/// Sequential job worker: one repair run at a time, in submission order.
///
/// `RepairLoop::run` persists terminal state itself, so the worker only
/// logs outcomes.
pub fn spawn_worker(
    repair: Arc<RepairLoop>,
    mut queue: mpsc::Receiver<Job>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(job) = queue.recv().await {
            let workspace = job.workspace_id.clone();
            info!(workspace = %workspace, "Worker picked up job");
            if let Err(err) = repair.run(job).await {
                error!(workspace = %workspace, error = %err, "Job errored");
            }
        }
        info!("Job queue closed, worker exiting");
    })
}

pub fn build_router(state: AppState, max_upload_mb: usize) -> Router {
    Router::new()
        .route("/upload", post(upload))
        .route("/status/{workspace}", get(status))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_mb * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &HttpServerConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state, config.max_upload_mb);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(%addr, "HTTP server listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    status: &'static str,
    job: String,
    language: Language,
}

async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut archive: Option<(String, Vec<u8>)> = None;
    let mut language: Option<Language> = None;
    let mut max_iters: Option<u32> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return bad_request(format!("malformed multipart body: {e}")),
        };
        match field.name().unwrap_or_default() {
            "file" => {
                let name = field
                    .file_name()
                    .map_or_else(|| "upload.zip".to_string(), str::to_string);
                match field.bytes().await {
                    Ok(bytes) => archive = Some((name, bytes.to_vec())),
                    Err(e) => return bad_request(format!("failed to read upload: {e}")),
                }
            }
            "language" => match field.text().await {
                Ok(text) => match Language::from_str(text.trim()) {
                    Some(lang) => language = Some(lang),
                    None => return bad_request(format!("unknown language '{}'", text.trim())),
                },
                Err(e) => return bad_request(format!("failed to read language field: {e}")),
            },
            "max_iters" => match field.text().await {
                Ok(text) => match text.trim().parse::<u32>() {
                    Ok(n) if n > 0 => max_iters = Some(n),
                    _ => return bad_request(format!("invalid max_iters '{}'", text.trim())),
                },
                Err(e) => return bad_request(format!("failed to read max_iters field: {e}")),
            },
            _ => {}
        }
    }

    let Some((name, bytes)) = archive else {
        return bad_request("missing 'file' field".to_string());
    };

    // Extraction is blocking filesystem work
    let workspaces = state.workspaces.clone();
    let intake = tokio::task::spawn_blocking(move || {
        workspaces.intake_bytes(&name, &bytes, language)
    })
    .await;

    let info = match intake {
        Ok(Ok(info)) => info,
        Ok(Err(err)) => return domain_error(&err),
        Err(e) => return internal(format!("intake task failed: {e}")),
    };

    let job = Job::new(&info.id, &info.root, info.language)
        .with_max_iters(max_iters.unwrap_or(state.default_max_iters));

    if let Err(err) = state.jobs.create(&job).await {
        return domain_error(&err);
    }
    if state.queue.send(job).await.is_err() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "error", "error": "worker is not accepting jobs"})),
        )
            .into_response();
    }

    info!(workspace = %info.id, "Upload accepted");
    (
        StatusCode::ACCEPTED,
        Json(UploadResponse {
            status: "accepted",
            job: info.id,
            language: info.language,
        }),
    )
        .into_response()
}

async fn status(State(state): State<AppState>, Path(workspace): Path<String>) -> Response {
    match state.jobs.poll(&workspace).await {
        Ok(JobPoll::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({"status": "not_found", "workspace": workspace})),
        )
            .into_response(),
        Ok(JobPoll::Processing) => {
            Json(json!({"status": "processing", "workspace": workspace})).into_response()
        }
        Ok(JobPoll::Done(result)) => Json(json!({
            "status": "done",
            "workspace": workspace,
            "result": *result,
        }))
        .into_response(),
        Ok(JobPoll::Errored(detail)) => Json(json!({
            "status": "error",
            "workspace": workspace,
            "error": detail,
        }))
        .into_response(),
        Err(err) => domain_error(&err),
    }
}

fn bad_request(detail: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"status": "error", "error": detail})),
    )
        .into_response()
}

fn internal(detail: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"status": "error", "error": detail})),
    )
        .into_response()
}

fn domain_error(err: &DomainError) -> Response {
    let status = match err {
        DomainError::InvalidUpload(_) | DomainError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
        DomainError::JobNotFound(_) | DomainError::WorkspaceNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(json!({"status": "error", "error": err.to_string()})),
    )
        .into_response()
}
