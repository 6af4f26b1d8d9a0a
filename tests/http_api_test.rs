//! HTTP surface tests: upload acceptance, status polling, health.

use std::io::{Cursor, Write};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tokio::sync::mpsc;
use tower::ServiceExt;
use zip::write::SimpleFileOptions;

use fixpoint::adapters::http::{build_router, AppState};
use fixpoint::adapters::storage::FsJobRepository;
use fixpoint::domain::models::{Job, Language};
use fixpoint::domain::ports::JobRepository;
use fixpoint::services::WorkspaceService;

const BOUNDARY: &str = "test-boundary-7f3a";

struct TestApp {
    router: axum::Router,
    jobs: Arc<FsJobRepository>,
    // Dropping the receiver would make uploads fail with 503
    _queue: mpsc::Receiver<Job>,
    _tmp: tempfile::TempDir,
}

fn test_app() -> TestApp {
    let tmp = tempfile::tempdir().unwrap();
    let jobs = Arc::new(FsJobRepository::new(tmp.path()));
    let (tx, rx) = mpsc::channel(8);
    let state = AppState::new(WorkspaceService::new(tmp.path()), jobs.clone(), tx, 5);
    TestApp {
        router: build_router(state, 8),
        jobs,
        _queue: rx,
        _tmp: tmp,
    }
}

fn zip_archive(files: &[(&str, &str)]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buf);
        for (name, body) in files {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }
    buf.into_inner()
}

fn multipart_body(archive: &[u8], language: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"demo.zip\"\r\nContent-Type: application/zip\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(archive);
    body.extend_from_slice(b"\r\n");
    if let Some(lang) = language {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"language\"\r\n\r\n{lang}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint() {
    let app = test_app();
    let response = app
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn upload_queues_a_job() {
    let app = test_app();
    let archive = zip_archive(&[("main.py", "print('hi')\n")]);

    let response = app
        .router
        .clone()
        .oneshot(upload_request(multipart_body(&archive, None)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let json = json_body(response).await;
    assert_eq!(json["status"], "accepted");
    assert_eq!(json["language"], "py");
    let workspace = json["job"].as_str().unwrap().to_string();

    // Job record persisted and visible to polling
    let job = app.jobs.load(&workspace).await.unwrap().unwrap();
    assert_eq!(job.language, Language::Python);

    let response = app
        .router
        .oneshot(
            Request::get(format!("/status/{workspace}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "processing");
}

#[tokio::test]
async fn mixed_archive_needs_language_field() {
    let app = test_app();
    let archive = zip_archive(&[("a.py", "x = 1\n"), ("b.cpp", "int x;\n")]);

    let response = app
        .router
        .clone()
        .oneshot(upload_request(multipart_body(&archive, None)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .router
        .oneshot(upload_request(multipart_body(&archive, Some("cpp"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = json_body(response).await;
    assert_eq!(json["language"], "cpp");
}

#[tokio::test]
async fn invalid_payloads_are_rejected() {
    let app = test_app();

    // Not a zip
    let response = app
        .router
        .clone()
        .oneshot(upload_request(multipart_body(b"not a zip", None)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["status"], "error");

    // Missing file field entirely
    let body = format!("--{BOUNDARY}--\r\n").into_bytes();
    let response = app.router.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_workspace_is_not_found() {
    let app = test_app();
    let response = app
        .router
        .oneshot(
            Request::get("/status/no_such_workspace")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["status"], "not_found");
}
