//! In-process stub of the HWP Reader service.
//!
//! Binds to `127.0.0.1:0`, serves the two reader endpoints with axum and
//! records every upload it receives so tests can assert on the multipart
//! shape as well as on the client's verdict.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Prefix the stub puts in front of every converted document.
pub const HWPX_MAGIC: &[u8] = b"PK\x03\x04";

/// How the stub behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubMode {
    /// POST-only extract route (GET → 405), both uploads succeed.
    Healthy,
    /// GET on the extract route answers 200.
    ProbeOk,
    /// GET on the extract route answers 503.
    ProbeUnavailable,
    /// GET on the extract route hangs longer than any probe timeout.
    ProbeHangs,
    /// Both upload endpoints answer 500 with a plain-text body.
    ServerError,
    /// Extraction answers 200 with a body that is not JSON.
    MalformedJson,
    /// Extraction returns different text on every call.
    Flaky,
}

/// One multipart upload as the stub saw it.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub endpoint: &'static str,
    pub field: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub len: usize,
}

#[derive(Clone)]
struct StubState {
    mode: StubMode,
    uploads: Arc<Mutex<Vec<RecordedUpload>>>,
    calls: Arc<Mutex<usize>>,
}

/// Handle to a running stub; the server stops when the handle is dropped.
pub struct StubServer {
    pub base_url: String,
    uploads: Arc<Mutex<Vec<RecordedUpload>>>,
    join: JoinHandle<()>,
}

impl StubServer {
    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.join.abort();
    }
}

/// Route library logs through the test harness so they show up only for
/// failing tests. `RUST_LOG` overrides the default `warn` level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub async fn spawn_stub(mode: StubMode) -> StubServer {
    init_tracing();
    let uploads = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        mode,
        uploads: Arc::clone(&uploads),
        calls: Arc::new(Mutex::new(0)),
    };

    let extract_route: MethodRouter<StubState> = match mode {
        StubMode::ProbeOk | StubMode::ProbeUnavailable | StubMode::ProbeHangs => {
            get(probe).post(extract)
        }
        _ => post(extract),
    };
    let app = Router::new()
        .route("/api/reader/extract", extract_route)
        .route("/api/reader/content", post(convert))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("stub bind failed");
    let addr = listener.local_addr().expect("stub local addr failed");
    let join = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    StubServer {
        base_url: format!("http://{addr}"),
        uploads,
        join,
    }
}

/// A base URL on which nothing is listening.
pub async fn dead_base_url() -> String {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Write a small fake document into `dir` and return its path.
pub fn sample_document(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let mut bytes = b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1".to_vec();
    bytes.extend_from_slice("한글 문서 본문 ".repeat(40).as_bytes());
    std::fs::write(&path, bytes).unwrap();
    path
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn probe(State(state): State<StubState>) -> Response {
    match state.mode {
        StubMode::ProbeOk => (StatusCode::OK, "ok").into_response(),
        StubMode::ProbeHangs => {
            tokio::time::sleep(Duration::from_secs(10)).await;
            (StatusCode::OK, "late").into_response()
        }
        _ => (StatusCode::SERVICE_UNAVAILABLE, "starting up").into_response(),
    }
}

async fn extract(State(state): State<StubState>, multipart: Multipart) -> Response {
    let Some((upload, bytes)) = read_upload("extract", multipart).await else {
        return (StatusCode::BAD_REQUEST, "missing file part").into_response();
    };
    state.uploads.lock().unwrap().push(upload.clone());

    match state.mode {
        StubMode::ServerError => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "처리 중 오류 발생: unsupported format",
        )
            .into_response(),
        StubMode::MalformedJson => (StatusCode::OK, "<html>not json</html>").into_response(),
        StubMode::Flaky => {
            let mut calls = state.calls.lock().unwrap();
            *calls += 1;
            Json(json!({ "status": "success", "document": format!("run {}", *calls) }))
                .into_response()
        }
        _ => {
            let document = format!(
                "{} 본문 ({} bytes)",
                upload.filename.as_deref().unwrap_or("unnamed"),
                bytes.len()
            );
            Json(json!({ "status": "success", "document": document })).into_response()
        }
    }
}

async fn convert(State(state): State<StubState>, multipart: Multipart) -> Response {
    let Some((upload, bytes)) = read_upload("content", multipart).await else {
        return (StatusCode::BAD_REQUEST, "missing file part").into_response();
    };
    state.uploads.lock().unwrap().push(upload);

    if state.mode == StubMode::ServerError {
        return (StatusCode::INTERNAL_SERVER_ERROR, "conversion exploded").into_response();
    }
    let mut body = HWPX_MAGIC.to_vec();
    body.extend(bytes.iter().rev());
    (StatusCode::OK, body).into_response()
}

async fn read_upload(
    endpoint: &'static str,
    mut multipart: Multipart,
) -> Option<(RecordedUpload, Bytes)> {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name != "file" {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.ok()?;
        let upload = RecordedUpload {
            endpoint,
            field: name,
            filename,
            content_type,
            len: bytes.len(),
        };
        return Some((upload, bytes));
    }
    None
}
