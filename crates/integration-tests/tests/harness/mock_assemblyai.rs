//! Mock AssemblyAI backend for integration tests
//!
//! Implements the upload, submit and poll endpoints of the v2 REST API with
//! canned results, and records what the proxy sent.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// URL handed back for uploaded audio
pub const UPLOAD_URL: &str = "https://cdn.assemblyai.test/upload/abc123";

/// How the mock answers transcription jobs
#[derive(Clone)]
pub enum Behavior {
    /// Complete with this transcript text
    Complete(String),
    /// Finish with `status: error` and this message
    Fail(String),
    /// Reject the submit call with this HTTP status and error message
    Reject(StatusCode, String),
    /// Never leave `processing`
    Hang,
    /// Reject audio uploads with this HTTP status and error message
    RejectUpload(StatusCode, String),
}

/// Mock AssemblyAI backend
pub struct MockAssemblyAi {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    behavior: Behavior,
    /// Polls answered with `processing` before a job settles
    pending_polls: AtomicU32,
    poll_count: AtomicU32,
    submit_count: AtomicU32,
    uploads: Mutex<Vec<usize>>,
    authorization: Mutex<Option<String>>,
    last_params: Mutex<Option<Value>>,
}

impl MockAssemblyAi {
    /// Start a mock that completes every job with `text`
    pub async fn start(text: &str) -> anyhow::Result<Self> {
        Self::start_with(Behavior::Complete(text.to_owned()), 0).await
    }

    /// Start a mock with explicit behavior, answering `pending_polls`
    /// status checks with `processing` first
    pub async fn start_with(behavior: Behavior, pending_polls: u32) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            behavior,
            pending_polls: AtomicU32::new(pending_polls),
            poll_count: AtomicU32::new(0),
            submit_count: AtomicU32::new(0),
            uploads: Mutex::new(Vec::new()),
            authorization: Mutex::new(None),
            last_params: Mutex::new(None),
        });

        let app = Router::new()
            .route("/v2/upload", routing::post(handle_upload))
            .route("/v2/transcript", routing::post(handle_submit))
            .route("/v2/transcript/{id}", routing::get(handle_poll))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL to configure as `assemblyai.base_url`
    pub fn base_url(&self) -> String {
        format!("http://{}/v2", self.addr)
    }

    /// Parameters of the most recent transcript submission
    pub fn last_params(&self) -> Option<Value> {
        self.state.last_params.lock().unwrap().clone()
    }

    /// `authorization` header of the most recent call
    pub fn authorization(&self) -> Option<String> {
        self.state.authorization.lock().unwrap().clone()
    }

    /// Sizes of uploaded audio bodies
    pub fn uploads(&self) -> Vec<usize> {
        self.state.uploads.lock().unwrap().clone()
    }

    /// Number of transcript submissions received
    pub fn submit_count(&self) -> u32 {
        self.state.submit_count.load(Ordering::Relaxed)
    }

    /// Number of status checks received
    pub fn poll_count(&self) -> u32 {
        self.state.poll_count.load(Ordering::Relaxed)
    }
}

impl Drop for MockAssemblyAi {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn record_authorization(state: &MockState, headers: &HeaderMap) {
    let value = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    *state.authorization.lock().unwrap() = value;
}

async fn handle_upload(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    record_authorization(&state, &headers);
    state.uploads.lock().unwrap().push(body.len());

    if let Behavior::RejectUpload(status, ref message) = state.behavior {
        return (status, Json(json!({"error": message}))).into_response();
    }

    Json(json!({"upload_url": UPLOAD_URL})).into_response()
}

async fn handle_submit(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(params): Json<Value>,
) -> Response {
    record_authorization(&state, &headers);
    state.submit_count.fetch_add(1, Ordering::Relaxed);
    *state.last_params.lock().unwrap() = Some(params);

    if let Behavior::Reject(status, ref message) = state.behavior {
        return (status, Json(json!({"error": message}))).into_response();
    }

    Json(json!({"id": "job-1", "status": "queued", "text": null})).into_response()
}

async fn handle_poll(State(state): State<Arc<MockState>>, Path(id): Path<String>, headers: HeaderMap) -> Response {
    record_authorization(&state, &headers);
    state.poll_count.fetch_add(1, Ordering::Relaxed);

    let still_pending = state
        .pending_polls
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
        .is_ok();

    if still_pending || matches!(state.behavior, Behavior::Hang) {
        return Json(json!({"id": id, "status": "processing", "text": null})).into_response();
    }

    match state.behavior {
        Behavior::Fail(ref message) => {
            Json(json!({"id": id, "status": "error", "error": message, "text": null})).into_response()
        }
        Behavior::Complete(ref text) => {
            let speaker_labels = state
                .last_params
                .lock()
                .unwrap()
                .as_ref()
                .and_then(|p| p["speaker_labels"].as_bool())
                .unwrap_or(false);

            Json(completed(&id, text, speaker_labels)).into_response()
        }
        Behavior::Reject(..) | Behavior::RejectUpload(..) | Behavior::Hang => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Completed transcript with one word entry per whitespace-separated token
fn completed(id: &str, text: &str, speaker_labels: bool) -> Value {
    let words: Vec<Value> = text
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let start = i as u64 * 500;
            json!({"text": word, "start": start, "end": start + 400, "confidence": 0.95, "speaker": null})
        })
        .collect();

    let end = words.len() as u64 * 500;

    let utterances = speaker_labels.then(|| {
        json!([{"speaker": "A", "text": text, "start": 0, "end": end, "confidence": 0.95, "words": words}])
    });

    json!({
        "id": id,
        "status": "completed",
        "text": text,
        "language_code": "en_us",
        "audio_duration": end / 1000,
        "words": words,
        "utterances": utterances,
    })
}
