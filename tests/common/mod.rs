#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use futures::TryStreamExt;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use voxrelay::application::ports::{AudioUpload, RelayError, StagingStore, TranscriptionEngine};
use voxrelay::application::services::{TranscriptionRelay, TranscriptionService, UploadReceiver};
use voxrelay::presentation::{Environment, Settings};

pub const BOUNDARY: &str = "voxrelay-test-boundary";

/// What the engine stub answers with.
#[derive(Clone)]
pub enum StubReply {
    Text(String),
    Upstream(u16, serde_json::Value),
    Transport(String),
}

pub struct StubEngine {
    reply: StubReply,
    delay: Duration,
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub received: Mutex<Vec<Vec<u8>>>,
}

impl StubEngine {
    pub fn new(reply: StubReply) -> Self {
        Self::with_delay(reply, Duration::ZERO)
    }

    pub fn with_delay(reply: StubReply, delay: Duration) -> Self {
        Self {
            reply,
            delay,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new(StubReply::Text(text.to_string()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TranscriptionEngine for StubEngine {
    async fn transcribe(&self, audio: AudioUpload) -> Result<String, RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let chunks: Vec<bytes::Bytes> = audio
            .stream
            .try_collect()
            .await
            .map_err(|e| RelayError::Unexpected(e.to_string()))?;
        self.received.lock().unwrap().push(chunks.concat());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match &self.reply {
            StubReply::Text(text) => Ok(text.clone()),
            StubReply::Upstream(status, body) => Err(RelayError::Upstream {
                status: *status,
                body: body.clone(),
            }),
            StubReply::Transport(message) => Err(RelayError::Transport(message.clone())),
        }
    }
}

pub fn build_service(
    store: Arc<dyn StagingStore>,
    engine: Arc<dyn TranscriptionEngine>,
    retain_artifacts: bool,
    max_in_flight: Option<usize>,
) -> TranscriptionService {
    TranscriptionService::new(
        UploadReceiver::new(Arc::clone(&store)),
        TranscriptionRelay::new(engine, Arc::clone(&store), max_in_flight),
        store,
        retain_artifacts,
    )
}

pub fn test_settings(overrides: &[(&str, &str)]) -> Settings {
    let mut builder = Settings::builder(Environment::Test)
        .unwrap()
        .set_override("transcription.api_key", "test-key")
        .unwrap()
        .set_override("server.port", 5015)
        .unwrap()
        .set_override("upload.include_artifact_url", false)
        .unwrap()
        .set_override("cors.allowed_origin", "*")
        .unwrap()
        .set_override("upload.public_base_url", "")
        .unwrap();
    for (key, value) in overrides {
        builder = builder.set_override(*key, *value).unwrap();
    }
    Settings::from_config(builder.build().unwrap()).unwrap()
}

/// One multipart part: field name, optional file name and content type, bytes.
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(name: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            file_name: Some("recording.webm"),
            content_type: Some(content_type),
            data,
        }
    }

    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            file_name: None,
            content_type: None,
            data: value.as_bytes(),
        }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{}\"", file_name));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

/// What the mock transcription API saw.
#[derive(Debug, Clone, Default)]
pub struct CapturedRequest {
    pub authorization: Option<String>,
    pub model: Option<String>,
    pub file_name: Option<String>,
    pub file_content_type: Option<String>,
    pub file_bytes: Vec<u8>,
}

#[derive(Clone)]
struct MockApiState {
    status: StatusCode,
    body: &'static str,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

async fn mock_transcriptions(
    State(state): State<MockApiState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut captured = CapturedRequest {
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        ..Default::default()
    };

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(String::from);
        match name.as_deref() {
            Some("model") => captured.model = field.text().await.ok(),
            Some("file") => {
                captured.file_name = field.file_name().map(String::from);
                captured.file_content_type = field.content_type().map(String::from);
                captured.file_bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
            }
            _ => {}
        }
    }

    state.captured.lock().unwrap().push(captured);

    (
        state.status,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        state.body,
    )
        .into_response()
}

/// Serves `POST /v1/audio/transcriptions` on an ephemeral port and returns the
/// base URL to hand to the engine.
pub async fn start_mock_whisper_server(
    status: u16,
    body: &'static str,
) -> (String, oneshot::Sender<()>, Arc<Mutex<Vec<CapturedRequest>>>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let captured = Arc::new(Mutex::new(Vec::new()));

    let app = Router::new()
        .route("/v1/audio/transcriptions", post(mock_transcriptions))
        .with_state(MockApiState {
            status: StatusCode::from_u16(status).unwrap(),
            body,
            captured: Arc::clone(&captured),
        });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}/v1", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (base_url, shutdown_tx, captured)
}
