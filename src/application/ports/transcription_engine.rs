use async_trait::async_trait;
use serde_json::Value;

use super::staging_store::ByteStream;

/// Audio handed to an engine: a stream over a fully-written artifact.
pub struct AudioUpload {
    pub file_name: String,
    pub media_type: String,
    pub size_bytes: u64,
    pub stream: ByteStream<'static>,
}

#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(&self, audio: AudioUpload) -> Result<String, RelayError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The service answered with a non-2xx status and a JSON body.
    #[error("transcription service returned status {status}")]
    Upstream { status: u16, body: Value },
    /// The request never got a response.
    #[error("transcription service unreachable: {0}")]
    Transport(String),
    #[error("error sending to transcription service: {0}")]
    Unexpected(String),
}

impl RelayError {
    /// JSON value placed under `error` in the client response.
    pub fn payload(&self) -> Value {
        match self {
            Self::Upstream { body, .. } => body.clone(),
            other => Value::String(other.to_string()),
        }
    }
}
