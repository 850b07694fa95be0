use async_trait::async_trait;
use reqwest::{Body, multipart};
use serde::Deserialize;

use crate::application::ports::{AudioUpload, RelayError, TranscriptionEngine};
use crate::infrastructure::observability::sanitize_for_log;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "whisper-1";

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

pub struct OpenAiWhisperEngine {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiWhisperEngine {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }
}

#[async_trait]
impl TranscriptionEngine for OpenAiWhisperEngine {
    async fn transcribe(&self, audio: AudioUpload) -> Result<String, RelayError> {
        let url = self.endpoint();

        let file_part =
            multipart::Part::stream_with_length(Body::wrap_stream(audio.stream), audio.size_bytes)
                .file_name(audio.file_name)
                .mime_str(&audio.media_type)
                .map_err(|e| RelayError::Unexpected(format!("mime: {}", e)))?;

        let form = multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone());

        tracing::debug!(
            model = %self.model,
            bytes = audio.size_bytes,
            "Sending audio to OpenAI Whisper API"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                // A body error means the local artifact stream failed, not the network.
                if e.is_body() {
                    RelayError::Unexpected(format!("reading audio: {}", e))
                } else {
                    RelayError::Transport(e.to_string())
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let raw = response
                .bytes()
                .await
                .map_err(|e| RelayError::Transport(format!("error body: {}", e)))?;
            tracing::warn!(
                status = status.as_u16(),
                body = %sanitize_for_log(&String::from_utf8_lossy(&raw)),
                "OpenAI Whisper API returned an error"
            );
            return match serde_json::from_slice(&raw) {
                Ok(body) => Err(RelayError::Upstream {
                    status: status.as_u16(),
                    body,
                }),
                Err(_) => Err(RelayError::Unexpected(format!(
                    "status {}: {}",
                    status,
                    String::from_utf8_lossy(&raw)
                ))),
            };
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| RelayError::Unexpected(format!("body: {}", e)))?;

        tracing::info!(
            chars = parsed.text.chars().count(),
            "OpenAI Whisper transcription completed"
        );

        Ok(parsed.text)
    }
}
