use std::io;

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::{StreamExt, TryStreamExt};
use serde::Serialize;
use serde_json::Value;

use crate::application::services::{IncomingUpload, TranscribeError, UploadError};
use crate::presentation::state::AppState;

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
    #[serde(rename = "audioUrl", skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: Value,
}

impl IntoResponse for TranscribeError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: self.payload(),
            }),
        )
            .into_response()
    }
}

#[tracing::instrument(skip(state, multipart))]
pub async fn transcribe_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected non-multipart transcription request");
            return TranscribeError::from(UploadError::Malformed(e.body_text())).into_response();
        }
    };

    let field_name = state.settings.upload.field_name.as_str();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read multipart");
                return TranscribeError::from(UploadError::Malformed(e.body_text()))
                    .into_response();
            }
        };

        if field.name() != Some(field_name) {
            tracing::debug!(field = ?field.name(), "Skipping unexpected multipart field");
            continue;
        }

        let upload = IncomingUpload {
            field_name: field_name.to_string(),
            file_name: field.file_name().map(String::from),
            content_type: field.content_type().map(String::from),
            stream: field.map_err(io::Error::other).boxed(),
        };

        return match state.transcription_service.transcribe_upload(upload).await {
            Ok(transcription) => {
                let audio_url = state.transcription_service.retains_artifacts().then(|| {
                    state
                        .settings
                        .upload
                        .artifact_url(transcription.artifact.path.file_name())
                });
                tracing::info!(
                    path = %transcription.artifact.path,
                    chars = transcription.text.chars().count(),
                    "Transcription completed"
                );
                (
                    StatusCode::OK,
                    Json(TranscribeResponse {
                        text: transcription.text,
                        audio_url,
                    }),
                )
                    .into_response()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Transcription request failed");
                e.into_response()
            }
        };
    }

    tracing::warn!(field = field_name, "Transcription request with no file");
    TranscribeError::from(UploadError::MissingFile(field_name.to_string())).into_response()
}
