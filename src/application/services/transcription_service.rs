use std::sync::Arc;

use serde_json::Value;

use crate::application::ports::{RelayError, StagingStore};
use crate::domain::{AudioArtifact, Transcription};

use super::transcription_relay::TranscriptionRelay;
use super::upload_receiver::{IncomingUpload, UploadError, UploadReceiver};

/// Receive, relay, then apply the retention policy for one request.
pub struct TranscriptionService {
    receiver: UploadReceiver,
    relay: TranscriptionRelay,
    staging_store: Arc<dyn StagingStore>,
    retain_artifacts: bool,
}

impl TranscriptionService {
    /// With `retain_artifacts` the artifact outlives a successful request and
    /// is left for the retention sweeper. Failed requests never keep theirs.
    pub fn new(
        receiver: UploadReceiver,
        relay: TranscriptionRelay,
        staging_store: Arc<dyn StagingStore>,
        retain_artifacts: bool,
    ) -> Self {
        Self {
            receiver,
            relay,
            staging_store,
            retain_artifacts,
        }
    }

    pub fn retains_artifacts(&self) -> bool {
        self.retain_artifacts
    }

    pub async fn transcribe_upload(
        &self,
        upload: IncomingUpload<'_>,
    ) -> Result<Transcription, TranscribeError> {
        let artifact = self.receiver.receive(upload).await?;

        match self.relay.transcribe(&artifact).await {
            Ok(text) => {
                if !self.retain_artifacts {
                    self.discard(&artifact).await;
                }
                Ok(Transcription { text, artifact })
            }
            Err(e) => {
                tracing::error!(error = %e, path = %artifact.path, "Transcription relay failed");
                self.discard(&artifact).await;
                Err(TranscribeError::Relay(e))
            }
        }
    }

    async fn discard(&self, artifact: &AudioArtifact) {
        if let Err(e) = self.staging_store.delete(&artifact.path).await {
            tracing::warn!(error = %e, path = %artifact.path, "Failed to delete artifact");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscribeError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl TranscribeError {
    pub fn payload(&self) -> Value {
        match self {
            Self::Upload(e) => Value::String(e.to_string()),
            Self::Relay(e) => e.payload(),
        }
    }
}
