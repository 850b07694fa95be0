use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::application::ports::{AudioUpload, RelayError, StagingStore, TranscriptionEngine};
use crate::domain::AudioArtifact;

pub struct TranscriptionRelay {
    engine: Arc<dyn TranscriptionEngine>,
    staging_store: Arc<dyn StagingStore>,
    permits: Option<Arc<Semaphore>>,
}

impl TranscriptionRelay {
    /// `max_in_flight` caps simultaneous calls to the engine; `None` leaves
    /// them unbounded.
    pub fn new(
        engine: Arc<dyn TranscriptionEngine>,
        staging_store: Arc<dyn StagingStore>,
        max_in_flight: Option<usize>,
    ) -> Self {
        Self {
            engine,
            staging_store,
            permits: max_in_flight.map(|n| Arc::new(Semaphore::new(n.max(1)))),
        }
    }

    /// Single attempt; the first failure is returned as-is.
    #[tracing::instrument(skip(self, artifact), fields(path = %artifact.path))]
    pub async fn transcribe(&self, artifact: &AudioArtifact) -> Result<String, RelayError> {
        let _permit = match &self.permits {
            Some(semaphore) => Some(
                Arc::clone(semaphore)
                    .acquire_owned()
                    .await
                    .map_err(|e| RelayError::Unexpected(format!("relay permit: {}", e)))?,
            ),
            None => None,
        };

        let stream = self
            .staging_store
            .open(&artifact.path)
            .await
            .map_err(|e| RelayError::Unexpected(format!("opening {}: {}", artifact.path, e)))?;

        let audio = AudioUpload {
            file_name: artifact.path.file_name().to_string(),
            media_type: artifact.media_type.clone(),
            size_bytes: artifact.size_bytes,
            stream,
        };

        let text = self.engine.transcribe(audio).await?;

        tracing::info!(chars = text.chars().count(), "Transcription relayed");
        Ok(text)
    }
}
