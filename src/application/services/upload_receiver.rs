use std::sync::Arc;

use crate::application::ports::{ByteStream, StagingStore, StagingStoreError};
use crate::domain::{AudioArtifact, FALLBACK_MEDIA_TYPE, StoragePath};

/// One multipart field as it arrives from the client.
pub struct IncomingUpload<'a> {
    pub field_name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub stream: ByteStream<'a>,
}

pub struct UploadReceiver {
    staging_store: Arc<dyn StagingStore>,
}

impl UploadReceiver {
    pub fn new(staging_store: Arc<dyn StagingStore>) -> Self {
        Self { staging_store }
    }

    /// Writes the upload in full, then checks its declared media type.
    ///
    /// A rejected upload is deleted before the error is returned.
    #[tracing::instrument(skip(self, upload), fields(field = %upload.field_name))]
    pub async fn receive(&self, upload: IncomingUpload<'_>) -> Result<AudioArtifact, UploadError> {
        let path = StoragePath::generate(&upload.field_name);
        let media_type = upload
            .content_type
            .unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_string());

        let size_bytes = self.staging_store.store(&path, upload.stream).await?;

        tracing::debug!(
            path = %path,
            bytes = size_bytes,
            media_type = %media_type,
            client_file_name = upload.file_name.as_deref().unwrap_or("-"),
            "Upload stored"
        );

        let artifact = AudioArtifact::new(path, media_type, size_bytes);

        if !artifact.has_accepted_media_type() {
            tracing::warn!(media_type = %artifact.media_type, "Rejected upload media type");
            if let Err(e) = self.staging_store.delete(&artifact.path).await {
                tracing::warn!(error = %e, path = %artifact.path, "Failed to delete rejected upload");
            }
            return Err(UploadError::UnsupportedMediaType(artifact.media_type));
        }

        Ok(artifact)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("no file received in field '{0}'")]
    MissingFile(String),
    #[error("invalid multipart request: {0}")]
    Malformed(String),
    #[error("file is not in webm format")]
    UnsupportedMediaType(String),
    #[error("failed to store upload: {0}")]
    Storage(#[from] StagingStoreError),
}
