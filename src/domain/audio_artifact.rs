use super::storage_path::StoragePath;

/// The only media type the relay forwards.
pub const ACCEPTED_MEDIA_TYPE: &str = "audio/webm";

/// Media type assumed when the client declares none.
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// One received upload, fully written to the staging store.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioArtifact {
    pub path: StoragePath,
    pub media_type: String,
    pub size_bytes: u64,
}

impl AudioArtifact {
    pub fn new(path: StoragePath, media_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            path,
            media_type: media_type.into(),
            size_bytes,
        }
    }

    /// Exact comparison: parameters such as `;codecs=opus` are not accepted.
    pub fn has_accepted_media_type(&self) -> bool {
        self.media_type == ACCEPTED_MEDIA_TYPE
    }
}
