use std::io;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

use crate::domain::StoragePath;

pub type ByteStream<'a> = BoxStream<'a, Result<Bytes, io::Error>>;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub path: StoragePath,
    pub size_bytes: u64,
    pub last_modified: DateTime<Utc>,
}

/// Transient storage for uploaded artifacts.
///
/// `store` must only make the object visible once the whole stream has been
/// written; an interrupted stream leaves nothing behind.
#[async_trait::async_trait]
pub trait StagingStore: Send + Sync {
    async fn store(
        &self,
        path: &StoragePath,
        stream: ByteStream<'_>,
    ) -> Result<u64, StagingStoreError>;

    async fn open(&self, path: &StoragePath) -> Result<ByteStream<'static>, StagingStoreError>;

    async fn fetch(&self, path: &StoragePath) -> Result<Vec<u8>, StagingStoreError>;

    async fn delete(&self, path: &StoragePath) -> Result<(), StagingStoreError>;

    async fn list(&self) -> Result<Vec<StoredObject>, StagingStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StagingStoreError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("list failed: {0}")]
    ListFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
