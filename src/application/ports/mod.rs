mod staging_store;
mod transcription_engine;

pub use staging_store::{ByteStream, StagingStore, StagingStoreError, StoredObject};
pub use transcription_engine::{AudioUpload, RelayError, TranscriptionEngine};
