mod audio_artifact;
mod storage_path;
mod transcription;

pub use audio_artifact::{ACCEPTED_MEDIA_TYPE, AudioArtifact, FALLBACK_MEDIA_TYPE};
pub use storage_path::{ARTIFACT_EXTENSION, StoragePath};
pub use transcription::Transcription;
