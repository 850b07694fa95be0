mod retention_sweeper;
mod transcription_relay;
mod transcription_service;
mod upload_receiver;

pub use retention_sweeper::RetentionSweeper;
pub use transcription_relay::TranscriptionRelay;
pub use transcription_service::{TranscribeError, TranscriptionService};
pub use upload_receiver::{IncomingUpload, UploadError, UploadReceiver};
