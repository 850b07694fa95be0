mod environment;
mod settings;

pub use environment::{ENVIRONMENT_VAR, Environment};
pub use settings::{
    CorsOriginError, CorsSettings, LoggingSettings, RetentionSettings, ServerSettings, Settings,
    TranscriptionSettings, UploadSettings,
};
