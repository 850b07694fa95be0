use axum::http::HeaderValue;
use axum::http::header::InvalidHeaderValue;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File};
use serde::Deserialize;

use super::environment::Environment;

/// Variables read by earlier deployments, mapped onto their settings keys.
const LEGACY_OVERRIDES: [(&str, &str); 3] = [
    ("server.port", "PORT"),
    ("transcription.api_key", "OPENAI_API_KEY"),
    ("upload.public_base_url", "IA_URL"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub transcription: TranscriptionSettings,
    pub upload: UploadSettings,
    pub cors: CorsSettings,
    pub retention: RetentionSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_concurrent_requests: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    pub field_name: String,
    pub local_path: String,
    pub max_upload_size_bytes: usize,
    pub include_artifact_url: bool,
    pub public_base_url: Option<String>,
}

impl UploadSettings {
    pub fn artifact_url(&self, file_name: &str) -> String {
        let base = self
            .public_base_url
            .as_deref()
            .unwrap_or("")
            .trim_end_matches('/');
        format!("{}/uploads/{}", base, file_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// `*` or a comma-separated list of exact origins.
    pub allowed_origin: String,
}

impl CorsSettings {
    /// `None` means any origin. A `*` mixed into a list, or a list with no
    /// entries, is an error.
    pub fn origins(&self) -> Result<Option<Vec<HeaderValue>>, CorsOriginError> {
        let trimmed = self.allowed_origin.trim();
        if trimmed == "*" {
            return Ok(None);
        }

        let entries: Vec<&str> = trimmed
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .collect();

        if entries.is_empty() {
            return Err(CorsOriginError::Empty);
        }
        if entries.contains(&"*") {
            return Err(CorsOriginError::WildcardInList);
        }

        entries
            .into_iter()
            .map(|origin| HeaderValue::from_str(origin).map_err(CorsOriginError::from))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CorsOriginError {
    #[error("origin list is empty")]
    Empty,
    #[error("`*` cannot be combined with explicit origins")]
    WildcardInList,
    #[error("invalid origin: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetentionSettings {
    pub max_age_secs: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Settings {
    /// Defaults, then `appsettings.<env>` (optional), then `APP_*` variables,
    /// then the legacy variables.
    pub fn builder(environment: Environment) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5015)?
            .set_default("transcription.base_url", "https://api.openai.com/v1")?
            .set_default("transcription.model", "whisper-1")?
            .set_default("upload.field_name", "file")?
            .set_default("upload.local_path", "uploads")?
            .set_default("upload.max_upload_size_bytes", 25 * 1024 * 1024)?
            .set_default("upload.include_artifact_url", false)?
            .set_default("cors.allowed_origin", "*")?
            .set_default("retention.max_age_secs", 3600)?
            .set_default("retention.sweep_interval_secs", 300)?
            .set_default("logging.level", "info,voxrelay=debug,tower_http=debug")?
            .set_default("logging.enable_json", false)?
            .add_source(File::with_name(&environment.settings_file()).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        for (key, var) in LEGACY_OVERRIDES {
            builder = builder.set_override_option(key, std::env::var(var).ok())?;
        }

        Ok(builder)
    }

    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Self::from_config(Self::builder(environment)?.build()?)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transcription.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "transcription.api_key must not be empty".to_string(),
            ));
        }
        if self.upload.field_name.trim().is_empty() {
            return Err(ConfigError::Message(
                "upload.field_name must not be empty".to_string(),
            ));
        }
        if self.retention.max_age_secs == 0 {
            return Err(ConfigError::Message(
                "retention.max_age_secs must be greater than zero".to_string(),
            ));
        }
        if self.retention.sweep_interval_secs == 0 {
            return Err(ConfigError::Message(
                "retention.sweep_interval_secs must be greater than zero".to_string(),
            ));
        }
        self.cors.origins().map_err(|e| {
            ConfigError::Message(format!(
                "cors.allowed_origin is not a valid origin list: {}",
                e
            ))
        })?;
        Ok(())
    }
}
