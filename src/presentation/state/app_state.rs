use std::sync::Arc;

use crate::application::services::TranscriptionService;
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub transcription_service: Arc<TranscriptionService>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(transcription_service: Arc<TranscriptionService>, settings: Settings) -> Self {
        Self {
            transcription_service,
            settings: Arc::new(settings),
        }
    }
}
