use super::audio_artifact::AudioArtifact;

#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub text: String,
    pub artifact: AudioArtifact,
}
