mod openai_whisper_engine;

pub use openai_whisper_engine::{DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAiWhisperEngine};
